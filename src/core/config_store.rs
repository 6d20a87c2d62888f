// src/core/config_store.rs
//
// Two-scope settings store. A global `config.toml` under the OS config
// directory holds user defaults; a `.mallet/config.toml` next to the
// project overrides them per-workspace. Readers only ever see the merged,
// fully populated `ConfigSnapshot`.

use crate::core::paths::{self, PathError};
use crate::models::{ConfigScope, ConfigSnapshot};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use toml::Value;
use toml::value::Table;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("Could not read config file at '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not write config file at '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Config file at '{path}' is not valid TOML: {source}")]
    TomlParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Could not serialize configuration: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Unknown setting '{0}'.")]
    UnknownKey(String),
    #[error("Setting '{key}' expects {expected}, got '{value}'.")]
    InvalidValue {
        key: String,
        expected: &'static str,
        value: String,
    },
}

/// Every addressable setting key, in display order. `env.custom.*` keys are
/// open-ended and therefore not listed.
pub const KNOWN_KEYS: &[&str] = &[
    "msys2.root",
    "msys2.environment",
    "build.compiler",
    "build.cpp_standard",
    "build.flags",
    "build.libraries",
    "build.generator",
    "terminal.auto_close",
    "terminal.command_delay_ms",
    "terminal.startup_delay_ms",
    "notifications.level",
    "diagnostics.logging",
    "gtk.renderer",
    "gtk.theme",
    "gtk.debug_flags",
    "android.ndk_root",
    "android.sdk_root",
    "android.api_level",
];

enum ValueKind {
    Text,
    Bool,
    Integer,
    Choice(&'static [&'static str]),
}

fn kind_for_key(key: &str) -> Option<ValueKind> {
    if let Some(rest) = key.strip_prefix("env.custom.") {
        if !rest.is_empty() && !rest.contains('.') {
            return Some(ValueKind::Text);
        }
        return None;
    }
    Some(match key {
        "msys2.root"
        | "msys2.environment"
        | "build.compiler"
        | "build.cpp_standard"
        | "build.flags"
        | "build.libraries"
        | "build.generator"
        | "gtk.renderer"
        | "gtk.theme"
        | "gtk.debug_flags"
        | "android.ndk_root"
        | "android.sdk_root"
        | "android.api_level" => ValueKind::Text,
        "terminal.auto_close" | "diagnostics.logging" => ValueKind::Bool,
        "terminal.command_delay_ms" | "terminal.startup_delay_ms" => ValueKind::Integer,
        "notifications.level" => ValueKind::Choice(&["all", "important", "silent"]),
        _ => return None,
    })
}

/// Settings that flow into the session environment snapshot. Changing one
/// makes the shared session stale.
pub fn is_env_affecting(key: &str) -> bool {
    key.starts_with("msys2.") || key.starts_with("gtk.") || key.starts_with("env.custom")
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    global_path: PathBuf,
    workspace_path: PathBuf,
}

impl ConfigStore {
    /// Builds a store rooted at `workspace_root`, with the global scope in
    /// the per-user mallet config directory.
    pub fn for_workspace(workspace_root: &Path) -> Result<Self, ConfigError> {
        Ok(Self {
            global_path: paths::get_global_config_path()?,
            workspace_path: paths::workspace_config_path(workspace_root),
        })
    }

    /// Builds a store over explicit file paths. Used by tests and anywhere
    /// the scopes must not touch the real user configuration.
    pub fn with_paths(global_path: PathBuf, workspace_path: PathBuf) -> Self {
        Self {
            global_path,
            workspace_path,
        }
    }

    pub fn scope_path(&self, scope: ConfigScope) -> &Path {
        match scope {
            ConfigScope::Global => &self.global_path,
            ConfigScope::Workspace => &self.workspace_path,
        }
    }

    /// Whether a workspace-scope file exists yet.
    pub fn has_workspace_config(&self) -> bool {
        self.workspace_path.exists()
    }

    /// Reads both scopes, overlays workspace keys on top of global ones and
    /// fills everything else from the built-in defaults. Missing files are
    /// treated as empty; unknown keys in the files are ignored.
    pub fn snapshot(&self) -> Result<ConfigSnapshot, ConfigError> {
        let mut merged = read_table(&self.global_path)?;
        let overlay = read_table(&self.workspace_path)?;
        merge_tables(&mut merged, overlay);
        Value::Table(merged)
            .try_into()
            .map_err(|e| ConfigError::TomlParse {
                path: self.workspace_path.display().to_string(),
                source: e,
            })
    }

    /// Writes one setting into the given scope, creating the file (and the
    /// `.mallet/` directory) on demand. Values are coerced to the key's
    /// type; everything else about the value is taken on faith.
    pub fn set(&self, scope: ConfigScope, key: &str, raw_value: &str) -> Result<(), ConfigError> {
        self.set_many(scope, &[(key, raw_value)])
    }

    /// Writes a batch of settings into the given scope with a single
    /// read-modify-write of the scope file. An unknown key or a bad value
    /// fails the whole batch before the file is touched.
    pub fn set_many(&self, scope: ConfigScope, pairs: &[(&str, &str)]) -> Result<(), ConfigError> {
        let mut coerced = Vec::with_capacity(pairs.len());
        for &(key, raw_value) in pairs {
            let kind = kind_for_key(key).ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            coerced.push((key, coerce_value(key, &kind, raw_value)?));
        }
        let path = self.scope_path(scope).to_path_buf();
        let mut table = read_table(&path)?;
        for (key, value) in coerced {
            insert_dotted(&mut table, key, value);
        }
        write_table(&path, &table)
    }

    /// Removes one setting from the given scope. Returns whether the key
    /// was present.
    pub fn unset(&self, scope: ConfigScope, key: &str) -> Result<bool, ConfigError> {
        if kind_for_key(key).is_none() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }
        let path = self.scope_path(scope).to_path_buf();
        if !path.exists() {
            return Ok(false);
        }
        let mut table = read_table(&path)?;
        let removed = remove_dotted(&mut table, key);
        if removed {
            write_table(&path, &table)?;
        }
        Ok(removed)
    }
}

/// Looks up one dotted key in a snapshot, rendered for display.
pub fn lookup(snapshot: &ConfigSnapshot, key: &str) -> Option<String> {
    let value = Value::try_from(snapshot).ok()?;
    let mut current = &value;
    for segment in key.split('.') {
        current = current.as_table()?.get(segment)?;
    }
    Some(match current {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn read_table(path: &Path) -> Result<Table, ConfigError> {
    if !path.exists() {
        return Ok(Table::new());
    }
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: path.display().to_string(),
        source: e,
    })
}

fn write_table(path: &Path, table: &Table) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })?;
    }
    let toml_string = toml::to_string_pretty(table)?;
    fs::write(path, toml_string).map_err(|e| ConfigError::Write {
        path: path.display().to_string(),
        source: e,
    })
}

/// Key-by-key overlay. Sub-tables merge recursively, so a workspace file
/// that only sets `build.flags` keeps the global `build.libraries`.
fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Table(base_sub)), Value::Table(overlay_sub)) => {
                merge_tables(base_sub, overlay_sub);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn coerce_value(key: &str, kind: &ValueKind, raw: &str) -> Result<Value, ConfigError> {
    match kind {
        ValueKind::Text => Ok(Value::String(raw.to_string())),
        ValueKind::Bool => match raw {
            "true" => Ok(Value::Boolean(true)),
            "false" => Ok(Value::Boolean(false)),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                expected: "'true' or 'false'",
                value: raw.to_string(),
            }),
        },
        ValueKind::Integer => raw
            .parse::<i64>()
            .ok()
            .filter(|n| *n >= 0)
            .map(Value::Integer)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: key.to_string(),
                expected: "a non-negative integer",
                value: raw.to_string(),
            }),
        ValueKind::Choice(options) => {
            let lowered = raw.to_lowercase();
            if options.contains(&lowered.as_str()) {
                Ok(Value::String(lowered))
            } else {
                Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    expected: "one of 'all', 'important' or 'silent'",
                    value: raw.to_string(),
                })
            }
        }
    }
}

fn insert_dotted(table: &mut Table, key: &str, value: Value) {
    let mut segments = key.split('.').peekable();
    let mut current = table;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return;
        }
        // An intermediate key holding a scalar is clobbered into a table.
        if !matches!(current.get(segment), Some(Value::Table(_))) {
            current.insert(segment.to_string(), Value::Table(Table::new()));
        }
        current = match current.get_mut(segment) {
            Some(Value::Table(sub)) => sub,
            _ => unreachable!("segment was just inserted as a table"),
        };
    }
}

fn remove_dotted(table: &mut Table, key: &str) -> bool {
    let mut segments = key.split('.').peekable();
    let mut current = table;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            return current.remove(segment).is_some();
        }
        current = match current.get_mut(segment) {
            Some(Value::Table(sub)) => sub,
            _ => return false,
        };
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> ConfigStore {
        ConfigStore::with_paths(
            dir.join("global.toml"),
            dir.join(".mallet").join("config.toml"),
        )
    }

    #[test]
    fn snapshot_without_files_is_the_builtin_defaults() {
        let dir = tempdir().unwrap();
        let snapshot = store_in(dir.path()).snapshot().unwrap();
        assert_eq!(snapshot, ConfigSnapshot::default());
        assert_eq!(snapshot.msys2.root, "C:\\msys64");
        assert_eq!(snapshot.build.libraries, "gtk4");
        assert_eq!(snapshot.terminal.command_delay_ms, 300);
    }

    #[test]
    fn workspace_keys_override_global_keys_individually() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store
            .set(ConfigScope::Global, "build.libraries", "gtk4 libadwaita-1")
            .unwrap();
        store
            .set(ConfigScope::Global, "build.flags", "-Wall")
            .unwrap();
        store
            .set(ConfigScope::Workspace, "build.flags", "-O2")
            .unwrap();

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.build.flags, "-O2");
        assert_eq!(snapshot.build.libraries, "gtk4 libadwaita-1");
    }

    #[test]
    fn set_creates_the_workspace_directory_on_demand() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(!store.has_workspace_config());
        store
            .set(ConfigScope::Workspace, "msys2.environment", "MINGW64")
            .unwrap();
        assert!(store.has_workspace_config());
        assert_eq!(store.snapshot().unwrap().msys2.environment, "MINGW64");
    }

    #[test]
    fn set_many_lands_every_pair_in_one_write() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store
            .set_many(
                ConfigScope::Global,
                &[("build.compiler", "clang++"), ("gtk.theme", "Adwaita-dark")],
            )
            .unwrap();

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.build.compiler, "clang++");
        assert_eq!(snapshot.gtk.theme, "Adwaita-dark");
    }

    #[test]
    fn set_many_rejects_the_whole_batch_on_one_unknown_key() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let result = store.set_many(
            ConfigScope::Global,
            &[("build.compiler", "clang++"), ("no.such.key", "x")],
        );
        assert!(matches!(result, Err(ConfigError::UnknownKey(_))));
        assert!(!store.scope_path(ConfigScope::Global).exists());
    }

    #[test]
    fn booleans_and_integers_are_coerced() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store
            .set(ConfigScope::Global, "terminal.auto_close", "true")
            .unwrap();
        store
            .set(ConfigScope::Global, "terminal.startup_delay_ms", "2500")
            .unwrap();

        let snapshot = store.snapshot().unwrap();
        assert!(snapshot.terminal.auto_close);
        assert_eq!(snapshot.terminal.startup_delay_ms, 2500);
    }

    #[test]
    fn garbage_typed_values_are_rejected() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(matches!(
            store.set(ConfigScope::Global, "terminal.auto_close", "yes"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            store.set(ConfigScope::Global, "terminal.command_delay_ms", "fast"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            store.set(ConfigScope::Global, "notifications.level", "loud"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(matches!(
            store.set(ConfigScope::Global, "build.optimizer", "3"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn custom_env_keys_nest_under_env_custom() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store
            .set(ConfigScope::Workspace, "env.custom.PKG_CONFIG_DEBUG", "1")
            .unwrap();
        let snapshot = store.snapshot().unwrap();
        assert_eq!(
            snapshot.env.custom.get("PKG_CONFIG_DEBUG").map(String::as_str),
            Some("1")
        );
    }

    #[test]
    fn unset_reveals_the_value_underneath() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store
            .set(ConfigScope::Global, "gtk.renderer", "gl")
            .unwrap();
        store
            .set(ConfigScope::Workspace, "gtk.renderer", "vulkan")
            .unwrap();
        assert_eq!(store.snapshot().unwrap().gtk.renderer, "vulkan");

        assert!(store.unset(ConfigScope::Workspace, "gtk.renderer").unwrap());
        assert_eq!(store.snapshot().unwrap().gtk.renderer, "gl");

        assert!(store.unset(ConfigScope::Global, "gtk.renderer").unwrap());
        assert_eq!(store.snapshot().unwrap().gtk.renderer, "cairo");
    }

    #[test]
    fn unset_on_a_missing_key_reports_false() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(!store.unset(ConfigScope::Global, "gtk.theme").unwrap());
    }

    #[test]
    fn unreadable_toml_surfaces_as_a_parse_error() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(dir.path().join("global.toml"), "build = [broken").unwrap();
        assert!(matches!(
            store.snapshot(),
            Err(ConfigError::TomlParse { .. })
        ));
    }

    #[test]
    fn lookup_renders_scalars_without_quotes() {
        let snapshot = ConfigSnapshot::default();
        assert_eq!(lookup(&snapshot, "msys2.environment").as_deref(), Some("UCRT64"));
        assert_eq!(lookup(&snapshot, "terminal.auto_close").as_deref(), Some("false"));
        assert_eq!(lookup(&snapshot, "terminal.command_delay_ms").as_deref(), Some("300"));
        assert_eq!(lookup(&snapshot, "no.such.key"), None);
    }

    #[test]
    fn env_affecting_keys_are_classified() {
        assert!(is_env_affecting("msys2.root"));
        assert!(is_env_affecting("gtk.theme"));
        assert!(is_env_affecting("env.custom.FOO"));
        assert!(!is_env_affecting("build.flags"));
        assert!(!is_env_affecting("terminal.auto_close"));
    }
}
