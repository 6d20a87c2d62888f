// src/core/paths.rs

use crate::constants::CONFIG_FILENAME;
use anyhow::{Result, anyhow};
use lazy_static::lazy_static;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

lazy_static! {
    static ref MALLET_CONFIG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    #[error("Could not create config directory at '{path}': {source}")]
    ConfigDirCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Returns the path to the mallet configuration directory (`~/.config/mallet`).
/// Creates it if it doesn't exist.
///
/// This function is memoized: the first call computes and caches the path,
/// subsequent calls return the cached value instantly.
pub fn get_mallet_config_dir() -> Result<PathBuf, PathError> {
    let mut cached_path_guard = MALLET_CONFIG_DIR.lock().unwrap();

    if let Some(path) = &*cached_path_guard {
        return Ok(path.clone());
    }

    let config_path = dirs::config_dir()
        .ok_or(PathError::ConfigDirNotFound)?
        .join("mallet");

    if !config_path.exists() {
        fs::create_dir_all(&config_path).map_err(|e| PathError::ConfigDirCreation {
            path: config_path.display().to_string(),
            source: e,
        })?;
    }

    *cached_path_guard = Some(config_path.clone());

    Ok(config_path)
}

/// Returns the path to the global `config.toml` inside the mallet config directory.
pub fn get_global_config_path() -> Result<PathBuf, PathError> {
    get_mallet_config_dir().map(|dir| dir.join(CONFIG_FILENAME))
}

/// Expands `~` and environment variables (`$VAR` / `%VAR%` via `$VAR` syntax)
/// in a user-entered path such as an `msys2.root` override.
pub fn expand_user_path(template: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(template)
        .map_err(|e| anyhow!("Failed to expand path '{}': {}", template, e))?;
    Ok(PathBuf::from(expanded.into_owned()))
}

// --- SUBSYSTEM PATH TRANSLATION ---
// MSYS2 shells address the filesystem as `/c/users/...` while the host OS
// hands out `C:\Users\...`. Both directions are pure string transforms: no
// existence checks, no normalization beyond the drive prefix and separators.

/// Converts a Windows-style path to MSYS2 subsystem syntax.
///
/// `C:\msys64\ucrt64` becomes `/c/msys64/ucrt64`. Only the drive letter is
/// case-folded; the rest of the path is preserved. Inputs already in
/// subsystem syntax (or with no drive prefix) pass through with backslashes
/// flipped, so the transform is idempotent. An empty input stays empty.
pub fn to_subsystem_path(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    let normalized = path.replace('\\', "/");
    let bytes = normalized.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        let drive = (bytes[0] as char).to_ascii_lowercase();
        let rest = normalized[2..].trim_start_matches('/');
        if rest.is_empty() {
            format!("/{drive}")
        } else {
            format!("/{drive}/{rest}")
        }
    } else {
        normalized
    }
}

/// Converts an MSYS2 subsystem path back to Windows syntax.
///
/// `/c/users/dev` becomes `C:\users\dev`. Inputs that do not start with a
/// `/<drive>` prefix are returned unchanged.
pub fn from_subsystem_path(path: &str) -> String {
    let bytes = path.as_bytes();
    let has_drive_prefix = bytes.len() >= 2
        && bytes[0] == b'/'
        && bytes[1].is_ascii_alphabetic()
        && (bytes.len() == 2 || bytes[2] == b'/');
    if !has_drive_prefix {
        return path.to_string();
    }
    let drive = (bytes[1] as char).to_ascii_uppercase();
    let rest = if path.len() > 3 { &path[3..] } else { "" };
    if rest.is_empty() {
        format!("{drive}:\\")
    } else {
        format!("{drive}:\\{}", rest.replace('/', "\\"))
    }
}

/// The MSYS2 root in subsystem syntax, e.g. `/c/msys64`.
pub fn subsystem_root(msys2_root: &str) -> String {
    to_subsystem_path(msys2_root)
}

/// The bin directory of the active subsystem in subsystem syntax,
/// e.g. `/c/msys64/ucrt64/bin`.
pub fn subsystem_bin_dir(msys2_root: &str, environment: &str) -> String {
    format!(
        "{}/{}/bin",
        subsystem_root(msys2_root),
        environment.to_lowercase()
    )
}

/// Where the workspace-scope config file lives for a given workspace root.
pub fn workspace_config_path(workspace_root: &Path) -> PathBuf {
    workspace_root
        .join(crate::constants::MALLET_DIR)
        .join(CONFIG_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_path_maps_to_subsystem_syntax() {
        assert_eq!(to_subsystem_path("C:\\msys64\\ucrt64"), "/c/msys64/ucrt64");
    }

    #[test]
    fn only_the_drive_letter_is_lowercased() {
        assert_eq!(
            to_subsystem_path("D:\\Projects\\GtkApp"),
            "/d/Projects/GtkApp"
        );
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(to_subsystem_path(""), "");
        assert_eq!(from_subsystem_path(""), "");
    }

    #[test]
    fn forward_slash_input_is_accepted() {
        assert_eq!(to_subsystem_path("c:/tools/msys64"), "/c/tools/msys64");
    }

    #[test]
    fn translation_is_idempotent() {
        let once = to_subsystem_path("C:\\msys64");
        assert_eq!(to_subsystem_path(&once), once);
    }

    #[test]
    fn bare_drive_maps_to_root() {
        assert_eq!(to_subsystem_path("C:"), "/c");
        assert_eq!(to_subsystem_path("C:\\"), "/c");
    }

    #[test]
    fn relative_paths_pass_through_with_flipped_separators() {
        assert_eq!(to_subsystem_path("src\\main.cpp"), "src/main.cpp");
    }

    #[test]
    fn subsystem_path_maps_back_to_windows_syntax() {
        assert_eq!(from_subsystem_path("/c/users/dev"), "C:\\users\\dev");
        assert_eq!(from_subsystem_path("/c"), "C:\\");
    }

    #[test]
    fn non_drive_input_is_returned_unchanged() {
        assert_eq!(from_subsystem_path("/usr/bin"), "/usr/bin");
        assert_eq!(from_subsystem_path("relative/path"), "relative/path");
    }

    #[test]
    fn round_trip_restores_the_drive_prefix() {
        assert_eq!(
            from_subsystem_path(&to_subsystem_path("C:\\msys64\\home")),
            "C:\\msys64\\home"
        );
    }

    #[test]
    fn bin_dir_lowercases_the_environment() {
        assert_eq!(
            subsystem_bin_dir("C:\\msys64", "UCRT64"),
            "/c/msys64/ucrt64/bin"
        );
    }
}
