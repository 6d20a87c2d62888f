// src/models.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::constants::DEFAULT_MSYS2_ROOT;

// --- CONFIGURATION MODELS (What is read from the config.toml files) ---
// Every section tolerates missing keys: a snapshot deserialized from an
// empty file is byte-for-byte the built-in defaults.

/// The `[msys2]` section: where the toolchain lives and which subsystem runs.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Msys2Config {
    pub root: String,
    pub environment: String,
}

impl Default for Msys2Config {
    fn default() -> Self {
        Self {
            root: DEFAULT_MSYS2_ROOT.to_string(),
            environment: "UCRT64".to_string(),
        }
    }
}

/// The `[build]` section: compiler invocation and CMake generation knobs.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BuildConfig {
    pub compiler: String,
    pub cpp_standard: String,
    pub flags: String,
    /// Space-separated pkg-config package names.
    pub libraries: String,
    pub generator: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            compiler: "g++".to_string(),
            cpp_standard: "c++17".to_string(),
            flags: String::new(),
            libraries: "gtk4".to_string(),
            generator: "Ninja".to_string(),
        }
    }
}

/// The `[terminal]` section: session lifetime and pacing.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TerminalConfig {
    pub auto_close: bool,
    pub command_delay_ms: u64,
    pub startup_delay_ms: u64,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            auto_close: false,
            command_delay_ms: 300,
            startup_delay_ms: 1_000,
        }
    }
}

/// How chatty the user-facing notifications are.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotifyLevel {
    All,
    #[default]
    Important,
    Silent,
}

impl NotifyLevel {
    /// Whether a message of weight `message` passes this threshold.
    pub fn allows(self, message: NotifyLevel) -> bool {
        match self {
            NotifyLevel::All => message != NotifyLevel::Silent,
            NotifyLevel::Important => message == NotifyLevel::Important,
            NotifyLevel::Silent => false,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct NotificationsConfig {
    pub level: NotifyLevel,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub logging: bool,
}

/// The `[gtk]` section. `theme` and `debug_flags` are exported only when
/// non-empty; `renderer` ships with a non-empty default.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GtkConfig {
    pub renderer: String,
    pub theme: String,
    pub debug_flags: String,
}

impl Default for GtkConfig {
    fn default() -> Self {
        Self {
            renderer: "cairo".to_string(),
            theme: String::new(),
            debug_flags: String::new(),
        }
    }
}

/// The `[env]` section: user-supplied variables exported verbatim (after
/// `${msys2Root}` substitution). A `BTreeMap` keeps the export order stable.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct EnvConfig {
    pub custom: BTreeMap<String, String>,
}

/// The `[android]` section. Dormant paths surfaced by `info` and `config`,
/// not consumed by any recipe yet.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct AndroidConfig {
    pub ndk_root: String,
    pub sdk_root: String,
    pub api_level: String,
}

/// The fully merged view of both configuration scopes. Every field is
/// populated; readers never distinguish "set" from "defaulted".
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ConfigSnapshot {
    pub msys2: Msys2Config,
    pub build: BuildConfig,
    pub terminal: TerminalConfig,
    pub notifications: NotificationsConfig,
    pub diagnostics: DiagnosticsConfig,
    pub gtk: GtkConfig,
    pub env: EnvConfig,
    pub android: AndroidConfig,
}

/// Which configuration file a write lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    /// The per-user file under the OS config directory.
    Global,
    /// The `.mallet/config.toml` next to the project being worked on.
    Workspace,
}

impl std::fmt::Display for ConfigScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigScope::Global => write!(f, "global"),
            ConfigScope::Workspace => write!(f, "workspace"),
        }
    }
}

// --- OPERATION MODELS (Our internal working representation) ---

/// The four build-cycle operations a recipe can be composed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Build,
    Run,
    BuildAndRun,
    Clean,
}

/// How the workspace is interpreted. A `CMakeLists.txt` at the root always
/// wins over any open file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectMode {
    Project,
    SingleFile,
}

/// A source file selected for single-file mode, with its text so the
/// composer can scan it for `#pragma comment(lib, ...)` directives.
#[derive(Debug, Clone)]
pub struct ActiveFile {
    pub path: PathBuf,
    pub text: String,
}

impl ActiveFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// The output binary name: source stem plus `.exe`.
    pub fn output_name(&self) -> String {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{stem}.exe")
    }
}

/// Everything the command composer needs to know about the workspace state
/// at the moment an operation is requested.
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub mode: ProjectMode,
    /// Present in single-file mode; ignored in project mode.
    pub active_file: Option<ActiveFile>,
    /// Whether a legacy `Makefile` sits at the workspace root (clean fallback).
    pub has_legacy_makefile: bool,
}

impl OperationContext {
    pub fn project(has_legacy_makefile: bool) -> Self {
        Self {
            mode: ProjectMode::Project,
            active_file: None,
            has_legacy_makefile,
        }
    }

    pub fn single_file(file: Option<ActiveFile>, has_legacy_makefile: bool) -> Self {
        Self {
            mode: ProjectMode::SingleFile,
            active_file: file,
            has_legacy_makefile,
        }
    }
}

/// Where a composed command sequence should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTarget {
    /// Reuse the long-lived shared session instead of spawning a new one.
    pub use_shared: bool,
    /// Directory the session should `cd` into before the commands run.
    pub working_dir: Option<PathBuf>,
}

impl DispatchTarget {
    /// The long-lived shared session, reused across operations.
    pub fn shared() -> Self {
        Self {
            use_shared: true,
            working_dir: None,
        }
    }

    /// A dedicated throwaway session.
    pub fn transient() -> Self {
        Self {
            use_shared: false,
            working_dir: None,
        }
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

/// A fully composed operation, ready to hand to the session manager.
#[derive(Debug, Clone)]
pub struct OperationRequest {
    pub commands: Vec<String>,
    pub description: String,
    pub target: DispatchTarget,
}

// --- SHELL MODELS ---

/// How to launch the MSYS2 login shell on this host, and how to run silent
/// out-of-band queries against the same toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellSpec {
    pub program: PathBuf,
    /// Arguments for the visible interactive session.
    pub interactive_args: Vec<String>,
    /// Arguments for a silent invocation; the command line itself is
    /// appended as the final argument.
    pub query_args: Vec<String>,
}
