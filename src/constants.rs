// src/constants.rs

/// The name of the directory containing mallet configuration for a workspace.
pub const MALLET_DIR: &str = ".mallet";

/// The name of the configuration file (inside .mallet/ or the global config dir).
pub const CONFIG_FILENAME: &str = "config.toml";

/// The build manifest whose presence at the workspace root selects project mode.
pub const BUILD_MANIFEST_FILENAME: &str = "CMakeLists.txt";

/// The legacy makefile recognized by the clean fallback.
pub const LEGACY_MAKEFILE_FILENAME: &str = "Makefile";

/// The out-of-tree build directory used by the project recipes.
pub const BUILD_DIR: &str = "build";

/// The binary name produced by a project-mode build.
pub const PROJECT_BINARY: &str = "app.exe";

/// Source extensions eligible for single-file mode.
pub const SINGLE_FILE_EXTENSIONS: &[&str] = &["c", "cpp"];

/// Placeholder accepted in custom environment values, replaced with the
/// MSYS2 root in subsystem path syntax.
pub const MSYS2_ROOT_TOKEN: &str = "${msys2Root}";

/// Fallback MSYS2 root for a stock install.
pub const DEFAULT_MSYS2_ROOT: &str = "C:\\msys64";

/// Cadence of the package install/removal completion checks.
pub const POLL_INTERVAL_MS: u64 = 3_000;

/// How many checks run before an install/removal poll gives up.
pub const POLL_MAX_ATTEMPTS: u32 = 40;
