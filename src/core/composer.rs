// src/core/composer.rs
//
// Deterministic assembly of the shell statements behind every build-cycle
// operation. The composer never talks to the filesystem or a process: it
// turns a `ConfigSnapshot` plus an `OperationContext` into an ordered list
// of statements. `$(pkg-config ...)` queries are left literal so the shell
// resolves them at execution time inside the MSYS2 environment.

use crate::constants::{BUILD_DIR, BUILD_MANIFEST_FILENAME, MSYS2_ROOT_TOKEN, PROJECT_BINARY, SINGLE_FILE_EXTENSIONS};
use crate::core::commons::quote_if_needed;
use crate::core::paths;
use crate::models::{ActiveFile, ConfigSnapshot, OperationContext, OperationKind, ProjectMode};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    /// Matches MSVC-style linker directives embedded in source text:
    /// `#pragma comment(lib, "iphlpapi.lib")`.
    static ref PRAGMA_LIB_RE: Regex =
        Regex::new(r#"#pragma\s+comment\s*\(\s*lib\s*,\s*"([^"]+)"\s*\)"#).unwrap();
}

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error(
        "No source file selected. Pass a .c or .cpp file, or add a {} for project mode.",
        BUILD_MANIFEST_FILENAME
    )]
    NoFileSelected,
    #[error("'{0}' is not a C/C++ source file (expected .c or .cpp).")]
    UnsupportedExtension(String),
}

/// The `export` lines every operation begins with. Theme and debug-flag
/// exports are omitted when their values are empty: `export GTK_THEME=`
/// would clobber a value inherited from the parent environment.
pub fn environment_exports(config: &ConfigSnapshot) -> Vec<String> {
    let root = paths::subsystem_root(&config.msys2.root);
    let env_lower = config.msys2.environment.to_lowercase();
    let mut exports = vec![format!(
        "export GSK_RENDERER={}",
        quote_if_needed(&config.gtk.renderer)
    )];
    exports.push(format!("export PATH=\"{root}/{env_lower}/bin:$PATH\""));
    exports.push(format!("export PKG_CONFIG_PATH={root}/{env_lower}/lib/pkgconfig"));
    if !config.gtk.theme.is_empty() {
        exports.push(format!("export GTK_THEME={}", quote_if_needed(&config.gtk.theme)));
    }
    if !config.gtk.debug_flags.is_empty() {
        exports.push(format!(
            "export GTK_DEBUG={}",
            quote_if_needed(&config.gtk.debug_flags)
        ));
    }
    for (name, value) in &config.env.custom {
        let resolved = value.replace(MSYS2_ROOT_TOKEN, &root);
        exports.push(format!("export {name}={}", quote_if_needed(&resolved)));
    }
    exports
}

/// Composes the full statement list for one operation: environment exports
/// first, then the mode-specific recipe.
pub fn compose(
    kind: OperationKind,
    config: &ConfigSnapshot,
    context: &OperationContext,
) -> Result<Vec<String>, ComposeError> {
    let mut commands = environment_exports(config);
    match context.mode {
        ProjectMode::Project => commands.extend(project_recipe(kind, config)),
        ProjectMode::SingleFile => commands.extend(single_file_recipe(kind, config, context)?),
    }
    Ok(commands)
}

/// Incremental CMake recipe. Configuration runs only when no
/// `CMakeCache.txt` exists yet, so repeat builds skip straight to the
/// driver.
fn project_recipe(kind: OperationKind, config: &ConfigSnapshot) -> Vec<String> {
    if kind == OperationKind::Clean {
        return vec![
            format!("rm -rf {BUILD_DIR}"),
            "echo \"Clean finished!\"".to_string(),
        ];
    }

    let generator = quote_if_needed(&config.build.generator);
    let mut commands = vec![
        format!("mkdir -p {BUILD_DIR}"),
        format!("cd {BUILD_DIR}"),
        format!("if [ ! -f CMakeCache.txt ]; then cmake -G {generator} ..; fi"),
    ];
    commands.push(match kind {
        OperationKind::Build => {
            "if cmake --build .; then echo \"Build succeeded!\"; else echo \"Build failed!\"; fi"
                .to_string()
        }
        // Run and BuildAndRun both drive an incremental build before
        // launching the conventional binary name.
        _ => format!(
            "if cmake --build .; then echo \"Build succeeded!\" && ./{PROJECT_BINARY}; else echo \"Build failed!\"; fi"
        ),
    });
    commands
}

fn single_file_recipe(
    kind: OperationKind,
    config: &ConfigSnapshot,
    context: &OperationContext,
) -> Result<Vec<String>, ComposeError> {
    if kind == OperationKind::Clean {
        let mut commands = if context.has_legacy_makefile {
            vec!["mingw32-make clean".to_string()]
        } else {
            vec!["rm -f *.o *.exe".to_string()]
        };
        commands.push("echo \"Clean finished!\"".to_string());
        return Ok(commands);
    }

    let file = context.active_file.as_ref().ok_or(ComposeError::NoFileSelected)?;
    let extension = file
        .path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if !SINGLE_FILE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ComposeError::UnsupportedExtension(file.file_name()));
    }

    let output = file.output_name();
    let compile = compile_line(config, file, &output);
    let out = quote_if_needed(&output);
    let status_line = format!(
        "if [ -f {out} ]; then echo \"Build succeeded!\"; else echo \"Build failed!\"; fi"
    );
    let run_line = format!(
        "if [ -f {out} ]; then echo \"Build succeeded!\" && ./{out}; else echo \"Build failed!\"; fi"
    );

    Ok(match kind {
        // The pause reads the terminal directly: session stdin is the
        // dispatch pipe, so a bare `read` would swallow the next
        // dispatched line instead of a keypress.
        OperationKind::Build => vec![
            compile,
            status_line,
            "read -n 1 -s -r -p \"Press any key to continue...\" < /dev/tty".to_string(),
        ],
        // A plain run still compiles first; the incremental cost is the
        // compiler's problem, not ours.
        _ => vec![compile, run_line],
    })
}

/// One compiler invocation. `pkg-config` supplies compile and link flags at
/// shell time; pragma-derived `-l` flags land after the libs query.
fn compile_line(config: &ConfigSnapshot, file: &ActiveFile, output: &str) -> String {
    let libs = config.build.libraries.trim();
    let mut tokens = vec![config.build.compiler.clone()];
    tokens.extend(config.build.flags.split_whitespace().map(String::from));
    tokens.push(format!("-std={}", config.build.cpp_standard));
    tokens.push(format!("$(pkg-config --cflags {libs})"));
    tokens.push("-o".to_string());
    tokens.push(quote_if_needed(output));
    tokens.push(quote_if_needed(&file.file_name()));
    tokens.push(format!("$(pkg-config --libs {libs})"));
    tokens.extend(pragma_link_flags(&file.text));
    tokens.join(" ")
}

/// Extracts `-lFoo` flags from `#pragma comment(lib, "Foo.lib")` directives.
/// The `.lib` suffix is trimmed case-insensitively and duplicates keep
/// their first position.
pub fn pragma_link_flags(source_text: &str) -> Vec<String> {
    let mut flags: Vec<String> = Vec::new();
    for capture in PRAGMA_LIB_RE.captures_iter(source_text) {
        let raw = capture[1].trim();
        let name = raw
            .strip_suffix(".lib")
            .or_else(|| raw.strip_suffix(".LIB"))
            .unwrap_or(raw);
        if name.is_empty() {
            continue;
        }
        let flag = format!("-l{name}");
        if !flags.contains(&flag) {
            flags.push(flag);
        }
    }
    flags
}
