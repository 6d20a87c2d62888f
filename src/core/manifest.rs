// src/core/manifest.rs
//
// Everything that reads or edits the workspace itself: mode detection
// (a `CMakeLists.txt` at the root always wins over any source file),
// single-file candidate discovery, and the textual patch that adds newly
// installed packages to `pkg_check_modules(...)`.

use crate::constants::{
    BUILD_MANIFEST_FILENAME, LEGACY_MAKEFILE_FILENAME, SINGLE_FILE_EXTENSIONS,
};
use crate::models::{ActiveFile, OperationContext};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

lazy_static! {
    static ref PKG_CHECK_RE: Regex =
        Regex::new(r"pkg_check_modules\s*\(\s*(\w+)\s+REQUIRED\s+([^)]*)\)").unwrap();
}

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Could not read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not write '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{0}' does not exist.")]
    MissingFile(String),
}

/// Whether the workspace root carries a build manifest (project mode).
pub fn has_build_manifest(workspace_root: &Path) -> bool {
    workspace_root.join(BUILD_MANIFEST_FILENAME).is_file()
}

fn has_legacy_makefile(workspace_root: &Path) -> bool {
    workspace_root.join(LEGACY_MAKEFILE_FILENAME).is_file()
}

/// Inspects the workspace and builds the composer's context.
///
/// Project mode is selected whenever the build manifest exists, no matter
/// what file was requested. In single-file mode, `requested_file` names
/// the source to build; without one, a lone C/C++ file at the root is
/// picked up automatically, while zero or several candidates leave the
/// selection empty (build operations then fail with a clear message,
/// clean still works).
pub fn detect_context(
    workspace_root: &Path,
    requested_file: Option<&Path>,
) -> Result<OperationContext, ManifestError> {
    if has_build_manifest(workspace_root) {
        return Ok(OperationContext::project(has_legacy_makefile(
            workspace_root,
        )));
    }

    let selected = match requested_file {
        Some(file) => Some(load_active_file(workspace_root, file)?),
        None => match sole_candidate(workspace_root) {
            Some(path) => Some(load_active_file(workspace_root, &path)?),
            None => None,
        },
    };
    Ok(OperationContext::single_file(
        selected,
        has_legacy_makefile(workspace_root),
    ))
}

fn load_active_file(workspace_root: &Path, file: &Path) -> Result<ActiveFile, ManifestError> {
    let path = if file.is_absolute() {
        file.to_path_buf()
    } else {
        workspace_root.join(file)
    };
    if !path.is_file() {
        return Err(ManifestError::MissingFile(path.display().to_string()));
    }
    let text = fs::read_to_string(&path).map_err(|e| ManifestError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(ActiveFile { path, text })
}

/// The single eligible source file at the workspace root, if there is
/// exactly one.
fn sole_candidate(workspace_root: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(workspace_root).ok()?;
    let mut candidates: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|e| e.to_string_lossy().to_lowercase())
                    .is_some_and(|ext| SINGLE_FILE_EXTENSIONS.contains(&ext.as_str()))
        })
        .collect();
    if candidates.len() == 1 {
        candidates.pop()
    } else {
        None
    }
}

/// Adds pkg-config modules to the first `pkg_check_modules(<VAR> REQUIRED
/// ...)` call in the build manifest. Returns whether the file changed.
/// Missing manifest or missing call are quietly a no-op: the install
/// itself already succeeded.
pub fn add_manifest_packages(
    workspace_root: &Path,
    stems: &[String],
) -> Result<bool, ManifestError> {
    let path = workspace_root.join(BUILD_MANIFEST_FILENAME);
    if !path.is_file() || stems.is_empty() {
        return Ok(false);
    }
    let content = fs::read_to_string(&path).map_err(|e| ManifestError::Read {
        path: path.display().to_string(),
        source: e,
    })?;

    let Some(captures) = PKG_CHECK_RE.captures(&content) else {
        return Ok(false);
    };
    let existing = captures[2].trim();
    let mut modules: Vec<String> = existing.split_whitespace().map(String::from).collect();
    let before = modules.len();
    for stem in stems {
        if !modules.iter().any(|m| m == stem) {
            modules.push(stem.clone());
        }
    }
    if modules.len() == before {
        return Ok(false);
    }

    let replacement = format!(
        "pkg_check_modules({} REQUIRED {})",
        &captures[1],
        modules.join(" ")
    );
    let patched = PKG_CHECK_RE.replace(&content, replacement.as_str());
    fs::write(&path, patched.as_ref()).map_err(|e| ManifestError::Write {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(true)
}

/// Drops pkg-config modules from the manifest's `pkg_check_modules` call,
/// matching by the same substring heuristic used for the library list.
pub fn prune_manifest_packages(
    workspace_root: &Path,
    short_name: &str,
) -> Result<bool, ManifestError> {
    let path = workspace_root.join(BUILD_MANIFEST_FILENAME);
    if !path.is_file() || short_name.is_empty() {
        return Ok(false);
    }
    let content = fs::read_to_string(&path).map_err(|e| ManifestError::Read {
        path: path.display().to_string(),
        source: e,
    })?;

    let Some(captures) = PKG_CHECK_RE.captures(&content) else {
        return Ok(false);
    };
    let needle = short_name.to_lowercase();
    let kept: Vec<&str> = captures[2]
        .split_whitespace()
        .filter(|module| !module.to_lowercase().contains(&needle))
        .collect();
    if kept.len() == captures[2].split_whitespace().count() {
        return Ok(false);
    }

    let replacement = format!(
        "pkg_check_modules({} REQUIRED {})",
        &captures[1],
        kept.join(" ")
    );
    let patched = PKG_CHECK_RE.replace(&content, replacement.as_str());
    fs::write(&path, patched.as_ref()).map_err(|e| ManifestError::Write {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(true)
}

// --- PROJECT SCAFFOLD ---

/// Writes the starter manifest and sample source for `mallet init`.
/// Refuses to overwrite an existing manifest.
pub fn write_project_scaffold(
    workspace_root: &Path,
    name: &str,
    libraries: &str,
) -> Result<(), ManifestError> {
    let manifest_path = workspace_root.join(BUILD_MANIFEST_FILENAME);
    if manifest_path.exists() {
        return Err(ManifestError::Write {
            path: manifest_path.display().to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "a build manifest already exists here",
            ),
        });
    }

    let manifest = render_manifest_template(name, libraries);
    fs::write(&manifest_path, manifest).map_err(|e| ManifestError::Write {
        path: manifest_path.display().to_string(),
        source: e,
    })?;

    let source_path = workspace_root.join("main.cpp");
    if !source_path.exists() {
        let source = render_source_template(name);
        fs::write(&source_path, source).map_err(|e| ManifestError::Write {
            path: source_path.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}

fn render_manifest_template(name: &str, libraries: &str) -> String {
    let modules = if libraries.trim().is_empty() {
        "gtk4"
    } else {
        libraries.trim()
    };
    format!(
        r#"cmake_minimum_required(VERSION 3.20)
project({name} C CXX)

set(CMAKE_CXX_STANDARD 17)
set(CMAKE_CXX_STANDARD_REQUIRED ON)

find_package(PkgConfig REQUIRED)
pkg_check_modules(DEPS REQUIRED {modules})

add_executable(app main.cpp)
set_target_properties(app PROPERTIES OUTPUT_NAME "app" SUFFIX ".exe")
target_include_directories(app PRIVATE ${{DEPS_INCLUDE_DIRS}})
target_link_directories(app PRIVATE ${{DEPS_LIBRARY_DIRS}})
target_link_libraries(app PRIVATE ${{DEPS_LIBRARIES}})
"#
    )
}

fn render_source_template(name: &str) -> String {
    let app_id = sanitize_app_id(name);
    format!(
        r#"#include <gtk/gtk.h>

static void on_activate(GtkApplication *app, gpointer user_data) {{
    GtkWidget *window = gtk_application_window_new(app);
    gtk_window_set_title(GTK_WINDOW(window), "{name}");
    gtk_window_set_default_size(GTK_WINDOW(window), 640, 480);

    GtkWidget *label = gtk_label_new("Hello from {name}!");
    gtk_window_set_child(GTK_WINDOW(window), label);
    gtk_window_present(GTK_WINDOW(window));
}}

int main(int argc, char **argv) {{
    GtkApplication *app =
        gtk_application_new("org.mallet.{app_id}", G_APPLICATION_DEFAULT_FLAGS);
    g_signal_connect(app, "activate", G_CALLBACK(on_activate), NULL);
    int status = g_application_run(G_APPLICATION(app), argc, argv);
    g_object_unref(app);
    return status;
}}
"#
    )
}

/// Application ids allow `[A-Za-z0-9_-]` per dot-separated element and may
/// not start with a digit.
fn sanitize_app_id(name: &str) -> String {
    let mut id: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if id.chars().next().is_none_or(|c| c.is_ascii_digit()) {
        id.insert(0, 'a');
    }
    id
}
