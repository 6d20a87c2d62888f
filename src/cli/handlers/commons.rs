// src/cli/handlers/commons.rs

// This module contains shared functions used by multiple handlers.

use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};

use crate::{
    core::{
        composer, manifest, packages,
        poller::{self, PollOutcome, PollSettings},
    },
    models::{
        ConfigSnapshot, DispatchTarget, NotifyLevel, OperationContext, OperationKind,
        OperationRequest, ProjectMode,
    },
    state::AppState,
    system::{executor, session::environment_snapshot},
};

/// Prints `message` when the configured notification level lets a message
/// of weight `weight` through.
pub fn notify(config: &ConfigSnapshot, weight: NotifyLevel, message: &str) {
    if config.notifications.level.allows(weight) {
        println!("{message}");
    }
}

/// The shared build/run/clean pipeline.
///
/// 1. Detect whether the workspace is a CMake project or a loose file.
/// 2. Compose the recipe for `kind`.
/// 3. Hand it to the shared session and return without waiting; the
///    session prints its own progress.
pub fn dispatch_operation(
    state: &mut AppState,
    kind: OperationKind,
    requested_file: Option<&Path>,
) -> Result<()> {
    let config = state.snapshot()?;
    let context = manifest::detect_context(state.workspace_root(), requested_file)?;
    let commands = composer::compose(kind, &config, &context)?;
    let request = OperationRequest {
        description: describe_operation(kind, &context),
        target: DispatchTarget::shared().in_dir(operation_dir(state.workspace_root(), &context)),
        commands,
    };
    state.manager().dispatch(&request, &config)?;
    notify(
        &config,
        NotifyLevel::All,
        &format!("{} dispatched to the shared session.", request.description),
    );
    Ok(())
}

fn describe_operation(kind: OperationKind, context: &OperationContext) -> String {
    let verb = match kind {
        OperationKind::Build => "Build",
        OperationKind::Run => "Run",
        OperationKind::BuildAndRun => "Build & run",
        OperationKind::Clean => "Clean",
    };
    match (context.mode, context.active_file.as_ref()) {
        (ProjectMode::SingleFile, Some(file)) => format!("{verb} {}", file.file_name()),
        (ProjectMode::SingleFile, None) => verb.to_string(),
        (ProjectMode::Project, _) => format!("{verb} project"),
    }
}

/// Single-file recipes reference the source by bare name, so the session
/// has to sit in the file's directory. Project recipes run from the root.
fn operation_dir(workspace_root: &Path, context: &OperationContext) -> PathBuf {
    context
        .active_file
        .as_ref()
        .and_then(|file| file.path.parent())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| workspace_root.to_path_buf())
}

/// Polls the pacman database until `predicate` reports the desired state
/// or the attempt budget runs out. The visible session prints no
/// machine-readable completion signal, so the database itself is the
/// source of truth.
pub fn await_package_state(
    state: &AppState,
    config: &ConfigSnapshot,
    predicate: &str,
) -> PollOutcome {
    let env = environment_snapshot(config);
    poller::poll_until(&PollSettings::default(), || {
        match executor::run_query(state.shell(), predicate, state.workspace_root(), &env) {
            Ok(output) => output.success,
            Err(e) => {
                log::debug!("Package state probe failed: {e}.");
                false
            }
        }
    })
}

/// After a confirmed install: fold the package's pkg-config modules into
/// `build.libraries` and the project manifest so the next build compiles
/// and links against them.
pub fn absorb_installed_package(
    state: &AppState,
    config: &ConfigSnapshot,
    full_name: &str,
) -> Result<()> {
    let env = environment_snapshot(config);
    let listing = executor::run_query(
        state.shell(),
        &packages::owned_files_query(full_name),
        state.workspace_root(),
        &env,
    )?;
    let stems = packages::pc_stems(&listing.stdout);
    if stems.is_empty() {
        log::debug!("{full_name} ships no pkg-config modules; build settings untouched.");
        return Ok(());
    }
    let merged = packages::merge_libraries(&config.build.libraries, &stems);
    if merged != config.build.libraries {
        state
            .store()
            .set(state.library_scope(), "build.libraries", &merged)?;
        notify(
            config,
            NotifyLevel::All,
            &format!("build.libraries now tracks: {merged}"),
        );
    }
    if manifest::add_manifest_packages(state.workspace_root(), &stems)? {
        notify(
            config,
            NotifyLevel::All,
            "Updated pkg_check_modules in CMakeLists.txt.",
        );
    }
    Ok(())
}

/// After a confirmed removal: drop entries that referenced the package
/// from `build.libraries` and the project manifest.
pub fn shed_removed_package(
    state: &AppState,
    config: &ConfigSnapshot,
    full_name: &str,
) -> Result<()> {
    let pruned = packages::prune_libraries(&config.build.libraries, full_name);
    if pruned != config.build.libraries {
        state
            .store()
            .set(state.library_scope(), "build.libraries", &pruned)?;
        let shown = if pruned.is_empty() {
            "(none)"
        } else {
            pruned.as_str()
        };
        notify(
            config,
            NotifyLevel::All,
            &format!("build.libraries now tracks: {shown}"),
        );
    }
    let short = packages::short_package_name(full_name);
    if manifest::prune_manifest_packages(state.workspace_root(), short)? {
        notify(
            config,
            NotifyLevel::All,
            "Updated pkg_check_modules in CMakeLists.txt.",
        );
    }
    Ok(())
}

/// Validates a project name destined for the generated CMake `project()`
/// call. Returns the trimmed name on success.
pub fn validate_project_name(raw_name: &str) -> Result<String> {
    let name = raw_name.trim();
    if name.is_empty() {
        return Err(anyhow!("The project name cannot be empty."));
    }
    if name.contains(char::is_whitespace) {
        return Err(anyhow!("The project name cannot contain whitespace."));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(anyhow!("The project name cannot contain path separators."));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActiveFile;

    #[test]
    fn operation_descriptions_name_the_single_file() {
        let file = ActiveFile {
            path: PathBuf::from("hello.cpp"),
            text: String::new(),
        };
        let context = OperationContext::single_file(Some(file), false);
        assert_eq!(
            describe_operation(OperationKind::Build, &context),
            "Build hello.cpp"
        );
        assert_eq!(
            describe_operation(OperationKind::Clean, &OperationContext::project(false)),
            "Clean project"
        );
    }

    #[test]
    fn project_names_with_spaces_are_rejected() {
        assert!(validate_project_name("my app").is_err());
        assert!(validate_project_name("").is_err());
        assert!(validate_project_name("a/b").is_err());
        assert_eq!(validate_project_name("  gtk-demo  ").unwrap(), "gtk-demo");
    }
}
