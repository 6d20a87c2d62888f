// src/cli/handlers/theme.rs

use anyhow::Result;
use colored::Colorize;

use super::commons;
use crate::cli::ThemeArgs;
use crate::core::{packages, poller::PollOutcome};
use crate::models::{ConfigScope, DispatchTarget, NotifyLevel, OperationRequest};
use crate::state::AppState;

/// Activates a GTK theme for every session the tool spawns. Themes apply
/// machine-wide, so the setting always lands in the global scope. With
/// `--package` the theme is downloaded first and only activated once
/// pacman confirms the install.
pub fn handle(args: &ThemeArgs, state: &mut AppState) -> Result<()> {
    if args.clear {
        return clear(state);
    }
    let name = args
        .name
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("Specify a theme name, or use --clear."))?;

    if let Some(package) = args.package.as_deref() {
        if !install(state, package)? {
            return Ok(());
        }
    }
    activate(state, name)
}

/// Theme packages go to a dedicated throwaway terminal instead of the
/// shared session: they are one-off downloads, not part of the
/// edit-build-run loop the shared session exists for. Returns whether
/// the install was confirmed.
fn install(state: &mut AppState, package: &str) -> Result<bool> {
    let config = state.snapshot()?;
    let full_name = packages::full_package_name(&config.msys2.environment, package);

    let request = OperationRequest {
        commands: vec![packages::install_command(&full_name)],
        description: format!("Install theme {full_name}"),
        target: DispatchTarget::transient().in_dir(state.workspace_root()),
    };
    state.manager().dispatch(&request, &config)?;
    commons::notify(
        &config,
        NotifyLevel::All,
        &format!("Installing {full_name}... Waiting for pacman to finish."),
    );

    let predicate = packages::installed_predicate(&full_name);
    match commons::await_package_state(state, &config, &predicate) {
        PollOutcome::Succeeded { .. } => Ok(true),
        PollOutcome::TimedOut { attempts } => {
            commons::notify(
                &config,
                NotifyLevel::Important,
                &format!(
                    "{}",
                    format!(
                        "No confirmation that '{full_name}' finished installing after \
                         {attempts} checks. The theme was not activated; run the \
                         command again once the terminal is done."
                    )
                    .yellow()
                ),
            );
            Ok(false)
        }
    }
}

fn activate(state: &mut AppState, name: &str) -> Result<()> {
    state.store().set(ConfigScope::Global, "gtk.theme", name)?;
    // Sessions export GTK_THEME at spawn time; live ones keep the old one.
    state.reset_sessions()?;
    let config = state.snapshot()?;
    commons::notify(
        &config,
        NotifyLevel::Important,
        &format!("GTK_THEME will be '{}' in new sessions.", name.cyan()),
    );
    Ok(())
}

fn clear(state: &mut AppState) -> Result<()> {
    state.store().unset(ConfigScope::Global, "gtk.theme")?;
    state.reset_sessions()?;
    let config = state.snapshot()?;
    commons::notify(
        &config,
        NotifyLevel::Important,
        "GTK_THEME will no longer be exported in new sessions.",
    );
    Ok(())
}
