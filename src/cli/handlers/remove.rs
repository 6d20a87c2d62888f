// src/cli/handlers/remove.rs

use anyhow::Result;
use colored::Colorize;

use super::commons;
use crate::cli::RemoveArgs;
use crate::core::{packages, poller::PollOutcome};
use crate::models::{DispatchTarget, NotifyLevel, OperationRequest};
use crate::state::AppState;

/// The mirror image of `install`: dispatch the removal, poll until the
/// package database no longer lists the package, then prune references
/// that would break the next build.
pub fn handle(args: &RemoveArgs, state: &mut AppState) -> Result<()> {
    let config = state.snapshot()?;
    let full_name = packages::full_package_name(&config.msys2.environment, &args.package);

    let request = OperationRequest {
        commands: vec![packages::remove_command(&full_name)],
        description: format!("Remove {full_name}"),
        target: DispatchTarget::shared().in_dir(state.workspace_root()),
    };
    state.manager().dispatch(&request, &config)?;
    commons::notify(
        &config,
        NotifyLevel::All,
        &format!("Removing {}. Waiting for pacman...", full_name.cyan()),
    );

    let predicate = packages::removed_predicate(&full_name);
    match commons::await_package_state(state, &config, &predicate) {
        PollOutcome::Succeeded { attempts } => {
            log::debug!("Removal of {full_name} confirmed after {attempts} checks.");
            commons::shed_removed_package(state, &config, &full_name)?;
            commons::notify(
                &config,
                NotifyLevel::Important,
                &format!("{} removed.", full_name.green()),
            );
        }
        PollOutcome::TimedOut { attempts } => {
            commons::notify(
                &config,
                NotifyLevel::Important,
                &format!(
                    "{}",
                    format!(
                        "No confirmation that '{full_name}' was removed after {attempts} \
                         checks. pacman may have refused (dependent packages?); build \
                         settings were left untouched."
                    )
                    .yellow()
                ),
            );
        }
    }
    Ok(())
}
