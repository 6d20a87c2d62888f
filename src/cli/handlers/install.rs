// src/cli/handlers/install.rs

use anyhow::Result;
use colored::Colorize;

use super::commons;
use crate::cli::InstallArgs;
use crate::core::{packages, poller::PollOutcome};
use crate::models::{DispatchTarget, NotifyLevel, OperationRequest};
use crate::state::AppState;

/// The main handler for the `install` command.
///
/// pacman runs in the visible session so its download progress stays on
/// screen, while this process polls the package database for completion.
/// Only a confirmed install touches the build settings.
pub fn handle(args: &InstallArgs, state: &mut AppState) -> Result<()> {
    let config = state.snapshot()?;
    let full_name = packages::full_package_name(&config.msys2.environment, &args.package);

    let request = OperationRequest {
        commands: vec![packages::install_command(&full_name)],
        description: format!("Install {full_name}"),
        target: DispatchTarget::shared().in_dir(state.workspace_root()),
    };
    state.manager().dispatch(&request, &config)?;
    commons::notify(
        &config,
        NotifyLevel::All,
        &format!("Installing {}. Waiting for pacman...", full_name.cyan()),
    );

    let predicate = packages::installed_predicate(&full_name);
    match commons::await_package_state(state, &config, &predicate) {
        PollOutcome::Succeeded { attempts } => {
            log::debug!("Install of {full_name} confirmed after {attempts} checks.");
            commons::absorb_installed_package(state, &config, &full_name)?;
            commons::notify(
                &config,
                NotifyLevel::Important,
                &format!("{} installed.", full_name.green()),
            );
        }
        PollOutcome::TimedOut { attempts } => {
            commons::notify(
                &config,
                NotifyLevel::Important,
                &format!(
                    "{}",
                    format!(
                        "No confirmation that '{full_name}' finished installing after \
                         {attempts} checks. The session may still be working; build \
                         settings were left untouched."
                    )
                    .yellow()
                ),
            );
        }
    }
    Ok(())
}
