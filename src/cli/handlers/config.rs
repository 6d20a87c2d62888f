// src/cli/handlers/config.rs

use anyhow::{Result, anyhow};
use colored::Colorize;

use super::commons;
use crate::cli::{ConfigArgs, ConfigCommand};
use crate::core::config_store::{self, KNOWN_KEYS};
use crate::models::{ConfigScope, NotifyLevel};
use crate::state::AppState;

pub fn handle(args: &ConfigArgs, state: &mut AppState) -> Result<()> {
    match &args.command {
        ConfigCommand::List => list(state),
        ConfigCommand::Get { key } => get(state, key),
        ConfigCommand::Set { key, value, local } => set(state, key, value, *local),
        ConfigCommand::Unset { key, local } => unset(state, key, *local),
        ConfigCommand::Path => paths(state),
    }
}

/// Settings are machine-wide by default; `--local` pins one to the
/// workspace file, where it shadows the global value.
fn scope_for(local: bool) -> ConfigScope {
    if local {
        ConfigScope::Workspace
    } else {
        ConfigScope::Global
    }
}

fn list(state: &AppState) -> Result<()> {
    let snapshot = state.snapshot()?;
    for key in KNOWN_KEYS {
        if let Some(value) = config_store::lookup(&snapshot, key) {
            println!("{} = {}", key.cyan(), value);
        }
    }
    for (name, value) in &snapshot.env.custom {
        println!("{} = {}", format!("env.custom.{name}").cyan(), value);
    }
    Ok(())
}

fn get(state: &AppState, key: &str) -> Result<()> {
    let snapshot = state.snapshot()?;
    match config_store::lookup(&snapshot, key) {
        // Bare value, so `$(mallet config get msys2.root)` composes.
        Some(value) => {
            println!("{value}");
            Ok(())
        }
        None => Err(anyhow!(
            "'{}' is not set. Run '{}' to see every setting.",
            key.yellow(),
            "mallet config list".cyan()
        )),
    }
}

fn set(state: &mut AppState, key: &str, value: &str, local: bool) -> Result<()> {
    let scope = scope_for(local);
    state.store().set(scope, key, value)?;
    let config = state.snapshot()?;
    commons::notify(
        &config,
        NotifyLevel::Important,
        &format!("{} = {} ({} scope)", key.cyan(), value, scope),
    );
    if config_store::is_env_affecting(key) {
        state.reset_sessions()?;
        commons::notify(
            &config,
            NotifyLevel::All,
            "Session environment changed; the next operation starts a fresh session.",
        );
    }
    Ok(())
}

fn unset(state: &mut AppState, key: &str, local: bool) -> Result<()> {
    let scope = scope_for(local);
    let removed = state.store().unset(scope, key)?;
    let config = state.snapshot()?;
    if removed {
        commons::notify(
            &config,
            NotifyLevel::Important,
            &format!("{} no longer overridden in the {} scope.", key.cyan(), scope),
        );
        if config_store::is_env_affecting(key) {
            state.reset_sessions()?;
        }
    } else {
        commons::notify(
            &config,
            NotifyLevel::Important,
            &format!("{} had no override in the {} scope.", key.cyan(), scope),
        );
    }
    Ok(())
}

fn paths(state: &AppState) -> Result<()> {
    for scope in [ConfigScope::Global, ConfigScope::Workspace] {
        let path = state.store().scope_path(scope);
        let marker = if path.is_file() {
            "present".green()
        } else {
            "absent".dimmed()
        };
        println!("{:<10} {} ({})", scope.to_string(), path.display(), marker);
    }
    Ok(())
}
