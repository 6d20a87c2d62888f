// src/bin/mallet.rs

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use mallet::cli::{self, Cli};
use mallet::state::AppState;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        // Centralized error reporting: handlers only propagate.
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut state = AppState::initialize(cli.dir.as_deref())
        .context("Could not prepare the workspace state.")?;
    init_logging(&state);
    log::debug!("Workspace root: {}", state.workspace_root().display());

    let result = cli::dispatch(cli.command, &mut state);
    // Sessions print directly to this terminal; hold the process open
    // until they have drained, whatever the handler returned.
    state.shutdown();
    result
}

/// `RUST_LOG` always wins; `diagnostics.logging = true` raises the default
/// level to debug for users who never touch environment variables.
fn init_logging(state: &AppState) {
    let verbose = state
        .snapshot()
        .map(|config| config.diagnostics.logging)
        .unwrap_or(false);
    let mut builder = env_logger::Builder::from_default_env();
    if verbose && std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}
