// src/cli/handlers/search.rs

use anyhow::Result;
use colored::Colorize;

use crate::cli::SearchArgs;
use crate::core::packages;
use crate::state::AppState;
use crate::system::{executor, session::environment_snapshot};

/// Runs `pacman -Ssq` silently and prints the results itself; no visible
/// session is involved. The listing is constrained to the active
/// environment's package prefix, and names are printed in their short
/// form so they can be passed straight to `install`. A failed or empty
/// query degrades to "no matches" rather than an error, mirroring how
/// pacman exits non-zero when nothing is found.
pub fn handle(args: &SearchArgs, state: &AppState) -> Result<()> {
    let config = state.snapshot()?;
    let env = environment_snapshot(&config);
    let query = packages::search_command(&args.term);
    let output = executor::run_query(state.shell(), &query, state.workspace_root(), &env)?;

    let names = packages::matching_short_names(&output.stdout, &config.msys2.environment);
    if names.is_empty() {
        println!("No packages match '{}'.", args.term.yellow());
        return Ok(());
    }
    for name in &names {
        println!("{name}");
    }
    Ok(())
}
