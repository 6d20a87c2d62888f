// src/cli/handlers/env.rs

use anyhow::Result;
use colored::Colorize;

use crate::core::composer;
use crate::state::AppState;
use crate::system::session::environment_snapshot;

/// Shows exactly what a freshly spawned session would see: the process
/// environment it inherits and the `export` lines prefixed to every
/// operation. Useful when a build works in one terminal and not another.
pub fn handle(state: &AppState) -> Result<()> {
    let config = state.snapshot()?;

    println!("\n{}", "Process environment".bold());
    for (name, value) in environment_snapshot(&config) {
        println!("  {name}={value}");
    }

    println!("\n{}", "Session exports".bold());
    for line in composer::environment_exports(&config) {
        println!("  {line}");
    }
    Ok(())
}
