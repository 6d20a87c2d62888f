// src/cli/handlers/init.rs

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{Input, theme::ColorfulTheme};

use super::commons;
use crate::cli::InitArgs;
use crate::core::{manifest, packages};
use crate::models::ConfigScope;
use crate::state::AppState;

/// The main handler for the `init` command. Scaffolds a buildable GTK
/// starter project in the current directory.
pub fn handle(args: &InitArgs, state: &mut AppState) -> Result<()> {
    let config = state.snapshot()?;
    println!(
        "Initializing project in: {}",
        state.workspace_root().display()
    );

    // 1. Resolve and validate the project name.
    let name = resolve_project_name(args, state)?;

    // 2. Write the CMake manifest and the starter source. Refuses to
    //    overwrite an existing CMakeLists.txt. `--libs` accepts commas,
    //    but the scaffold and `build.libraries` take space-separated
    //    names.
    let libraries = match args.libs.as_deref() {
        Some(list) => packages::normalize_libraries(list),
        None => config.build.libraries.clone(),
    };
    manifest::write_project_scaffold(state.workspace_root(), &name, &libraries)
        .context("Could not write the project scaffold.")?;

    // 3. Mark the directory as a mallet workspace so settings written from
    //    here on stay local to it. An explicit --libs list always lands in
    //    the workspace file, where install and remove keep it current.
    if args.libs.is_some() || !state.store().has_workspace_config() {
        state
            .store()
            .set(ConfigScope::Workspace, "build.libraries", &libraries)?;
    }

    println!("\n{} Project '{}' is ready.", "✓".green().bold(), name.cyan());
    println!("  {}          compile and launch it", "mallet run".cyan());
    println!("  {}  review the toolchain", "mallet config list".cyan());
    Ok(())
}

/// Resolves the project name from the argument, or interactively with the
/// directory name as the default.
fn resolve_project_name(args: &InitArgs, state: &AppState) -> Result<String> {
    if let Some(name) = &args.name {
        // A name provided on the command line fails hard when invalid.
        return commons::validate_project_name(name);
    }

    let default_name = state
        .workspace_root()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "gtk-app".to_string());

    loop {
        let input: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Project name")
            .default(default_name.clone())
            .interact_text()?;

        match commons::validate_project_name(&input) {
            Ok(name) => return Ok(name),
            Err(e) => println!("{}", format!("Error: {e}").red()),
        }
    }
}
