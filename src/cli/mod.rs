// src/cli/mod.rs

pub mod handlers;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::state::AppState;

#[derive(Parser, Debug)]
#[command(
    name = "mallet",
    version,
    about = "A build companion for MSYS2 GTK application development.",
    long_about = "Drives an MSYS2 login shell to build, run and clean native GTK \
                  applications, and keeps pacman packages in sync with the build \
                  configuration."
)]
pub struct Cli {
    /// Act on this directory instead of the current one.
    #[arg(long, global = true, value_name = "PATH")]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile the workspace, in project or single-file mode.
    #[command(visible_alias = "b")]
    Build(BuildArgs),
    /// Compile the workspace and launch the produced binary.
    #[command(visible_alias = "r")]
    Run(RunArgs),
    /// Remove build outputs.
    Clean(CleanArgs),
    /// Install an MSYS2 package and wire it into the build settings.
    Install(InstallArgs),
    /// Remove an MSYS2 package and prune stale references to it.
    #[command(visible_alias = "rm")]
    Remove(RemoveArgs),
    /// Search the pacman repositories.
    Search(SearchArgs),
    /// Activate a GTK theme, optionally installing it first.
    Theme(ThemeArgs),
    /// Read or change settings.
    Config(ConfigArgs),
    /// Show the effective toolchain and workspace state.
    Info(InfoArgs),
    /// Print the environment a new session would receive.
    Env,
    /// Scaffold a starter GTK project in the workspace.
    Init(InitArgs),
    /// Interactive panel sharing one terminal session across commands.
    #[command(visible_alias = "repl")]
    Panel,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Source file for single-file mode. Defaults to the only C/C++ file
    /// at the workspace root.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Source file for single-file mode. Defaults to the only C/C++ file
    /// at the workspace root.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Skip the confirmation prompt.
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Package name, with or without the subsystem prefix.
    pub package: String,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Package name, with or without the subsystem prefix.
    pub package: String,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Term passed to `pacman -Ssq`.
    pub term: String,
}

#[derive(Args, Debug)]
pub struct ThemeArgs {
    /// Theme name as GTK expects it, e.g. 'Adwaita:dark'.
    #[arg(value_name = "NAME", required_unless_present = "clear")]
    pub name: Option<String>,

    /// Install this pacman package before activating the theme.
    #[arg(long, value_name = "PACKAGE")]
    pub package: Option<String>,

    /// Stop exporting `GTK_THEME`.
    #[arg(long, conflicts_with_all = ["name", "package"])]
    pub clear: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show every setting and its effective value.
    List,
    /// Print one effective value.
    Get { key: String },
    /// Change a setting.
    Set {
        key: String,
        value: String,
        /// Write to the workspace file instead of the global one.
        #[arg(long)]
        local: bool,
    },
    /// Remove an override, revealing the value underneath.
    Unset {
        key: String,
        /// Remove from the workspace file.
        #[arg(long)]
        local: bool,
    },
    /// Show where each configuration scope is stored.
    Path,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Emit the report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project name. Prompts when omitted.
    pub name: Option<String>,

    /// Comma-separated pkg-config libraries for the scaffold.
    #[arg(long, value_name = "LIST")]
    pub libs: Option<String>,
}

/// Routes a parsed command to its handler. The panel calls back into this
/// with the same `AppState`, which is what lets its commands share one
/// session manager.
pub fn dispatch(command: Command, state: &mut AppState) -> Result<()> {
    match command {
        Command::Build(args) => handlers::build::handle(&args, state),
        Command::Run(args) => handlers::run::handle(&args, state),
        Command::Clean(args) => handlers::clean::handle(&args, state),
        Command::Install(args) => handlers::install::handle(&args, state),
        Command::Remove(args) => handlers::remove::handle(&args, state),
        Command::Search(args) => handlers::search::handle(&args, state),
        Command::Theme(args) => handlers::theme::handle(&args, state),
        Command::Config(args) => handlers::config::handle(&args, state),
        Command::Info(args) => handlers::info::handle(&args, state),
        Command::Env => handlers::env::handle(state),
        Command::Init(args) => handlers::init::handle(&args, state),
        Command::Panel => handlers::panel::handle(state),
    }
}
