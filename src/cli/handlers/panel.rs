// src/cli/handlers/panel.rs

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use dialoguer::{Input, theme::ColorfulTheme};

use crate::cli::{self, Command};
use crate::state::AppState;

/// A panel line is a mallet command without the binary name in front.
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
struct PanelLine {
    #[command(subcommand)]
    command: Command,
}

/// The interactive panel: a read, dispatch loop over the same handlers the
/// one-shot commands use. Because every iteration shares this process's
/// `AppState`, build and install commands land in one long-lived terminal
/// session instead of each spawning their own.
pub fn handle(state: &mut AppState) -> Result<()> {
    println!("\n{}", "--- mallet panel ---".bold());
    println!("Every command shares one terminal session.");
    println!(
        "Type {} for the command list, {} to leave.\n",
        "help".cyan(),
        "quit".cyan()
    );

    loop {
        let line: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("mallet")
            .allow_empty(true)
            .interact_text()?;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit" | "q") {
            break;
        }
        if line == "help" {
            print_command_list();
            continue;
        }

        let Some(tokens) = shlex::split(line) else {
            eprintln!("{}: unbalanced quotes in '{line}'.", "Error".red().bold());
            continue;
        };

        match PanelLine::try_parse_from(tokens) {
            Ok(parsed) => {
                if matches!(parsed.command, Command::Panel) {
                    println!("{}", "Already inside the panel.".yellow());
                    continue;
                }
                // A failed command is reported and the panel keeps going;
                // only I/O loss on the prompt itself ends the loop.
                if let Err(e) = cli::dispatch(parsed.command, state) {
                    eprintln!("{}: {e:#}", "Error".red().bold());
                }
            }
            Err(e) => {
                let _ = e.print();
            }
        }
    }
    Ok(())
}

fn print_command_list() {
    let mut definition = <cli::Cli as clap::CommandFactory>::command();
    let _ = definition.print_help();
    println!();
}
