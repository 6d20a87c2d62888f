// src/cli/handlers/clean.rs

use anyhow::Result;
use dialoguer::{Confirm, theme::ColorfulTheme};

use super::commons;
use crate::cli::CleanArgs;
use crate::models::OperationKind;
use crate::state::AppState;

pub fn handle(args: &CleanArgs, state: &mut AppState) -> Result<()> {
    if !args.yes {
        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Remove the build outputs?")
            .default(false)
            .interact()?;
        if !proceed {
            println!("Clean cancelled.");
            return Ok(());
        }
    }
    commons::dispatch_operation(state, OperationKind::Clean, None)
}
