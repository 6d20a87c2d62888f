// src/cli/handlers/build.rs

use anyhow::Result;

use super::commons;
use crate::cli::BuildArgs;
use crate::models::OperationKind;
use crate::state::AppState;

pub fn handle(args: &BuildArgs, state: &mut AppState) -> Result<()> {
    commons::dispatch_operation(state, OperationKind::Build, args.file.as_deref())
}
