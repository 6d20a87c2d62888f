// src/cli/handlers/run.rs

use anyhow::Result;

use super::commons;
use crate::cli::RunArgs;
use crate::models::OperationKind;
use crate::state::AppState;

/// `run` always compiles first. An incremental build of an unchanged tree
/// is close to free, and it guarantees the launched binary matches the
/// sources on disk.
pub fn handle(args: &RunArgs, state: &mut AppState) -> Result<()> {
    commons::dispatch_operation(state, OperationKind::BuildAndRun, args.file.as_deref())
}
