// src/system/executor.rs

use crate::models::ShellSpec;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command '{command}' could not be executed: {source}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Command '{command}' produced output that was not valid UTF-8")]
    InvalidUtf8Output {
        command: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Captured result of a silent query. A non-zero exit is data, not an
/// error: probe callers read it as "not there yet" or "no results".
#[derive(Debug, Clone)]
pub struct QueryOutput {
    pub stdout: String,
    pub success: bool,
}

/// Runs one command line through the login shell with no visible surface.
/// Stdout is captured; stderr is discarded and stdin closed. Blocks until
/// the query exits.
pub fn run_query(
    shell: &ShellSpec,
    command_line: &str,
    cwd: &Path,
    env_vars: &BTreeMap<String, String>,
) -> Result<QueryOutput, ExecutionError> {
    let clean_cwd = dunce::simplified(cwd);
    log::trace!("Silent query: {command_line}");

    let output = StdCommand::new(&shell.program)
        .args(&shell.query_args)
        .arg(command_line)
        .current_dir(clean_cwd)
        .envs(env_vars)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| ExecutionError::CommandFailed {
            command: command_line.to_string(),
            source: e,
        })?;

    let stdout = String::from_utf8(output.stdout).map_err(|e| ExecutionError::InvalidUtf8Output {
        command: command_line.to_string(),
        source: e,
    })?;

    Ok(QueryOutput {
        stdout,
        success: output.status.success(),
    })
}
