// src/state.rs

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::core::config_store::ConfigStore;
use crate::core::paths;
use crate::models::{ConfigScope, ConfigSnapshot, ShellSpec};
use crate::system::{session::SessionManager, shells};

/// Everything a command handler needs: where the workspace is, how to read
/// and write settings, and the sessions spawned so far. One instance lives
/// for the whole process, so the panel reuses its shared session across
/// commands while a one-shot invocation tears everything down on exit.
pub struct AppState {
    workspace_root: PathBuf,
    store: ConfigStore,
    manager: SessionManager,
}

impl AppState {
    /// Builds the state for the directory `--dir` names, or for the current
    /// directory when it is absent.
    pub fn initialize(dir: Option<&Path>) -> Result<Self> {
        let workspace_root = match dir {
            Some(requested) => {
                let expanded = paths::expand_user_path(&requested.to_string_lossy())?;
                let resolved = dunce::canonicalize(&expanded).unwrap_or(expanded);
                if !resolved.is_dir() {
                    bail!("No workspace at '{}'.", resolved.display());
                }
                resolved
            }
            None => {
                let cwd = std::env::current_dir()
                    .context("Could not determine the current directory.")?;
                // Canonicalize for stable display and joins; if the directory
                // vanished mid-call, the raw path still lets read-only
                // commands run.
                dunce::canonicalize(&cwd).unwrap_or(cwd)
            }
        };
        let store = ConfigStore::for_workspace(&workspace_root)?;
        let config = store.snapshot()?;
        let shell = shells::login_shell(&config)?;
        Ok(Self {
            workspace_root,
            store,
            manager: SessionManager::new(shell),
        })
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn manager(&mut self) -> &mut SessionManager {
        &mut self.manager
    }

    pub fn shell(&self) -> &ShellSpec {
        self.manager.shell()
    }

    /// The merged view of both configuration scopes, re-read on every call
    /// so a `config set` is visible to the next operation immediately.
    pub fn snapshot(&self) -> Result<ConfigSnapshot> {
        self.store
            .snapshot()
            .context("Could not load the configuration.")
    }

    /// Where `build.libraries` updates from install and remove should land:
    /// the workspace file once one exists, the global file otherwise. A
    /// project keeps its own library list; a bare directory falls back to
    /// the machine-wide default.
    pub fn library_scope(&self) -> ConfigScope {
        if self.store.has_workspace_config() {
            ConfigScope::Workspace
        } else {
            ConfigScope::Global
        }
    }

    /// Discards every live session and rebuilds the manager from the current
    /// settings. Sessions capture their environment at spawn time, so this
    /// is the only way a changed `msys2.*`, `gtk.*` or `env.custom` value
    /// reaches a future session.
    pub fn reset_sessions(&mut self) -> Result<()> {
        self.manager.dispose_shared();
        self.manager.wait_all();
        let config = self.snapshot()?;
        self.manager = SessionManager::new(shells::login_shell(&config)?);
        Ok(())
    }

    /// Blocks until every spawned session has drained and exited. Called
    /// once on the way out so dispatched output finishes printing before
    /// the process returns.
    pub fn shutdown(&mut self) {
        self.manager.wait_all();
    }
}
