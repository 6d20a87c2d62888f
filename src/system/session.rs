// src/system/session.rs
//
// Session lifecycle and dispatch. A session is an interactive MSYS2 login
// bash with its stdin piped (so commands can be injected) and its output
// flowing straight to the user's terminal. One session is designated
// "shared" and reused across operations; everything else is one-shot.
//
// Dispatch is fire-and-forget: sending the line is the end of the
// contract. Nothing here waits for the shell to finish a command, which
// is why package installs are observed by polling (core::poller) instead.

use crate::core::commons::quote_if_needed;
use crate::core::paths;
use crate::models::{ConfigSnapshot, OperationRequest, ShellSpec};
use crate::constants::MSYS2_ROOT_TOKEN;
use std::collections::BTreeMap;
use std::io::Write;
use std::process::{Child, Command as StdCommand, Stdio};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

const DISPATCH_SEPARATOR: &str = "------------------------------------------";

/// Grace period `dispose_shared` grants the shell to drain and exit on
/// EOF before it is killed.
const DISPOSE_POLL_INTERVAL: Duration = Duration::from_millis(50);
const DISPOSE_POLL_ATTEMPTS: u32 = 30;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Could not launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Session '{label}' has no attached input channel.")]
    MissingStdin { label: String },
    #[error("Could not write to session '{label}': {source}")]
    Write {
        label: String,
        #[source]
        source: std::io::Error,
    },
}

/// The variables baked into a session at creation time. `MSYSTEM` selects
/// the subsystem; `CHERE_INVOKING` keeps the login shell in its starting
/// directory. Theme and debug variables are omitted when empty so values
/// inherited from the parent environment survive. Custom entries are
/// applied last and may override anything (last write wins).
pub fn environment_snapshot(config: &ConfigSnapshot) -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();
    env.insert("MSYSTEM".to_string(), config.msys2.environment.clone());
    env.insert("CHERE_INVOKING".to_string(), "1".to_string());
    if !config.gtk.renderer.is_empty() {
        env.insert("GSK_RENDERER".to_string(), config.gtk.renderer.clone());
    }
    if !config.gtk.theme.is_empty() {
        env.insert("GTK_THEME".to_string(), config.gtk.theme.clone());
    }
    if !config.gtk.debug_flags.is_empty() {
        env.insert("GTK_DEBUG".to_string(), config.gtk.debug_flags.clone());
    }
    let root = paths::subsystem_root(&config.msys2.root);
    for (name, value) in &config.env.custom {
        env.insert(name.clone(), value.replace(MSYS2_ROOT_TOKEN, &root));
    }
    env
}

/// One interactive shell process attached to the user's terminal.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    label: String,
    child: Child,
    env: BTreeMap<String, String>,
}

impl Session {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The environment this session was created with. Fixed for the
    /// session's whole lifetime.
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Whether the underlying shell process is still running.
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    fn send_line(&mut self, line: &str) -> Result<(), SessionError> {
        let stdin = self
            .child
            .stdin
            .as_mut()
            .ok_or_else(|| SessionError::MissingStdin {
                label: self.label.clone(),
            })?;
        writeln!(stdin, "{line}")
            .and_then(|()| stdin.flush())
            .map_err(|e| SessionError::Write {
                label: self.label.clone(),
                source: e,
            })
    }

    /// Dropping the pipe sends EOF: the shell finishes whatever was
    /// submitted and then exits on its own.
    fn close_stdin(&mut self) {
        self.child.stdin.take();
    }
}

/// Owns the shared session and every one-shot spawned through it. The raw
/// `Session` handles never leave this type by value; callers address
/// sessions through dispatch so liveness is re-checked per access.
#[derive(Debug)]
pub struct SessionManager {
    shell: ShellSpec,
    shared: Option<Session>,
    one_shots: Vec<Session>,
}

impl SessionManager {
    pub fn new(shell: ShellSpec) -> Self {
        Self {
            shell,
            shared: None,
            one_shots: Vec::new(),
        }
    }

    pub fn shell(&self) -> &ShellSpec {
        &self.shell
    }

    /// Returns the shared session, creating a fresh one when none exists
    /// or the previous one has exited. The environment snapshot is
    /// computed only at creation time; settings changed afterwards do not
    /// reach a live session until it is disposed.
    pub fn shared_session(
        &mut self,
        config: &ConfigSnapshot,
    ) -> Result<&mut Session, SessionError> {
        let alive = self.shared.as_mut().is_some_and(Session::is_alive);
        if !alive {
            if let Some(mut dead) = self.shared.take() {
                let _ = dead.child.wait();
                log::debug!("Shared session {} exited; starting a new one.", dead.id);
            }
            let fresh = self.spawn_session("shared", environment_snapshot(config))?;
            self.shared = Some(fresh);
        }
        Ok(self
            .shared
            .as_mut()
            .expect("shared session was just ensured"))
    }

    /// Always constructs a fresh, non-shared session.
    pub fn create_session(
        &mut self,
        label: &str,
        config: &ConfigSnapshot,
    ) -> Result<Uuid, SessionError> {
        let session = self.spawn_session(label, environment_snapshot(config))?;
        let id = session.id;
        self.one_shots.push(session);
        Ok(id)
    }

    /// Sends one operation to a session as a single synthesized line and
    /// returns the receiving session's id. The line is: description echo,
    /// separator, optional `cd`, then every non-blank command joined with
    /// `&&` so a failing step aborts the rest. One line per dispatch is
    /// load-bearing: the interactive shell has no "command finished"
    /// signal, and a second line submitted early would interleave.
    pub fn dispatch(
        &mut self,
        request: &OperationRequest,
        config: &ConfigSnapshot,
    ) -> Result<Uuid, SessionError> {
        self.reap_finished();
        let append_exit = config.terminal.auto_close && !request.target.use_shared;
        let line = synthesize_line(request, append_exit);
        log::debug!("Dispatching: {line}");

        if request.target.use_shared {
            let reused = self.shared.as_mut().is_some_and(Session::is_alive);
            let session = self.shared_session(config)?;
            let delay = if reused {
                config.terminal.command_delay_ms
            } else {
                config.terminal.startup_delay_ms
            };
            thread::sleep(Duration::from_millis(delay));
            session.send_line(&line)?;
            Ok(session.id)
        } else {
            let mut session =
                self.spawn_session(&request.description, environment_snapshot(config))?;
            thread::sleep(Duration::from_millis(config.terminal.startup_delay_ms));
            session.send_line(&line)?;
            let id = session.id;
            self.one_shots.push(session);
            Ok(id)
        }
    }

    /// Tears down the shared session so the next dispatch rebuilds its
    /// environment snapshot. Called after environment-affecting settings
    /// change. Stdin closes first so a command already running can
    /// finish; a shell still alive after the grace period is killed.
    pub fn dispose_shared(&mut self) {
        if let Some(mut session) = self.shared.take() {
            log::debug!("Disposing shared session {}.", session.id);
            session.close_stdin();
            for _ in 0..DISPOSE_POLL_ATTEMPTS {
                if !session.is_alive() {
                    return;
                }
                thread::sleep(DISPOSE_POLL_INTERVAL);
            }
            log::debug!("Shared session {} ignored EOF; killing it.", session.id);
            let _ = session.child.kill();
            let _ = session.child.wait();
        }
    }

    /// Closes every session's input channel and blocks until the shells
    /// exit. One-shot CLI invocations end with this so the command only
    /// returns once its output is complete.
    pub fn wait_all(&mut self) {
        if let Some(session) = self.shared.as_mut() {
            session.close_stdin();
        }
        for session in &mut self.one_shots {
            session.close_stdin();
        }
        if let Some(mut session) = self.shared.take() {
            let _ = session.child.wait();
        }
        for mut session in self.one_shots.drain(..) {
            let _ = session.child.wait();
        }
    }

    fn spawn_session(
        &self,
        label: &str,
        env: BTreeMap<String, String>,
    ) -> Result<Session, SessionError> {
        let child = StdCommand::new(&self.shell.program)
            .args(&self.shell.interactive_args)
            .envs(&env)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| SessionError::Spawn {
                program: self.shell.program.display().to_string(),
                source: e,
            })?;
        log::debug!("Spawned session '{}' (pid {}).", label, child.id());
        Ok(Session {
            id: Uuid::new_v4(),
            label: label.to_string(),
            child,
            env,
        })
    }

    fn reap_finished(&mut self) {
        self.one_shots.retain_mut(Session::is_alive);
    }
}

fn synthesize_line(request: &OperationRequest, append_exit: bool) -> String {
    let mut parts: Vec<String> = vec![
        format!("echo {}", quote_if_needed(&request.description)),
        format!("echo {DISPATCH_SEPARATOR}"),
    ];
    if let Some(dir) = &request.target.working_dir {
        let subsystem_dir = paths::to_subsystem_path(&dir.to_string_lossy());
        parts.push(format!("cd {}", quote_if_needed(&subsystem_dir)));
    }
    parts.extend(
        request
            .commands
            .iter()
            .filter(|c| !c.trim().is_empty())
            .cloned(),
    );
    let mut line = parts.join(" && ");
    if append_exit {
        line.push_str(" ; exit");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DispatchTarget;

    fn quiet_config() -> ConfigSnapshot {
        let mut config = ConfigSnapshot::default();
        config.terminal.startup_delay_ms = 0;
        config.terminal.command_delay_ms = 0;
        config
    }

    fn request(commands: &[&str], target: DispatchTarget) -> OperationRequest {
        OperationRequest {
            commands: commands.iter().map(|c| c.to_string()).collect(),
            description: "op".to_string(),
            target,
        }
    }

    #[test]
    fn snapshot_always_selects_the_subsystem() {
        let env = environment_snapshot(&ConfigSnapshot::default());
        assert_eq!(env.get("MSYSTEM").map(String::as_str), Some("UCRT64"));
        assert_eq!(env.get("CHERE_INVOKING").map(String::as_str), Some("1"));
        assert_eq!(env.get("GSK_RENDERER").map(String::as_str), Some("cairo"));
    }

    #[test]
    fn empty_theme_and_debug_are_not_in_the_snapshot() {
        let env = environment_snapshot(&ConfigSnapshot::default());
        assert!(!env.contains_key("GTK_THEME"));
        assert!(!env.contains_key("GTK_DEBUG"));
    }

    #[test]
    fn custom_entries_win_on_collision() {
        let mut config = ConfigSnapshot::default();
        config
            .env
            .custom
            .insert("MSYSTEM".to_string(), "CLANG64".to_string());
        config
            .env
            .custom
            .insert("PKG_ROOT".to_string(), "${msys2Root}/ucrt64".to_string());
        let env = environment_snapshot(&config);
        assert_eq!(env.get("MSYSTEM").map(String::as_str), Some("CLANG64"));
        assert_eq!(
            env.get("PKG_ROOT").map(String::as_str),
            Some("/c/msys64/ucrt64")
        );
    }

    #[test]
    fn dispatch_line_is_one_chain_in_submission_order() {
        let line = synthesize_line(&request(&["cmd1", "cmd2"], DispatchTarget::shared()), false);
        assert!(!line.contains('\n'));
        let first = line.find("cmd1").unwrap();
        let second = line.find("cmd2").unwrap();
        assert!(first < second);
        assert!(line.contains("cmd1 && cmd2"));
        assert!(line.starts_with("echo op && echo"));
    }

    #[test]
    fn blank_commands_are_dropped_from_the_chain() {
        let line = synthesize_line(
            &request(&["cmd1", "   ", "", "cmd2"], DispatchTarget::shared()),
            false,
        );
        assert!(line.contains("cmd1 && cmd2"));
        assert!(!line.contains("&&  &&"));
    }

    #[test]
    fn working_directory_becomes_a_leading_cd() {
        let target = DispatchTarget::shared().in_dir("C:\\projects\\demo");
        let line = synthesize_line(&request(&["make"], target), false);
        let cd = line.find("cd /c/projects/demo").unwrap();
        let make = line.find("make").unwrap();
        assert!(cd < make);
    }

    #[test]
    fn auto_close_appends_an_unconditional_exit() {
        let line = synthesize_line(&request(&["cmd1"], DispatchTarget::transient()), true);
        assert!(line.ends_with("cmd1 ; exit"));
        let line = synthesize_line(&request(&["cmd1"], DispatchTarget::transient()), false);
        assert!(line.ends_with("cmd1"));
    }

    #[cfg(unix)]
    mod live {
        use super::*;
        use crate::models::{DispatchTarget, OperationRequest, ShellSpec};
        use crate::system::session::SessionManager;
        use std::path::PathBuf;

        fn sh_manager() -> SessionManager {
            SessionManager::new(ShellSpec {
                program: PathBuf::from("/bin/sh"),
                interactive_args: vec![],
                query_args: vec!["-c".to_string()],
            })
        }

        #[test]
        fn shared_session_keeps_its_identity_while_alive() {
            let mut manager = sh_manager();
            let config = quiet_config();
            let first = manager.shared_session(&config).unwrap().id();
            let second = manager.shared_session(&config).unwrap().id();
            assert_eq!(first, second);
            manager.wait_all();
        }

        #[test]
        fn an_exited_shared_session_is_replaced() {
            let mut manager = sh_manager();
            let config = quiet_config();
            let first = manager.shared_session(&config).unwrap().id();

            {
                let session = manager.shared_session(&config).unwrap();
                let _ = session.child.kill();
                let _ = session.child.wait();
            }

            let second = manager.shared_session(&config).unwrap().id();
            assert_ne!(first, second);
            manager.wait_all();
        }

        #[test]
        fn dispose_forces_a_fresh_environment() {
            let mut manager = sh_manager();
            let mut config = quiet_config();
            config
                .env
                .custom
                .insert("MARKER".to_string(), "one".to_string());

            let before = manager
                .shared_session(&config)
                .unwrap()
                .env()
                .get("MARKER")
                .cloned();
            assert_eq!(before.as_deref(), Some("one"));

            // A live session never re-reads settings.
            config
                .env
                .custom
                .insert("MARKER".to_string(), "two".to_string());
            let unchanged = manager
                .shared_session(&config)
                .unwrap()
                .env()
                .get("MARKER")
                .cloned();
            assert_eq!(unchanged.as_deref(), Some("one"));

            manager.dispose_shared();
            let after = manager
                .shared_session(&config)
                .unwrap()
                .env()
                .get("MARKER")
                .cloned();
            assert_eq!(after.as_deref(), Some("two"));
            manager.wait_all();
        }

        #[test]
        fn dispose_lets_an_in_flight_command_finish() {
            let dir = tempfile::tempdir().unwrap();
            let mut manager = sh_manager();
            let config = quiet_config();
            let request = OperationRequest {
                commands: vec!["sleep 0.2".to_string(), "touch finished.txt".to_string()],
                description: ".".to_string(),
                target: DispatchTarget::shared().in_dir(dir.path()),
            };
            manager.dispatch(&request, &config).unwrap();
            manager.dispose_shared();
            assert!(dir.path().join("finished.txt").exists());
        }

        #[test]
        fn dispatched_commands_run_in_the_working_directory() {
            let dir = tempfile::tempdir().unwrap();
            let mut manager = sh_manager();
            let config = quiet_config();
            let request = OperationRequest {
                commands: vec!["touch dispatched.txt".to_string()],
                description: ".".to_string(),
                target: DispatchTarget::transient().in_dir(dir.path()),
            };
            manager.dispatch(&request, &config).unwrap();
            manager.wait_all();
            assert!(dir.path().join("dispatched.txt").exists());
        }

        #[test]
        fn a_redirected_read_leaves_the_next_dispatch_intact() {
            let dir = tempfile::tempdir().unwrap();
            let mut manager = sh_manager();
            let config = quiet_config();

            // A `read` fed by the dispatch pipe would eat the first byte
            // of the following line. Redirecting its input elsewhere, as
            // the build pause does, must keep the pipe untouched.
            let pausing = OperationRequest {
                commands: vec!["true".to_string(), "read ignored < /dev/null".to_string()],
                description: ".".to_string(),
                target: DispatchTarget::shared().in_dir(dir.path()),
            };
            let follow_up = OperationRequest {
                commands: vec!["touch follow_up.txt".to_string()],
                description: ".".to_string(),
                target: DispatchTarget::shared().in_dir(dir.path()),
            };
            manager.dispatch(&pausing, &config).unwrap();
            manager.dispatch(&follow_up, &config).unwrap();
            manager.wait_all();
            assert!(dir.path().join("follow_up.txt").exists());
        }

        #[test]
        fn one_shot_sessions_get_distinct_identities() {
            let mut manager = sh_manager();
            let config = quiet_config();
            let request = request(&["true"], DispatchTarget::transient());
            let a = manager.dispatch(&request, &config).unwrap();
            let b = manager.dispatch(&request, &config).unwrap();
            assert_ne!(a, b);
            manager.wait_all();
        }
    }
}
