// src/system/shells.rs

use crate::core::paths::expand_user_path;
use crate::models::{ConfigSnapshot, ShellSpec};
use anyhow::Result;
use std::path::PathBuf;

/// Builds the launch spec for the MSYS2 login bash of the configured root.
///
/// The path is deliberately not checked for existence here: a wrong
/// `msys2.root` surfaces as a spawn error the user sees directly, with the
/// offending path in the message.
pub fn login_shell(config: &ConfigSnapshot) -> Result<ShellSpec> {
    let program = if cfg!(target_os = "windows") {
        let root = expand_user_path(&config.msys2.root)?;
        dunce::simplified(&root.join("usr").join("bin").join("bash.exe")).to_path_buf()
    } else {
        // No MSYS2 install to point at outside Windows; the host's login
        // bash gives the same dispatch surface for development.
        PathBuf::from("bash")
    };
    Ok(ShellSpec {
        program,
        interactive_args: vec!["--login".to_string(), "-i".to_string()],
        query_args: vec!["--login".to_string(), "-c".to_string()],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_shell_is_interactive_and_queryable() {
        let spec = login_shell(&ConfigSnapshot::default()).unwrap();
        assert_eq!(spec.interactive_args, vec!["--login", "-i"]);
        assert_eq!(spec.query_args, vec!["--login", "-c"]);
    }

    #[cfg(windows)]
    #[test]
    fn program_lives_under_the_configured_root() {
        let mut config = ConfigSnapshot::default();
        config.msys2.root = "D:\\tools\\msys64".to_string();
        let spec = login_shell(&config).unwrap();
        assert!(spec.program.ends_with("usr\\bin\\bash.exe"));
        assert!(spec.program.starts_with("D:\\tools\\msys64"));
    }

    #[cfg(unix)]
    #[test]
    fn program_is_the_host_bash() {
        let spec = login_shell(&ConfigSnapshot::default()).unwrap();
        assert_eq!(spec.program, PathBuf::from("bash"));
    }
}
