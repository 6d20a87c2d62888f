//! # System Interaction Layer
//!
//! This module is the boundary between composed command text and the
//! operating system: locating the MSYS2 login shell, running silent
//! queries against it, and owning the interactive sessions commands are
//! dispatched into.
//!
//! ## Modules
//!
//! - **`shells`**: Resolves the login-shell launch spec for the configured
//!   MSYS2 root.
//! - **`executor`**: Runs silent, captured one-shot queries through the
//!   login shell (completion probes, package metadata lookups).
//! - **`session`**: The session lifecycle: the shared interactive session,
//!   one-shot sessions, environment snapshots and line dispatch.

pub mod executor;
pub mod session;
pub mod shells;
