// src/cli/handlers/mod.rs

pub mod build;
pub mod clean;
pub mod commons;
pub mod config;
pub mod env;
pub mod info;
pub mod init;
pub mod install;
pub mod panel;
pub mod remove;
pub mod run;
pub mod search;
pub mod theme;
