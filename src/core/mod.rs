// src/core/mod.rs

pub mod commons;
pub mod composer;
pub mod config_store;
pub mod manifest;
pub mod packages;
pub mod paths;
pub mod poller;
