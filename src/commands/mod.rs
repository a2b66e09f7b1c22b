// src/commands/mod.rs
//! Command handlers for the reposync CLI

mod sync;

pub use sync::cmd_sync;
