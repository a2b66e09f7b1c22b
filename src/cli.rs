// src/cli.rs
//! CLI definitions for reposync
//!
//! This module contains the command-line interface definition using clap.
//! The command implementation is in the `commands` module.

use clap::{Parser, ValueEnum};
use reposync::{DuplicatePolicy, DEFAULT_REGENERATE_TOOL};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "reposync")]
#[command(author = "Reposync Contributors")]
#[command(version)]
#[command(about = "Copy .rpm packages into a repository tree and regenerate its metadata", long_about = None)]
pub struct Cli {
    /// Package file or directory to get .rpm's from
    pub source: PathBuf,

    /// Repository directory to put .rpm's into
    pub destination: PathBuf,

    /// Copy packages from subdirectories of the source too
    #[arg(short, long)]
    pub recursive: bool,

    /// Purge (do not back up) superseded packages
    #[arg(short, long)]
    pub purge: bool,

    /// Program to run on the destination afterwards (empty to skip)
    #[arg(short = 'x', long, value_name = "PROGRAM", default_value = DEFAULT_REGENERATE_TOOL)]
    pub execute: String,

    /// Do not run the regeneration program
    #[arg(long)]
    pub no_regenerate: bool,

    /// Give up on the regeneration program after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// How to resolve two files providing the same package in one scan
    #[arg(long, value_enum, default_value_t = DuplicateMode::LastWins)]
    pub on_duplicate: DuplicateMode,

    /// Abort when a candidate file is not a readable package
    #[arg(long)]
    pub strict: bool,

    /// Show what would be copied without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Command-line spelling of [`DuplicatePolicy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DuplicateMode {
    /// Keep the file scanned last
    LastWins,
    /// Keep the file scanned first
    FirstWins,
    /// Fail the run
    Error,
}

impl From<DuplicateMode> for DuplicatePolicy {
    fn from(mode: DuplicateMode) -> Self {
        match mode {
            DuplicateMode::LastWins => DuplicatePolicy::LastWins,
            DuplicateMode::FirstWins => DuplicatePolicy::FirstWins,
            DuplicateMode::Error => DuplicatePolicy::Error,
        }
    }
}
