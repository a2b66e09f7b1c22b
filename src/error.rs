// src/error.rs

//! Error types for repository synchronization

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Which kind of placement was in progress when a package failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Package had no destination counterpart
    Add,
    /// Package replaced an existing destination artifact
    Update,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Update => write!(f, "update"),
        }
    }
}

/// Coarse failure class, used by the binary to pick an exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Parse-level or otherwise unclassified failure
    Unspecified,
    /// The source location held no packages (or did not exist)
    NoPackages,
    /// The destination location is unusable
    Configuration,
    /// Placing an updated package failed
    UpdateFailed,
    /// Placing a new package failed
    AddFailed,
    /// The regeneration tool could not be run or reported failure
    Regeneration,
}

/// Errors produced while indexing, reconciling and placing artifacts
#[derive(Error, Debug)]
pub enum Error {
    /// Destination (or another required location) is missing or unusable
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Source location did not exist or contained no artifacts
    #[error("No .rpm packages found in {}", .0.display())]
    NoPackages(PathBuf),

    /// A file could not be read as a package artifact
    #[error("Failed to read package metadata from '{}': {reason}", path.display())]
    ExtractionError { path: PathBuf, reason: String },

    /// A directory below a scanned location could not be read
    #[error("Failed to scan '{}': {reason}", path.display())]
    ScanError { path: PathBuf, reason: String },

    /// Two artifacts in one scan resolved to the same package name
    #[error(
        "Duplicate package '{name}': '{}' and '{}'",
        first.display(),
        second.display()
    )]
    DuplicatePackage {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// A filesystem mutation for one package failed
    #[error("Failed to {kind} package '{package}': {reason}")]
    PlacementError {
        package: String,
        kind: ChangeKind,
        reason: String,
    },

    /// The regeneration tool could not be located
    #[error("Regeneration tool not found: {0}")]
    ToolNotFound(String),

    /// The regeneration tool failed to start, timed out or exited non-zero
    #[error("Regeneration failed: {0}")]
    RegenerationError(String),

    /// I/O error outside a classified operation
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Failure class of this error
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::ConfigError(_) => ErrorClass::Configuration,
            Self::NoPackages(_) => ErrorClass::NoPackages,
            Self::PlacementError { kind, .. } => match kind {
                ChangeKind::Add => ErrorClass::AddFailed,
                ChangeKind::Update => ErrorClass::UpdateFailed,
            },
            Self::ToolNotFound(_) | Self::RegenerationError(_) => ErrorClass::Regeneration,
            Self::ExtractionError { .. }
            | Self::ScanError { .. }
            | Self::DuplicatePackage { .. }
            | Self::IoError(_) => ErrorClass::Unspecified,
        }
    }

    /// Build a placement error from any displayable cause
    pub(crate) fn placement(
        package: &str,
        kind: ChangeKind,
        reason: impl fmt::Display,
    ) -> Self {
        Self::PlacementError {
            package: package.to_string(),
            kind,
            reason: reason.to_string(),
        }
    }
}
