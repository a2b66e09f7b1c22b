// src/progress.rs

//! Progress reporting for sync runs
//!
//! The sync engine narrates what it does through the [`SyncObserver`]
//! trait. Implementations include:
//! - `SilentObserver`: no-op for library callers that only want the report
//! - `LogObserver`: forwards events to tracing
//! - `CallbackObserver`: hands every event to a closure
//!
//! The binary adds its own console observer for `--verbose`.

use crate::error::ChangeKind;
use crate::repository::{Placement, ScanFailure};
use std::path::PathBuf;
use tracing::{info, warn};

/// Which index an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSide {
    Source,
    Destination,
}

impl std::fmt::Display for IndexSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Destination => write!(f, "destination"),
        }
    }
}

/// Events emitted while a sync runs, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// An index was built
    Indexed {
        side: IndexSide,
        location: PathBuf,
        names: Vec<String>,
    },
    /// A candidate file could not be read and was left out of an index
    Skipped { side: IndexSide, failure: ScanFailure },
    /// The add/update partition is known
    Planned { to_add: usize, to_update: usize },
    /// A package is about to be placed
    Placing { name: String, kind: ChangeKind },
    /// A package was placed
    Placed(Placement),
    /// The regeneration tool is about to run
    Regenerating { command: String },
    /// The regeneration tool finished successfully
    Regenerated,
}

/// Receives [`SyncEvent`]s as a sync progresses
pub trait SyncObserver {
    fn on_event(&self, event: &SyncEvent);
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl SyncObserver for SilentObserver {
    fn on_event(&self, _event: &SyncEvent) {}
}

/// Observer that logs events at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl SyncObserver for LogObserver {
    fn on_event(&self, event: &SyncEvent) {
        match event {
            SyncEvent::Indexed {
                side,
                location,
                names,
            } => info!(
                "Indexed {} package(s) in {} {}",
                names.len(),
                side,
                location.display()
            ),
            SyncEvent::Skipped { side, failure } => warn!(
                "Skipped unreadable {} file {}: {}",
                side,
                failure.path.display(),
                failure.reason
            ),
            SyncEvent::Planned { to_add, to_update } => {
                info!("Planned {} addition(s), {} update(s)", to_add, to_update)
            }
            SyncEvent::Placing { name, kind } => info!("Placing {} ({})", name, kind),
            SyncEvent::Placed(placement) => {
                info!("Placed {} at {}", placement.name, placement.path.display())
            }
            SyncEvent::Regenerating { command } => info!("Running {}", command),
            SyncEvent::Regenerated => info!("Repository metadata regenerated"),
        }
    }
}

/// Observer that calls a closure for each event
pub struct CallbackObserver<F>
where
    F: Fn(&SyncEvent),
{
    callback: F,
}

impl<F> CallbackObserver<F>
where
    F: Fn(&SyncEvent),
{
    /// Create a new callback observer
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> SyncObserver for CallbackObserver<F>
where
    F: Fn(&SyncEvent),
{
    fn on_event(&self, event: &SyncEvent) {
        (self.callback)(event);
    }
}
