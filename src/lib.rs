// src/lib.rs

//! Reposync
//!
//! Copies RPM artifacts from a drop directory into a repository tree laid
//! out as `<root>/<arch>/<file>`, keeping or purging the versions they
//! supersede, then runs a metadata generator such as `createrepo`.
//!
//! # Architecture
//!
//! - Indexes: package name to artifact, rebuilt from disk on every run
//! - Reconciliation: name collisions between source and destination are
//!   updates, everything else in the source is an addition
//! - Placement: copy into place, back up (`.bak`) or purge what is replaced
//! - Regeneration: one external tool run after every placement succeeded
//!
//! Runs are sequential and stop at the first failure.

mod error;
pub mod packages;
pub mod progress;
pub mod repository;
pub mod trigger;

pub use error::{ChangeKind, Error, ErrorClass, Result};
pub use packages::{MetadataExtractor, PackageRecord};
pub use progress::{CallbackObserver, LogObserver, SilentObserver, SyncEvent, SyncObserver};
pub use repository::{
    reconcile, sync_repository, DuplicatePolicy, IndexBuilder, PackageIndex, PlacementEngine,
    Reconciliation, ScanErrorPolicy, SyncConfig, SyncReport, Synchronizer, UpdatePolicy,
};
pub use trigger::{CommandRunner, ProcessRunner, RegenerationTrigger, DEFAULT_REGENERATE_TOOL};
