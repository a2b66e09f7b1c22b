// src/repository/mod.rs

//! Repository reconciliation
//!
//! This module provides functionality for:
//! - Indexing artifacts by package name (`index`)
//! - Partitioning source packages into additions and updates (`reconcile`)
//! - Placing artifacts into the architecture-partitioned tree (`placement`)
//! - Driving a complete sync run (`sync`)

pub mod index;
pub mod placement;
pub mod reconcile;
pub mod sync;

// Re-export main types and functions
pub use index::{
    is_artifact_name, DuplicatePolicy, IndexBuilder, PackageIndex, ScanErrorPolicy, ScanFailure,
    ARTIFACT_SUFFIX,
};
pub use placement::{backup_path, Placement, PlacementEngine, UpdatePolicy, BACKUP_SUFFIX};
pub use reconcile::{reconcile, PlannedAction, Reconciliation};
pub use sync::{sync_repository, SyncConfig, SyncReport, Synchronizer};
