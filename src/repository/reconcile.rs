// src/repository/reconcile.rs

//! Add/update partition between a source and a destination index

use super::index::PackageIndex;
use crate::packages::PackageRecord;
use std::collections::BTreeSet;

/// Partition of source packages against the destination
///
/// Versions are never compared: a source package whose name already exists
/// in the destination is an update, whatever the versions are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Names present in the source only
    pub to_add: BTreeSet<String>,
    /// Names present in both indexes
    pub to_update: BTreeSet<String>,
    /// Names present in the destination only; never touched
    pub untouched: BTreeSet<String>,
}

/// A single planned mutation
#[derive(Debug, Clone, Copy)]
pub enum PlannedAction<'a> {
    Add(&'a PackageRecord),
    Update {
        new: &'a PackageRecord,
        old: &'a PackageRecord,
    },
}

impl PlannedAction<'_> {
    /// Name of the package this action places
    pub fn name(&self) -> &str {
        match self {
            Self::Add(record) => record.name(),
            Self::Update { new, .. } => new.name(),
        }
    }
}

impl Reconciliation {
    /// True if there is nothing to place
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_update.is_empty()
    }

    /// Planned actions in package name order
    ///
    /// Adds and updates are interleaved by name, mirroring a walk over the
    /// source index.
    pub fn actions<'a>(
        &self,
        source: &'a PackageIndex,
        destination: &'a PackageIndex,
    ) -> Vec<PlannedAction<'a>> {
        source
            .records()
            .filter_map(|new| {
                if self.to_update.contains(new.name()) {
                    destination
                        .get(new.name())
                        .map(|old| PlannedAction::Update { new, old })
                } else if self.to_add.contains(new.name()) {
                    Some(PlannedAction::Add(new))
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Partition `source` into packages to add and packages to update
pub fn reconcile(source: &PackageIndex, destination: &PackageIndex) -> Reconciliation {
    let mut result = Reconciliation::default();

    for name in source.names() {
        if destination.contains(name) {
            result.to_update.insert(name.to_string());
        } else {
            result.to_add.insert(name.to_string());
        }
    }

    result.untouched = destination
        .names()
        .filter(|name| !source.contains(name))
        .map(str::to_string)
        .collect();

    result
}
