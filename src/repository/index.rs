// src/repository/index.rs

//! Package indexes
//!
//! An index maps package names to the artifact that provides them. Indexes
//! are rebuilt from the filesystem on every run and never persisted.
//!
//! The builder accepts three kinds of location:
//! - a single file, which must be a readable artifact
//! - a directory, scanning only its immediate children
//! - a directory tree, scanning every file beneath it (`recursive`)
//!
//! Anything else (missing path, socket, a directory that cannot be listed)
//! yields `None`, which callers must treat differently from an index that is
//! merely empty. Unreadable files and subdirectories below the root are
//! recorded in [`PackageIndex::skipped`].

use crate::error::{Error, Result};
use crate::packages::{MetadataExtractor, PackageRecord};
use std::collections::btree_map::{self, BTreeMap};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File name suffix of artifacts considered during directory scans
pub const ARTIFACT_SUFFIX: &str = ".rpm";

/// Returns true if the file name carries the artifact suffix
pub fn is_artifact_name(name: &OsStr) -> bool {
    name.as_encoded_bytes().ends_with(ARTIFACT_SUFFIX.as_bytes())
}

/// What to do when two artifacts in one scan share a package name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// The artifact scanned later replaces the earlier one
    #[default]
    LastWins,
    /// The first artifact scanned is kept
    FirstWins,
    /// Fail the scan
    Error,
}

/// What to do when a candidate file or subdirectory cannot be read during a
/// directory scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanErrorPolicy {
    /// Record the failure in the index and keep scanning
    #[default]
    Skip,
    /// Abort the scan with the underlying error
    Abort,
}

/// A candidate file or subdirectory that was skipped because it could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Mapping from package name to its artifact
#[derive(Debug, Clone, Default)]
pub struct PackageIndex {
    packages: BTreeMap<String, PackageRecord>,
    skipped: Vec<ScanFailure>,
}

impl PackageIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of packages in the index
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// True if no package was indexed
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Look up a package by name
    pub fn get(&self, name: &str) -> Option<&PackageRecord> {
        self.packages.get(name)
    }

    /// True if a package with this name is indexed
    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// Package names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// Records in name order
    pub fn records(&self) -> impl Iterator<Item = &PackageRecord> {
        self.packages.values()
    }

    /// Candidate files that could not be read during the scan
    pub fn skipped(&self) -> &[ScanFailure] {
        &self.skipped
    }

    /// Insert a record, resolving name collisions with `policy`
    pub fn insert(&mut self, record: PackageRecord, policy: DuplicatePolicy) -> Result<()> {
        match self.packages.entry(record.name().to_string()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(record);
            }
            btree_map::Entry::Occupied(mut slot) => {
                let existing = slot.get().path().to_path_buf();
                match policy {
                    DuplicatePolicy::LastWins => {
                        warn!(
                            "Package '{}' provided by both {} and {}; keeping the latter",
                            record.name(),
                            existing.display(),
                            record.path().display()
                        );
                        slot.insert(record);
                    }
                    DuplicatePolicy::FirstWins => {
                        warn!(
                            "Package '{}' provided by both {} and {}; keeping the former",
                            record.name(),
                            existing.display(),
                            record.path().display()
                        );
                    }
                    DuplicatePolicy::Error => {
                        return Err(Error::DuplicatePackage {
                            name: record.name().to_string(),
                            first: existing,
                            second: record.path().to_path_buf(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Builds a [`PackageIndex`] from a filesystem location
pub struct IndexBuilder<E> {
    extractor: E,
    recursive: bool,
    duplicates: DuplicatePolicy,
    scan_errors: ScanErrorPolicy,
}

impl<E: MetadataExtractor> IndexBuilder<E> {
    /// Create a builder that scans flat directories with default policies
    pub fn new(extractor: E) -> Self {
        Self {
            extractor,
            recursive: false,
            duplicates: DuplicatePolicy::default(),
            scan_errors: ScanErrorPolicy::default(),
        }
    }

    /// Descend into subdirectories when scanning a directory
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set the name collision policy
    pub fn duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// Set the unreadable-file policy for directory scans
    pub fn scan_errors(mut self, policy: ScanErrorPolicy) -> Self {
        self.scan_errors = policy;
        self
    }

    /// Index `location`
    ///
    /// Returns `Ok(None)` if the location is neither a regular file nor a
    /// directory.
    pub fn build(&self, location: &Path) -> Result<Option<PackageIndex>> {
        let location = match std::path::absolute(location) {
            Ok(path) => path,
            Err(e) => {
                debug!("Cannot resolve {}: {}", location.display(), e);
                return Ok(None);
            }
        };

        let file_type = match fs::metadata(&location) {
            Ok(meta) => meta.file_type(),
            Err(e) => {
                debug!("Cannot stat {}: {}", location.display(), e);
                return Ok(None);
            }
        };

        if file_type.is_file() {
            // An explicitly named file is a request, not a scan: no filter,
            // and a bad artifact is a hard failure.
            let mut index = PackageIndex::new();
            index.insert(self.extractor.extract(&location)?, self.duplicates)?;
            return Ok(Some(index));
        }

        if file_type.is_dir() {
            return self.scan(&location);
        }

        debug!("{} is neither a file nor a directory", location.display());
        Ok(None)
    }

    /// Scan a directory; `None` if the directory itself cannot be listed
    fn scan(&self, root: &Path) -> Result<Option<PackageIndex>> {
        debug!(
            "Scanning {} ({})",
            root.display(),
            if self.recursive { "recursive" } else { "flat" }
        );

        let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
        if !self.recursive {
            walker = walker.max_depth(1);
        }

        let mut index = PackageIndex::new();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    debug!("Cannot list {}: {}", root.display(), e);
                    return Ok(None);
                }
                Err(e) => {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    let reason = e.to_string();
                    match self.scan_errors {
                        ScanErrorPolicy::Abort => return Err(Error::ScanError { path, reason }),
                        ScanErrorPolicy::Skip => {
                            debug!("Skipping unreadable entry {}: {}", path.display(), reason);
                            index.skipped.push(ScanFailure { path, reason });
                        }
                    }
                    continue;
                }
            };

            let path = entry.path();
            if !is_artifact_name(entry.file_name()) || !path.is_file() {
                continue;
            }

            match self.extractor.extract(path) {
                Ok(record) => {
                    debug!("Found {} at {}", record, path.display());
                    index.insert(record, self.duplicates)?;
                }
                Err(e) => match self.scan_errors {
                    ScanErrorPolicy::Abort => return Err(e),
                    ScanErrorPolicy::Skip => {
                        debug!("Skipping {}: {}", path.display(), e);
                        index.skipped.push(ScanFailure {
                            path: path.to_path_buf(),
                            reason: e.to_string(),
                        });
                    }
                },
            }
        }

        debug!("Indexed {} package(s) under {}", index.len(), root.display());
        Ok(Some(index))
    }
}
