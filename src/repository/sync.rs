// src/repository/sync.rs

//! Repository synchronization
//!
//! Drives a full run: index the source, index the destination, partition,
//! place every package in name order, then regenerate metadata once. The
//! first failure stops the run; nothing is rolled back and nothing after
//! the failing package is attempted.

use super::index::{DuplicatePolicy, IndexBuilder, PackageIndex, ScanErrorPolicy, ScanFailure};
use super::placement::{Placement, PlacementEngine, UpdatePolicy};
use super::reconcile::{reconcile, PlannedAction, Reconciliation};
use crate::error::{ChangeKind, Error, Result};
use crate::packages::MetadataExtractor;
use crate::progress::{IndexSide, SilentObserver, SyncEvent, SyncObserver};
use crate::trigger::{CommandRunner, RegenerationTrigger};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Settings for one sync run
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Artifact file, flat directory or tree to copy from
    pub source: PathBuf,
    /// Repository root to copy into
    pub destination: PathBuf,
    /// Descend into subdirectories of the source
    pub recursive: bool,
    /// What happens to superseded destination artifacts
    pub update_policy: UpdatePolicy,
    /// Name collision handling within one scan
    pub duplicates: DuplicatePolicy,
    /// Unreadable-file handling within directory scans
    pub scan_errors: ScanErrorPolicy,
    /// Metadata regeneration step; `None` skips it
    pub regenerate: Option<RegenerationTrigger>,
    /// Compute the plan but change nothing
    pub dry_run: bool,
}

impl SyncConfig {
    /// Create a config with default policies and the default regeneration tool
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            recursive: false,
            update_policy: UpdatePolicy::default(),
            duplicates: DuplicatePolicy::default(),
            scan_errors: ScanErrorPolicy::default(),
            regenerate: Some(RegenerationTrigger::default()),
            dry_run: false,
        }
    }

    /// Scan the source recursively
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Delete superseded artifacts instead of backing them up
    pub fn purge(mut self, purge: bool) -> Self {
        self.update_policy = if purge {
            UpdatePolicy::Purge
        } else {
            UpdatePolicy::Backup
        };
        self
    }

    /// Set the name collision policy
    pub fn duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// Set the unreadable-file policy
    pub fn scan_errors(mut self, policy: ScanErrorPolicy) -> Self {
        self.scan_errors = policy;
        self
    }

    /// Set or disable the regeneration step
    pub fn regenerate(mut self, trigger: Option<RegenerationTrigger>) -> Self {
        self.regenerate = trigger;
        self
    }

    /// Enable dry-run mode
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// What a sync run did
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub source_packages: usize,
    pub destination_packages: usize,
    pub reconciliation: Reconciliation,
    /// Placements in the order they were applied
    pub placements: Vec<Placement>,
    /// Files left out of either index because they could not be read
    pub skipped: Vec<ScanFailure>,
    pub regenerated: bool,
    pub dry_run: bool,
}

impl SyncReport {
    /// Placements of packages that were new to the destination
    pub fn added(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(|p| p.kind == ChangeKind::Add)
    }

    /// Placements that replaced an existing artifact
    pub fn updated(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(|p| p.kind == ChangeKind::Update)
    }
}

/// Runs a sync with explicit collaborators
pub struct Synchronizer<'a> {
    config: &'a SyncConfig,
    extractor: &'a dyn MetadataExtractor,
    runner: &'a dyn CommandRunner,
    observer: &'a dyn SyncObserver,
}

impl<'a> Synchronizer<'a> {
    /// Create a synchronizer that reports nothing while running
    pub fn new(
        config: &'a SyncConfig,
        extractor: &'a dyn MetadataExtractor,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            config,
            extractor,
            runner,
            observer: &SilentObserver,
        }
    }

    /// Send progress events to `observer`
    pub fn with_observer(mut self, observer: &'a dyn SyncObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Run the sync
    pub fn run(&self) -> Result<SyncReport> {
        let config = self.config;

        let source = self
            .index(IndexSide::Source, &config.source, config.recursive)?
            .filter(|index| !index.is_empty())
            .ok_or_else(|| Error::NoPackages(config.source.clone()))?;

        if !config.destination.is_dir() {
            return Err(Error::ConfigError(format!(
                "destination {} is not a directory",
                config.destination.display()
            )));
        }
        let root = std::path::absolute(&config.destination)?;

        // The destination is always scanned as a tree: artifacts live in
        // per-architecture subdirectories.
        let destination = self
            .index(IndexSide::Destination, &root, true)?
            .ok_or_else(|| {
                Error::ConfigError(format!("destination {} is not readable", root.display()))
            })?;

        // A subdirectory we cannot list may hold artifacts that would turn
        // additions into updates.
        if let Some(failure) = destination.skipped().iter().find(|f| f.path.is_dir()) {
            return Err(Error::ConfigError(format!(
                "destination directory {} is not readable: {}",
                failure.path.display(),
                failure.reason
            )));
        }

        let reconciliation = reconcile(&source, &destination);
        info!(
            "{} package(s) to add, {} to update, {} left untouched",
            reconciliation.to_add.len(),
            reconciliation.to_update.len(),
            reconciliation.untouched.len()
        );
        self.observer.on_event(&SyncEvent::Planned {
            to_add: reconciliation.to_add.len(),
            to_update: reconciliation.to_update.len(),
        });

        let mut report = SyncReport {
            source_packages: source.len(),
            destination_packages: destination.len(),
            skipped: source
                .skipped()
                .iter()
                .chain(destination.skipped())
                .cloned()
                .collect(),
            dry_run: config.dry_run,
            ..Default::default()
        };

        if config.dry_run {
            info!("Dry run: destination left unchanged");
            report.reconciliation = reconciliation;
            return Ok(report);
        }

        let engine = PlacementEngine::new(&root, config.update_policy);
        for action in reconciliation.actions(&source, &destination) {
            let placement = match action {
                PlannedAction::Add(record) => {
                    self.observer.on_event(&SyncEvent::Placing {
                        name: record.name().to_string(),
                        kind: ChangeKind::Add,
                    });
                    engine.place_new(record)?
                }
                PlannedAction::Update { new, old } => {
                    self.observer.on_event(&SyncEvent::Placing {
                        name: new.name().to_string(),
                        kind: ChangeKind::Update,
                    });
                    engine.place_update(new, old)?
                }
            };
            self.observer.on_event(&SyncEvent::Placed(placement.clone()));
            report.placements.push(placement);
        }
        report.reconciliation = reconciliation;

        if let Some(trigger) = &config.regenerate {
            self.observer.on_event(&SyncEvent::Regenerating {
                command: trigger.invocation(&root).to_string(),
            });
            trigger.run(&root, self.runner)?;
            self.observer.on_event(&SyncEvent::Regenerated);
            report.regenerated = true;
        } else {
            debug!("Regeneration disabled");
        }

        Ok(report)
    }

    fn index(
        &self,
        side: IndexSide,
        location: &Path,
        recursive: bool,
    ) -> Result<Option<PackageIndex>> {
        let index = IndexBuilder::new(self.extractor)
            .recursive(recursive)
            .duplicates(self.config.duplicates)
            .scan_errors(self.config.scan_errors)
            .build(location)?;

        if let Some(index) = &index {
            self.observer.on_event(&SyncEvent::Indexed {
                side,
                location: location.to_path_buf(),
                names: index.names().map(str::to_string).collect(),
            });
            for failure in index.skipped() {
                self.observer.on_event(&SyncEvent::Skipped {
                    side,
                    failure: failure.clone(),
                });
            }
        }

        Ok(index)
    }
}

/// Run a sync with the given collaborators and no observer
pub fn sync_repository(
    config: &SyncConfig,
    extractor: &dyn MetadataExtractor,
    runner: &dyn CommandRunner,
) -> Result<SyncReport> {
    Synchronizer::new(config, extractor, runner).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packages::mock::MockExtractor;
    use crate::trigger::{CommandStatus, Invocation};
    use std::cell::RefCell;
    use std::fs;

    #[derive(Default)]
    struct RecordingRunner {
        calls: RefCell<Vec<Invocation>>,
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, invocation: &Invocation) -> Result<CommandStatus> {
            self.calls.borrow_mut().push(invocation.clone());
            Ok(CommandStatus { code: Some(0) })
        }
    }

    fn layout() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("incoming");
        let dest = temp.path().join("repo");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&dest).unwrap();
        (temp, source, dest)
    }

    #[test]
    fn test_adds_into_empty_destination() {
        let (_temp, source, dest) = layout();
        MockExtractor::write(&source.join("foo-1.0.x86_64.rpm"), "foo", "1.0", "x86_64").unwrap();
        let runner = RecordingRunner::default();

        let config = SyncConfig::new(&source, &dest);
        let report = sync_repository(&config, &MockExtractor, &runner).unwrap();

        assert!(report.reconciliation.to_add.contains("foo"));
        assert_eq!(report.added().count(), 1);
        assert!(dest.join("x86_64/foo-1.0.x86_64.rpm").is_file());
        assert!(report.regenerated);

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args, vec![std::path::absolute(&dest).unwrap().into_os_string()]);
    }

    #[test]
    fn test_destination_must_be_directory() {
        let (_temp, source, dest) = layout();
        MockExtractor::write(&source.join("foo-1.0.x86_64.rpm"), "foo", "1.0", "x86_64").unwrap();
        let runner = RecordingRunner::default();

        let config = SyncConfig::new(&source, dest.join("missing"));
        let err = sync_repository(&config, &MockExtractor, &runner).unwrap_err();

        assert!(matches!(err, Error::ConfigError(_)));
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_empty_source_reports_no_packages() {
        let (_temp, source, dest) = layout();
        let runner = RecordingRunner::default();

        let config = SyncConfig::new(&source, &dest);
        let err = sync_repository(&config, &MockExtractor, &runner).unwrap_err();

        assert!(matches!(err, Error::NoPackages(_)));
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let (_temp, source, dest) = layout();
        MockExtractor::write(&source.join("foo-2.0.x86_64.rpm"), "foo", "2.0", "x86_64").unwrap();
        fs::create_dir_all(dest.join("x86_64")).unwrap();
        MockExtractor::write(&dest.join("x86_64/foo-1.0.x86_64.rpm"), "foo", "1.0", "x86_64")
            .unwrap();
        let runner = RecordingRunner::default();

        let config = SyncConfig::new(&source, &dest).dry_run(true);
        let report = sync_repository(&config, &MockExtractor, &runner).unwrap();

        assert!(report.dry_run);
        assert!(report.reconciliation.to_update.contains("foo"));
        assert!(report.placements.is_empty());
        assert!(dest.join("x86_64/foo-1.0.x86_64.rpm").is_file());
        assert!(!dest.join("x86_64/foo-2.0.x86_64.rpm").exists());
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_regeneration_can_be_disabled() {
        let (_temp, source, dest) = layout();
        MockExtractor::write(&source.join("foo-1.0.x86_64.rpm"), "foo", "1.0", "x86_64").unwrap();
        let runner = RecordingRunner::default();

        let config = SyncConfig::new(&source, &dest).regenerate(None);
        let report = sync_repository(&config, &MockExtractor, &runner).unwrap();

        assert!(!report.regenerated);
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_events_arrive_in_order() {
        use crate::progress::CallbackObserver;

        let (_temp, source, dest) = layout();
        MockExtractor::write(&source.join("foo-1.0.x86_64.rpm"), "foo", "1.0", "x86_64").unwrap();
        fs::write(source.join("broken.rpm"), "junk").unwrap();
        let runner = RecordingRunner::default();
        let kinds = RefCell::new(Vec::new());
        let observer = CallbackObserver::new(|event: &SyncEvent| {
            let label = match event {
                SyncEvent::Indexed { side, .. } => format!("indexed:{side}"),
                SyncEvent::Skipped { .. } => "skipped".to_string(),
                SyncEvent::Planned { .. } => "planned".to_string(),
                SyncEvent::Placing { name, .. } => format!("placing:{name}"),
                SyncEvent::Placed(p) => format!("placed:{}", p.name),
                SyncEvent::Regenerating { .. } => "regenerating".to_string(),
                SyncEvent::Regenerated => "regenerated".to_string(),
            };
            kinds.borrow_mut().push(label);
        });

        let config = SyncConfig::new(&source, &dest);
        Synchronizer::new(&config, &MockExtractor, &runner)
            .with_observer(&observer)
            .run()
            .unwrap();

        assert_eq!(
            *kinds.borrow(),
            vec![
                "indexed:source",
                "skipped",
                "indexed:destination",
                "planned",
                "placing:foo",
                "placed:foo",
                "regenerating",
                "regenerated",
            ]
        );
    }
}
