// src/repository/placement.rs

//! Artifact placement into the destination tree
//!
//! Every artifact lands at `<root>/<architecture>/<file name>`. Architecture
//! directories are created on demand. Copies go through a temporary file in
//! the target directory and are renamed into place, so a reader never sees a
//! half-written artifact under its final name.
//!
//! Updates first dispose of the superseded artifact, either by renaming it
//! to `<file>.bak` next to itself or by deleting it (purge).

use crate::error::{ChangeKind, Error, Result};
use crate::packages::PackageRecord;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Suffix appended to superseded artifacts when they are kept
pub const BACKUP_SUFFIX: &str = ".bak";

/// How superseded destination artifacts are disposed of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdatePolicy {
    /// Rename the old artifact to `<file>.bak`
    #[default]
    Backup,
    /// Delete the old artifact
    Purge,
}

/// Path an artifact is renamed to when backed up
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Outcome of placing one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub name: String,
    pub kind: ChangeKind,
    /// Where the artifact now lives
    pub path: PathBuf,
    /// Where the superseded artifact was moved to, if it was kept
    pub backup: Option<PathBuf>,
}

/// Applies add and update mutations under a destination root
#[derive(Debug, Clone)]
pub struct PlacementEngine {
    root: PathBuf,
    policy: UpdatePolicy,
}

impl PlacementEngine {
    /// Create an engine for the destination `root`
    pub fn new(root: impl Into<PathBuf>, policy: UpdatePolicy) -> Self {
        Self {
            root: root.into(),
            policy,
        }
    }

    /// Destination root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Disposal policy for superseded artifacts
    pub fn policy(&self) -> UpdatePolicy {
        self.policy
    }

    /// Canonical destination of `record`
    ///
    /// Returns `None` when the architecture is not a single plain path
    /// component or the artifact path has no file name.
    pub fn destination_path(&self, record: &PackageRecord) -> Option<PathBuf> {
        let mut components = Path::new(record.architecture()).components();
        let arch = match (components.next(), components.next()) {
            (Some(Component::Normal(arch)), None) => arch,
            _ => return None,
        };
        let file_name = record.file_name()?;
        Some(self.root.join(arch).join(file_name))
    }

    /// Copy a package that has no destination counterpart
    pub fn place_new(&self, record: &PackageRecord) -> Result<Placement> {
        let kind = ChangeKind::Add;
        require_file(record, kind, record.path())?;
        let target = self.target_for(record, kind)?;

        self.install(record, &target, kind)?;
        info!("Added {} at {}", record, target.display());

        Ok(Placement {
            name: record.name().to_string(),
            kind,
            path: target,
            backup: None,
        })
    }

    /// Replace `old` in the destination with `new`
    ///
    /// Both artifacts must still exist; nothing is touched otherwise.
    pub fn place_update(&self, new: &PackageRecord, old: &PackageRecord) -> Result<Placement> {
        let kind = ChangeKind::Update;
        require_file(new, kind, new.path())?;
        require_file(new, kind, old.path())?;
        let target = self.target_for(new, kind)?;

        if same_file(new.path(), old.path()) {
            debug!("{} is already in place at {}", new, old.path().display());
            return Ok(Placement {
                name: new.name().to_string(),
                kind,
                path: old.path().to_path_buf(),
                backup: None,
            });
        }

        let backup = match self.policy {
            UpdatePolicy::Purge => {
                fs::remove_file(old.path()).map_err(|e| {
                    Error::placement(
                        new.name(),
                        kind,
                        format!("cannot remove {}: {}", old.path().display(), e),
                    )
                })?;
                debug!("Removed {}", old.path().display());
                None
            }
            UpdatePolicy::Backup => {
                let backup = backup_path(old.path());
                fs::rename(old.path(), &backup).map_err(|e| {
                    Error::placement(
                        new.name(),
                        kind,
                        format!(
                            "cannot back up {} to {}: {}",
                            old.path().display(),
                            backup.display(),
                            e
                        ),
                    )
                })?;
                debug!("Backed up {} to {}", old.path().display(), backup.display());
                Some(backup)
            }
        };

        self.install(new, &target, kind)?;
        info!(
            "Updated {} ({} -> {}) at {}",
            new.name(),
            old.version(),
            new.version(),
            target.display()
        );

        Ok(Placement {
            name: new.name().to_string(),
            kind,
            path: target,
            backup,
        })
    }

    fn target_for(&self, record: &PackageRecord, kind: ChangeKind) -> Result<PathBuf> {
        self.destination_path(record).ok_or_else(|| {
            Error::placement(
                record.name(),
                kind,
                format!(
                    "invalid architecture '{}' or file name for {}",
                    record.architecture(),
                    record.path().display()
                ),
            )
        })
    }

    /// Copy the artifact to `target`, creating its directory if needed
    fn install(&self, record: &PackageRecord, target: &Path, kind: ChangeKind) -> Result<()> {
        let fail = |what: &str, e: io::Error| Error::placement(record.name(), kind, format!("{}: {}", what, e));

        let dir = target
            .parent()
            .ok_or_else(|| Error::placement(record.name(), kind, "destination has no parent"))?;
        fs::create_dir_all(dir)
            .map_err(|e| fail(&format!("cannot create {}", dir.display()), e))?;

        let mut source = File::open(record.path())
            .map_err(|e| fail(&format!("cannot open {}", record.path().display()), e))?;
        let permissions = source
            .metadata()
            .map_err(|e| fail(&format!("cannot stat {}", record.path().display()), e))?
            .permissions();

        let mut staged = NamedTempFile::new_in(dir)
            .map_err(|e| fail(&format!("cannot stage in {}", dir.display()), e))?;
        io::copy(&mut source, staged.as_file_mut())
            .map_err(|e| fail(&format!("cannot copy {}", record.path().display()), e))?;
        staged
            .as_file()
            .sync_all()
            .map_err(|e| fail("cannot flush staged copy", e))?;
        staged
            .as_file()
            .set_permissions(permissions)
            .map_err(|e| fail("cannot set permissions", e))?;

        staged
            .persist(target)
            .map_err(|e| fail(&format!("cannot write {}", target.display()), e.error))?;

        debug!("Copied {} to {}", record.path().display(), target.display());
        Ok(())
    }
}

fn require_file(record: &PackageRecord, kind: ChangeKind, path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::placement(
            record.name(),
            kind,
            format!("{} is missing", path.display()),
        ))
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
