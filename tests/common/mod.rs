// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use reposync::packages::mock::MockExtractor;
use reposync::trigger::{CommandStatus, Invocation};
use reposync::{CommandRunner, Result};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch layout with an `incoming/` source and an empty `repo/` destination.
///
/// Keep the TempDir alive to prevent cleanup.
pub struct Layout {
    pub temp: TempDir,
    pub source: PathBuf,
    pub dest: PathBuf,
}

impl Layout {
    pub fn new() -> Self {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("incoming");
        let dest = temp.path().join("repo");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&dest).unwrap();
        Self { temp, source, dest }
    }

    /// Drop a stub artifact into the source, creating parent directories.
    pub fn stage(&self, relative: &str, name: &str, version: &str, arch: &str) -> PathBuf {
        write_stub(&self.source.join(relative), name, version, arch)
    }

    /// Pre-populate the destination at `<arch>/<file_name>`.
    pub fn publish(&self, file_name: &str, name: &str, version: &str, arch: &str) -> PathBuf {
        write_stub(&self.dest.join(arch).join(file_name), name, version, arch)
    }

    pub fn dest_file(&self, arch: &str, file_name: &str) -> PathBuf {
        self.dest.join(arch).join(file_name)
    }
}

/// Write a stub artifact readable by [`MockExtractor`].
pub fn write_stub(path: &Path, name: &str, version: &str, arch: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    MockExtractor::write(path, name, version, arch).unwrap();
    path.to_path_buf()
}

/// Contents of every file under `root`, keyed by path relative to it.
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let relative = entry.path().strip_prefix(root).unwrap().to_path_buf();
            (relative, fs::read(entry.path()).unwrap())
        })
        .collect()
}

/// Build a real RPM at `dir/<name>-<version>-1.<arch>.rpm`.
pub fn write_rpm(dir: &Path, name: &str, version: &str, arch: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(format!("{}-{}-1.{}.rpm", name, version, arch));

    let pkg = rpm::PackageBuilder::new(name, version, "MIT", arch, "Test package")
        .release("1")
        .build()
        .unwrap();
    pkg.write(&mut fs::File::create(&path).unwrap()).unwrap();

    path
}

/// Runner that records every invocation and exits with a fixed code.
pub struct RecordingRunner {
    code: Option<i32>,
    pub calls: RefCell<Vec<Invocation>>,
}

impl RecordingRunner {
    pub fn succeeding() -> Self {
        Self::exiting(Some(0))
    }

    pub fn exiting(code: Option<i32>) -> Self {
        Self {
            code,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandStatus> {
        self.calls.borrow_mut().push(invocation.clone());
        Ok(CommandStatus { code: self.code })
    }
}
