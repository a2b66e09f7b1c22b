// src/packages/mock.rs

//! Stub artifact reader for tests and dry experiments
//!
//! Real RPMs are expensive to produce in tests, so this reader accepts a
//! tiny text format instead:
//!
//! ```text
//! name=foo
//! version=1.0
//! arch=x86_64
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Any missing key makes
//! the file unreadable, just like a corrupt RPM would be.

use crate::error::{Error, Result};
use crate::packages::traits::{MetadataExtractor, PackageRecord};
use std::fs;
use std::path::Path;

/// Reads key=value stub artifacts
#[derive(Debug, Clone, Copy, Default)]
pub struct MockExtractor;

impl MockExtractor {
    /// Create a new stub reader
    pub fn new() -> Self {
        Self
    }

    /// Render stub artifact contents for the given identity
    pub fn contents(name: &str, version: &str, arch: &str) -> String {
        format!("name={}\nversion={}\narch={}\n", name, version, arch)
    }

    /// Write a stub artifact to `path`
    pub fn write(path: &Path, name: &str, version: &str, arch: &str) -> Result<()> {
        fs::write(path, Self::contents(name, version, arch))?;
        Ok(())
    }
}

impl MetadataExtractor for MockExtractor {
    fn extract(&self, path: &Path) -> Result<PackageRecord> {
        let fail = |reason: &str| Error::ExtractionError {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let text = fs::read_to_string(path).map_err(|e| fail(&e.to_string()))?;

        let (mut name, mut version, mut arch) = (None, None, None);
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(fail(&format!("malformed line '{}'", line)));
            };
            match key.trim() {
                "name" => name = Some(value.trim().to_string()),
                "version" => version = Some(value.trim().to_string()),
                "arch" => arch = Some(value.trim().to_string()),
                _ => {}
            }
        }

        match (name, version, arch) {
            (Some(name), Some(version), Some(arch)) => {
                Ok(PackageRecord::new(name, version, arch, path))
            }
            _ => Err(fail("missing name, version or arch")),
        }
    }
}
