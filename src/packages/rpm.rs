// src/packages/rpm.rs

//! RPM package format reader

use crate::error::{Error, Result};
use crate::packages::traits::{MetadataExtractor, PackageRecord};
use rpm::PackageMetadata;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Reads name, version and architecture from RPM headers
///
/// Only the lead and headers are parsed; the payload is never read.
#[derive(Debug, Clone, Copy, Default)]
pub struct RpmExtractor;

impl RpmExtractor {
    /// Create a new RPM reader
    pub fn new() -> Self {
        Self
    }
}

impl MetadataExtractor for RpmExtractor {
    fn extract(&self, path: &Path) -> Result<PackageRecord> {
        debug!("Reading RPM headers: {}", path.display());

        let fail = |reason: String| Error::ExtractionError {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path).map_err(|e| fail(format!("Failed to open RPM file: {}", e)))?;
        let mut buf_reader = BufReader::new(file);

        let metadata = PackageMetadata::parse(&mut buf_reader)
            .map_err(|e| fail(format!("Failed to parse RPM: {}", e)))?;

        let name = metadata
            .get_name()
            .map_err(|e| fail(format!("Failed to get package name: {}", e)))?
            .to_string();

        let version = metadata
            .get_version()
            .map_err(|e| fail(format!("Failed to get package version: {}", e)))?
            .to_string();

        let architecture = metadata
            .get_arch()
            .map_err(|e| fail(format!("Failed to get package architecture: {}", e)))?
            .to_string();

        debug!("Parsed RPM: {} version {} ({})", name, version, architecture);

        Ok(PackageRecord::new(name, version, architecture, path))
    }
}
