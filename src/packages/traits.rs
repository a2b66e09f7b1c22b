// src/packages/traits.rs

//! Common types and traits for package format readers

use crate::error::Result;
use std::fmt;
use std::path::{Path, PathBuf};

/// Identity and location of one artifact on disk
///
/// Records are immutable once built. The `path` is absolute and points at
/// the artifact as it was seen at scan time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    name: String,
    version: String,
    architecture: String,
    path: PathBuf,
}

impl PackageRecord {
    /// Create a new record
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        architecture: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            architecture: architecture.into(),
            path: path.into(),
        }
    }

    /// Package name, the identity key within an index
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package version (informational, never compared)
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Target architecture (e.g., "x86_64", "noarch")
    pub fn architecture(&self) -> &str {
        &self.architecture
    }

    /// Absolute path of the artifact
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component of the artifact
    pub fn file_name(&self) -> Option<&std::ffi::OsStr> {
        self.path.file_name()
    }
}

impl fmt::Display for PackageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}.{}", self.name, self.version, self.architecture)
    }
}

/// Reads package identity out of an artifact file
pub trait MetadataExtractor {
    /// Extract a record for the artifact at `path`
    ///
    /// Fails with [`crate::Error::ExtractionError`] when the file is not a
    /// readable artifact of this format.
    fn extract(&self, path: &Path) -> Result<PackageRecord>;
}

impl<T: MetadataExtractor + ?Sized> MetadataExtractor for &T {
    fn extract(&self, path: &Path) -> Result<PackageRecord> {
        (**self).extract(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accessors() {
        let record = PackageRecord::new("foo", "1.0", "x86_64", "/srv/in/foo-1.0.x86_64.rpm");

        assert_eq!(record.name(), "foo");
        assert_eq!(record.version(), "1.0");
        assert_eq!(record.architecture(), "x86_64");
        assert_eq!(
            record.file_name().and_then(|n| n.to_str()),
            Some("foo-1.0.x86_64.rpm")
        );
        assert_eq!(record.to_string(), "foo-1.0.x86_64");
    }
}
