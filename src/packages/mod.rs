// src/packages/mod.rs

//! Package format support
//!
//! Readers that turn an artifact on disk into a [`PackageRecord`]. Each
//! reader implements the [`MetadataExtractor`] trait so the index builder
//! does not care which format it is scanning.

pub mod mock;
pub mod rpm;
pub mod traits;

pub use traits::{MetadataExtractor, PackageRecord};
