//! Archive extraction
//!
//! Decompression sits behind a trait so hosts can plug in their own
//! archive format; zip is the one the distribution service ships.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use zip::ZipArchive;

use super::StoreError;

/// Unpacks an archive into an existing, empty directory.
pub trait ArchiveExtractor: Send + Sync {
    fn extract(&self, archive: &Path, destination: &Path) -> Result<(), StoreError>;
}

/// Zip extractor.
///
/// Entry paths that would escape the destination are rejected by the
/// `zip` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipExtractor;

impl ArchiveExtractor for ZipExtractor {
    fn extract(&self, archive: &Path, destination: &Path) -> Result<(), StoreError> {
        let file = File::open(archive)?;
        let mut zip = ZipArchive::new(BufReader::new(file))
            .map_err(|e| StoreError::Archive(e.to_string()))?;
        zip.extract(destination)
            .map_err(|e| StoreError::Archive(e.to_string()))
    }
}
