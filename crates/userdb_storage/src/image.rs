//! Native store image.
//!
//! Both backends persist and back up their contents as a single CBOR
//! document holding the metadata map and the record map.

use crate::error::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Magic tag stored in every image.
const IMAGE_MAGIC: &str = "USDB";
/// Current image format version.
const IMAGE_VERSION: u16 = 1;

/// An in-memory copy of a whole store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreImage {
    magic: String,
    version: u16,
    /// Metadata pairs (`/db_name`, `/tick`, ...).
    pub metadata: BTreeMap<String, String>,
    /// Encoded records keyed by store key.
    pub records: BTreeMap<String, String>,
}

impl StoreImage {
    /// Creates an image from metadata and record maps.
    #[must_use]
    pub fn new(metadata: BTreeMap<String, String>, records: BTreeMap<String, String>) -> Self {
        Self {
            magic: IMAGE_MAGIC.to_string(),
            version: IMAGE_VERSION,
            metadata,
            records,
        }
    }

    /// Reads an image from `path`.
    ///
    /// # Errors
    ///
    /// Returns `Corrupted` if the file is not a store image of a known version.
    pub fn read_from(path: &Path) -> StorageResult<Self> {
        let file = File::open(path)?;
        let image: Self = ciborium::de::from_reader(BufReader::new(file))
            .map_err(|e| StorageError::Corrupted(format!("{}: {e}", path.display())))?;

        if image.magic != IMAGE_MAGIC {
            return Err(StorageError::Corrupted(format!(
                "{}: not a store image",
                path.display()
            )));
        }
        if image.version > IMAGE_VERSION {
            return Err(StorageError::Corrupted(format!(
                "{}: unsupported image version {}",
                path.display(),
                image.version
            )));
        }
        Ok(image)
    }

    /// Writes the image to `path` atomically.
    ///
    /// The image is written to a sibling temp file, synced, then renamed
    /// over `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or any file operation fails.
    pub fn write_to(&self, path: &Path) -> StorageResult<()> {
        let mut temp_name = path.as_os_str().to_os_string();
        temp_name.push(".tmp");
        let temp_path = Path::new(&temp_name);

        let file = File::create(temp_path)?;
        let mut writer = BufWriter::new(file);
        ciborium::ser::into_writer(self, &mut writer)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        writer.flush()?;
        let file = writer
            .into_inner()
            .map_err(|e| StorageError::Io(e.into_error()))?;
        file.sync_all()?;
        drop(file);

        fs::rename(temp_path, path)?;
        Ok(())
    }
}
