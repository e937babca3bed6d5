//! File-backed store for persistent storage.

use crate::error::{StorageError, StorageResult};
use crate::image::StoreImage;
use crate::memory::InMemoryStore;
use crate::store::KvStore;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::error;

/// A store persisted as a single image file.
///
/// The whole store is held in memory while open. Changes reach disk on
/// [`FileStore::flush`] and when the store is dropped.
///
/// # Locking
///
/// An advisory lock on `<path>.lock` is held for the lifetime of the
/// store, so only one process can write a store file at a time.
///
/// # Example
///
/// ```no_run
/// use userdb_storage::{KvStore, FileStore};
/// use std::path::Path;
///
/// let mut store = FileStore::open(Path::new("luna_pinyin.userdb")).unwrap();
/// store.update("a \tA", "c=1 d=1 t=1").unwrap();
/// store.flush().unwrap();
/// ```
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: InMemoryStore,
    dirty: bool,
    _lock_file: File,
}

impl FileStore {
    /// Opens or creates a store file at the given path.
    ///
    /// The store name is the file stem.
    ///
    /// # Errors
    ///
    /// Returns `Locked` if another process holds the store, or an error if
    /// an existing file cannot be read as a store image.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let mut lock_name = path.as_os_str().to_os_string();
        lock_name.push(".lock");
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(Path::new(&lock_name))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked(path.display().to_string()));
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut inner = InMemoryStore::new(name);
        if path.exists() {
            let image = StoreImage::read_from(path)?;
            for (k, v) in &image.metadata {
                inner.meta_update(k, v)?;
            }
            for (k, v) in &image.records {
                inner.update(k, v)?;
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            inner,
            dirty: false,
            _lock_file: lock_file,
        })
    }

    /// Opens or creates a store file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the store cannot be opened.
    pub fn open_with_create_dirs(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(path)
    }

    /// Returns the path to the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes pending changes to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be written.
    pub fn flush(&mut self) -> StorageResult<()> {
        if !self.dirty {
            return Ok(());
        }
        self.inner.image().write_to(&self.path)?;
        self.dirty = false;
        Ok(())
    }
}

impl KvStore for FileStore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    fn fetch(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.fetch(key)
    }

    fn update(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.inner.update(key, value)?;
        self.dirty = true;
        Ok(())
    }

    fn meta_fetch(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.meta_fetch(key)
    }

    fn meta_update(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.inner.meta_update(key, value)?;
        self.dirty = true;
        Ok(())
    }

    fn entries(&self) -> StorageResult<Vec<(String, String)>> {
        self.inner.entries()
    }

    fn meta_entries(&self) -> StorageResult<Vec<(String, String)>> {
        self.inner.meta_entries()
    }

    fn backup(&self, path: &Path) -> StorageResult<()> {
        self.inner.backup(path)
    }

    fn restore(&mut self, path: &Path) -> StorageResult<()> {
        self.inner.restore(path)?;
        self.dirty = true;
        Ok(())
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            error!("failed to save store {}: {}", self.path.display(), e);
        }
    }
}
