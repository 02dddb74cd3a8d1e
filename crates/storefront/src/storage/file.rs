//! Directory-backed storage backend.
//!
//! Layout:
//! ```text
//! <data_dir>/
//!     catalog_cart.json
//!     catalog_likes.json
//!     catalog_selected_categories.json
//!     catalog_favorites_only.json
//! ```
//!
//! Each write is staged in its own temporary file in the same directory and
//! renamed over `<key>.json`. Processes sharing the directory never read a
//! half-written value, and concurrent writers never touch each other's
//! staging file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::{Storage, StorageError, StorageKey};

/// One JSON file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a backend rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    #[must_use]
    pub fn path_for(&self, key: StorageKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }
}

fn io_error(key: StorageKey) -> impl FnOnce(io::Error) -> StorageError {
    move |source| StorageError::Io { key, source }
}

impl Storage for FileStorage {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key)(e)),
        }
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir).map_err(io_error(key))?;
        let mut staged = NamedTempFile::new_in(&self.dir).map_err(io_error(key))?;
        staged.write_all(value.as_bytes()).map_err(io_error(key))?;
        staged
            .persist(self.path_for(key))
            .map_err(|e| io_error(key)(e.error))?;
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(io_error(key)(e)),
            _ => Ok(()),
        }
    }
}
