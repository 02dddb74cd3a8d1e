//! Synchronous key-value persistence for client-local state.
//!
//! # Keys
//!
//! Key strings are part of the on-disk format. Changing one loses every
//! user's saved cart, likes or filters, so they are fixed here:
//!
//! - `catalog_cart` - cart lines
//! - `catalog_likes` - liked-products map
//! - `catalog_selected_categories` - category filter
//! - `catalog_favorites_only` - favorites filter flag
//!
//! # Backends
//!
//! - [`MemoryStorage`] - in-process map, lost on exit
//! - [`FileStorage`] - one JSON file per key in a data directory

mod file;
mod memory;

use core::fmt;
use std::io;

use thiserror::Error;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// A persisted key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKey {
    Cart,
    Likes,
    SelectedCategories,
    FavoritesOnly,
}

impl StorageKey {
    /// Every key, in a stable order.
    pub const ALL: [Self; 4] = [
        Self::Cart,
        Self::Likes,
        Self::SelectedCategories,
        Self::FavoritesOnly,
    ];

    /// The stable key string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cart => "catalog_cart",
            Self::Likes => "catalog_likes",
            Self::SelectedCategories => "catalog_selected_categories",
            Self::FavoritesOnly => "catalog_favorites_only",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage is switched off or not reachable.
    #[error("storage is unavailable")]
    Unavailable,

    /// The value does not fit in the backend's quota.
    #[error("quota exceeded writing {key}: {size} bytes exceeds limit of {limit}")]
    QuotaExceeded {
        key: StorageKey,
        size: usize,
        limit: usize,
    },

    /// Filesystem operation failed.
    #[error("I/O error on {key}: {source}")]
    Io {
        key: StorageKey,
        #[source]
        source: io::Error,
    },
}

/// A synchronous string key-value store.
///
/// `set` must replace the whole value in one step: a reader never observes
/// a partially written value.
pub trait Storage: Send + Sync {
    /// Read the raw value for `key`. `Ok(None)` means the key is absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError>;

    /// Replace the value for `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write did not happen.
    fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove(&self, key: StorageKey) -> Result<(), StorageError>;
}
