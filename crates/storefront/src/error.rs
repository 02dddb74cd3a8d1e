//! Store error types.
//!
//! A `StoreError` returned from a mutator means the operation did nothing:
//! local state was not advanced and no notification was emitted. Reads never
//! return one; they log it and fall back to the empty value.

use thiserror::Error;

use crate::storage::{StorageError, StorageKey};

/// Why a store operation degraded.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage is disabled, out of quota or failed I/O.
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(#[from] StorageError),

    /// A stored value is not in the expected shape.
    #[error("Corrupt data under {key}: {source}")]
    CorruptData {
        key: StorageKey,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded for storage.
    #[error("Failed to serialize {key}: {source}")]
    Serialization {
        key: StorageKey,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Corrupt data is recovered by treating it as empty; the others are not.
    #[must_use]
    pub const fn is_corrupt_data(&self) -> bool {
        matches!(self, Self::CorruptData { .. })
    }
}

/// Result type alias for `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::from(StorageError::Unavailable);
        assert_eq!(err.to_string(), "Persistence unavailable: storage is unavailable");
        assert!(!err.is_corrupt_data());

        let source = serde_json::from_str::<Vec<u8>>("nope").unwrap_err();
        let err = StoreError::CorruptData {
            key: StorageKey::Cart,
            source,
        };
        assert!(err.to_string().starts_with("Corrupt data under catalog_cart:"));
        assert!(err.is_corrupt_data());
    }
}
