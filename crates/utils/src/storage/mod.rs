//! Keyed object storage holding inbound messages.
//!
//! The [`ObjectStore`] trait abstracts where stored deliveries are read
//! from and removed once forwarded. [`S3ObjectStore`] (feature-gated
//! behind `aws`) is the production backend, [`MemoryObjectStore`] serves
//! tests.

mod memory;
#[cfg(feature = "aws")]
mod s3;

use std::{future::Future, pin::Pin};

use thiserror::Error;

pub use memory::*;
#[cfg(feature = "aws")]
pub use s3::*;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future type for storage operations, enabling object safety.
pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = StorageResult<T>> + Send + 'a>>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The object was not found.
    #[error("Object not found")]
    NotFound,
    /// A storage backend error occurred.
    #[error("Storage error: {0}")]
    Backend(String),
}

/// Trait for keyed object stores holding raw messages.
///
/// Deleting a key that does not exist succeeds, matching S3 semantics.
pub trait ObjectStore: Send + Sync {
    /// Fetches the object stored under `key`.
    fn fetch<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Vec<u8>>;

    /// Deletes the object stored under `key`.
    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()>;

    /// Returns the name of this store.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        assert_eq!(StorageError::NotFound.to_string(), "Object not found");
        assert_eq!(
            StorageError::Backend("test".to_string()).to_string(),
            "Storage error: test"
        );
    }
}
