use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use tracing::debug;

use crate::{ObjectStore, StorageError, StorageFuture};

/// In-memory object store.
///
/// Keeps objects in a `HashMap<key, bytes>`. Useful for testing and
/// development.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    /// Creates a new empty [`MemoryObjectStore`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `data` under `key`, replacing any previous object.
    pub fn insert(&self, key: &str, data: impl Into<Vec<u8>>) {
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), data.into());
    }

    /// Returns whether an object is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Returns the number of stored objects.
    pub fn len(&self) -> usize {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectStore for MemoryObjectStore {
    fn fetch<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Vec<u8>> {
        Box::pin(async move {
            let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
            objects.get(key).cloned().ok_or(StorageError::NotFound)
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            let removed = self
                .objects
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(key);
            debug!(key = %key, existed = removed.is_some(), "Deleted object from memory");
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "memory"
    }
}
