// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Storage driver traits

use super::types::{StorageResult, StorageType};
use std::path::Path;

/// A named collection of key-value pairs inside a driver (a "table")
pub trait StorageTree: Send + Sync {
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<()>;

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Remove a key; returns whether it was present
    fn remove(&self, key: &[u8]) -> StorageResult<bool>;

    fn is_empty(&self) -> StorageResult<bool>;

    /// Snapshot of every pair in key order
    fn entries(&self) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>>;

    fn clear(&self) -> StorageResult<()>;

    /// Flush pending writes to disk
    fn flush(&self) -> StorageResult<()>;
}

/// Main storage driver trait
pub trait StorageDriver: Send + Sync {
    /// Open or create a storage driver at the given path
    fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self>
    where
        Self: Sized;

    /// Open or create a named tree
    fn open_tree(&self, name: &str) -> StorageResult<Box<dyn StorageTree>>;

    /// Whether a named tree has been created
    fn has_tree(&self, name: &str) -> StorageResult<bool>;

    fn flush(&self) -> StorageResult<()>;

    fn storage_type(&self) -> StorageType;
}

impl StorageTree for Box<dyn StorageTree> {
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        (**self).insert(key, value)
    }

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn remove(&self, key: &[u8]) -> StorageResult<bool> {
        (**self).remove(key)
    }

    fn is_empty(&self) -> StorageResult<bool> {
        (**self).is_empty()
    }

    fn entries(&self) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        (**self).entries()
    }

    fn clear(&self) -> StorageResult<()> {
        (**self).clear()
    }

    fn flush(&self) -> StorageResult<()> {
        (**self).flush()
    }
}
