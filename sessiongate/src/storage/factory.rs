// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Storage driver factory

use super::memory::MemoryStorageDriver;
use super::traits::StorageDriver;
use super::types::{StorageResult, StorageType};
use std::path::Path;

/// Type-erased driver handed to the config store
pub type BoxedDriver = Box<dyn StorageDriver>;

/// Create a storage driver of the requested type rooted at `path`
///
/// # Examples
/// ```ignore
/// let driver = create_storage_driver(StorageType::Sled, "./gateway-data")?;
/// let tree = driver.open_tree("_configs")?;
/// ```
pub fn create_storage_driver<P: AsRef<Path>>(
    storage_type: StorageType,
    path: P,
) -> StorageResult<BoxedDriver> {
    match storage_type {
        #[cfg(feature = "sled-backend")]
        StorageType::Sled => {
            use super::sled::SledDriver;
            Ok(Box::new(SledDriver::open(path)?))
        }
        #[cfg(not(feature = "sled-backend"))]
        StorageType::Sled => Err(super::types::StorageError::Unsupported(StorageType::Sled)),
        StorageType::Memory => Ok(Box::new(MemoryStorageDriver::open(path)?)),
    }
}
