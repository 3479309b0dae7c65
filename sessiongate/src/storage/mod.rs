// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Embedded key-value storage for node settings and the config table
//!
//! The gateway persists two small tables: the node's own settings record and
//! the `(category, key)` config rows. Both live in named trees of an embedded
//! store reached through the [`StorageDriver`] / [`StorageTree`] traits, so the
//! backing engine can be swapped without touching the config layer.
//!
//! ```text
//! ConfigStore (settings + config rows)
//!     ↓
//! StorageDriver / StorageTree (key-value abstraction)
//!     ↓
//! Sled | Memory
//! ```

pub mod factory;
pub mod memory;
#[cfg(feature = "sled-backend")]
pub mod sled;
pub mod traits;
pub mod types;

pub use factory::{create_storage_driver, BoxedDriver};
pub use traits::{StorageDriver, StorageTree};
pub use types::{StorageError, StorageResult, StorageType};
