// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Configuration: the persisted `(category, key)` table, the registry of
//! appliers that turn it into [`RuntimeParams`], and this node's settings
//!
//! # Known rows
//!
//! | category     | key           | parameter                         |
//! |--------------|---------------|-----------------------------------|
//! | `token`      | `token_exp`   | access token TTL (minutes)        |
//! | `token`      | `refresh_exp` | refresh token TTL (minutes)       |
//! | `token`      | `token_ttl`   | expiry sweep interval (minutes)   |
//! | `connection` | `pool_on`     | pooling enabled                   |
//! | `connection` | `max_pool`    | per-node quota, `0` disables      |
//! | `nodes`      | any           | `number\|host\|address\|mode`     |

pub mod applier;
pub mod entry;
pub mod node_directory;
pub mod params;
pub mod registry;
pub mod settings;
pub mod source;
pub mod store;

pub use applier::{ApplyReport, ConfigApplier};
pub use entry::{ConfigEntry, ConfigSnapshot};
pub use node_directory::{NodeDescriptor, NodeMode};
pub use params::RuntimeParams;
pub use registry::{CollectionApplier, CollectionOutcome, ConfigRegistry, ScalarApplier};
pub use settings::NodeSettings;
pub use source::ConfigSource;
pub use store::ConfigStore;
