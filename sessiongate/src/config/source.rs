// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Where config rows and node settings come from

use super::entry::ConfigEntry;
use super::settings::NodeSettings;
use crate::error::ConfigResult;

/// Read side of the persisted config table and settings record
pub trait ConfigSource: Send + Sync {
    /// Every config row; a missing or empty table is `Ok(vec![])`
    fn load_all(&self) -> ConfigResult<Vec<ConfigEntry>>;

    /// This node's settings, `None` if never initialised
    fn load_settings(&self) -> ConfigResult<Option<NodeSettings>>;
}
