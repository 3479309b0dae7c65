// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Runtime parameters derived from the config table

use super::node_directory::NodeDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_TOKEN_TTL_MINUTES: u64 = 30;
pub const DEFAULT_REFRESH_TTL_MINUTES: u64 = 120;
pub const DEFAULT_TTL_TICK_MINUTES: u64 = 1;
pub const DEFAULT_MAX_POOL: usize = 25;

/// Values every other component reads at runtime
///
/// Only the config applier writes these; the default value of every field is
/// what the applier falls back to when the table has no (or a bad) row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeParams {
    /// Access token lifetime
    pub token_ttl: Duration,
    /// Refresh token lifetime, also the pooled connection lifetime
    pub refresh_ttl: Duration,
    /// Period of the expiry sweep
    pub ttl_tick: Duration,
    pub pool_enabled: bool,
    /// Per-node quota before scaling by peer count
    pub max_pool: usize,
    /// Every cluster member by node number, this node included
    pub node_directory: BTreeMap<u32, NodeDescriptor>,
}

impl Default for RuntimeParams {
    fn default() -> Self {
        Self {
            token_ttl: minutes(DEFAULT_TOKEN_TTL_MINUTES),
            refresh_ttl: minutes(DEFAULT_REFRESH_TTL_MINUTES),
            ttl_tick: minutes(DEFAULT_TTL_TICK_MINUTES),
            pool_enabled: true,
            max_pool: DEFAULT_MAX_POOL,
            node_directory: BTreeMap::new(),
        }
    }
}

pub(crate) fn minutes(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}
