// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Leader designation

use crate::config::{NodeDescriptor, RuntimeParams};

/// Node number designated leader unless configured otherwise
pub const DEFAULT_LEADER_NODE: u32 = 1;

/// Decides which directory member the gateway treats as leader
pub trait LeaderPolicy: Send + Sync {
    /// Node number of the designated leader
    fn leader_number(&self, params: &RuntimeParams) -> u32;

    /// Directory entry of the designated leader, if it is listed
    fn leader<'a>(&self, params: &'a RuntimeParams) -> Option<&'a NodeDescriptor> {
        params.node_directory.get(&self.leader_number(params))
    }

    fn is_leader(&self, node_number: u32, params: &RuntimeParams) -> bool {
        node_number == self.leader_number(params)
    }
}

/// A fixed node number is always the leader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticLeaderPolicy {
    pub leader_number: u32,
}

impl Default for StaticLeaderPolicy {
    fn default() -> Self {
        Self {
            leader_number: DEFAULT_LEADER_NODE,
        }
    }
}

impl LeaderPolicy for StaticLeaderPolicy {
    fn leader_number(&self, _params: &RuntimeParams) -> u32 {
        self.leader_number
    }
}
