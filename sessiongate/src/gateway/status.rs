// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Node status snapshot

use crate::config::{NodeDescriptor, NodeMode};
use crate::node::NodeContext;
use crate::pool::BackendStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything an operator wants to know about a running node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeStatus {
    pub version: String,
    pub node_number: u32,
    pub label: String,
    pub url: String,
    pub mode: NodeMode,
    pub dbms: String,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: u64,
    pub is_leader: bool,
    pub peers: Vec<NodeDescriptor>,
    pub pool_enabled: bool,
    pub max_pool: usize,
    pub effective_max_pool: usize,
    pub pooled_connections: usize,
    pub active_sessions: usize,
    pub backend: Option<BackendStatus>,
    /// "Status peers vs config matched" or the mismatch details
    pub reconciliation: Option<String>,
}

impl NodeStatus {
    /// Status of a node that is not serving: no sessions, no connections
    pub fn offline(context: &NodeContext) -> Self {
        Self::collect(context, 0, 0)
    }

    pub(crate) fn collect(
        context: &NodeContext,
        pooled_connections: usize,
        active_sessions: usize,
    ) -> Self {
        let settings = context.settings();
        let cluster = context.cluster();
        let (pool_enabled, max_pool) = context.with_params(|p| (p.pool_enabled, p.max_pool));
        NodeStatus {
            version: crate::VERSION.to_string(),
            node_number: settings.node_number,
            url: settings.url(),
            label: settings.label,
            mode: settings.mode,
            dbms: settings.dbms,
            started_at: context.started_at(),
            uptime_secs: context.uptime().as_secs(),
            is_leader: cluster.is_leader,
            peers: cluster.peers,
            pool_enabled,
            max_pool,
            effective_max_pool: cluster.effective_max_pool,
            pooled_connections,
            active_sessions,
            backend: cluster.backend,
            reconciliation: cluster.reconciliation.map(|r| r.message),
        }
    }
}
