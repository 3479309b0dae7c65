// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Derives peers, leadership and the effective pool quota

use super::leader::{LeaderPolicy, StaticLeaderPolicy};
use crate::config::{NodeDescriptor, RuntimeParams};
use crate::node::NodeContext;
use crate::pool::BackendStatus;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Comparison of the configured topology with the backend's own report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub configured_peers: usize,
    pub reported_peers: usize,
    pub peers_match: bool,
    /// Address of the designated leader, when it is in the directory
    pub configured_leader: Option<String>,
    pub reported_leader: String,
    pub leader_mismatch: bool,
    pub message: String,
}

impl Reconciliation {
    pub fn is_consistent(&self) -> bool {
        self.peers_match && !self.leader_mismatch
    }
}

/// Recomputes the cluster view held by a [`NodeContext`]
pub struct ClusterStatusAggregator {
    policy: Arc<dyn LeaderPolicy>,
}

impl Default for ClusterStatusAggregator {
    fn default() -> Self {
        Self::new(Arc::new(StaticLeaderPolicy::default()))
    }
}

impl ClusterStatusAggregator {
    pub fn new(policy: Arc<dyn LeaderPolicy>) -> Self {
        Self { policy }
    }

    /// Effective quota: base pool scaled by peer count, never by less than one
    pub fn effective_max_pool(max_pool: usize, peer_count: usize) -> usize {
        max_pool.saturating_mul(peer_count.max(1))
    }

    /// Recompute peers, leader flag and effective quota from current params
    pub fn refresh(&self, context: &NodeContext) {
        let node_number = context.node_number();
        let (peers, is_leader, max_pool) = context.with_params(|params| {
            let peers: Vec<NodeDescriptor> = params
                .node_directory
                .values()
                .filter(|node| node.node_number != node_number)
                .cloned()
                .collect();
            (
                peers,
                self.policy.is_leader(node_number, params),
                params.max_pool,
            )
        });
        let effective = Self::effective_max_pool(max_pool, peers.len());

        log::debug!(
            "Cluster view: node {} leader={} peers={} effective_max_pool={}",
            node_number,
            is_leader,
            peers.len(),
            effective
        );
        context.update_cluster(|state| {
            state.peers = peers;
            state.is_leader = is_leader;
            state.effective_max_pool = effective;
        });
    }

    /// Record the backend's status and reconcile it with the configured view
    pub fn observe_backend(&self, context: &NodeContext, status: BackendStatus) -> Reconciliation {
        let configured_peers = context.cluster().peers.len();
        let configured_leader = context.with_params(|params| leader_address(&*self.policy, params));
        let reconciliation = reconcile(configured_peers, configured_leader, &status);

        if reconciliation.is_consistent() {
            log::debug!("{}", reconciliation.message);
        } else {
            log::warn!("{}", reconciliation.message);
        }
        context.update_cluster(|state| {
            state.backend = Some(status);
            state.reconciliation = Some(reconciliation.clone());
        });
        reconciliation
    }
}

fn leader_address(policy: &dyn LeaderPolicy, params: &RuntimeParams) -> Option<String> {
    policy.leader(params).map(|node| {
        if node.address.is_empty() {
            node.host.clone()
        } else {
            node.address.clone()
        }
    })
}

/// Whether the backend's leader string names the configured leader node
///
/// The backend may report `host`, `address` or either with a `:port` suffix.
fn names_node(reported: &str, expected: &str) -> bool {
    let reported = reported
        .trim()
        .trim_start_matches("http://")
        .trim_start_matches("https://");
    let bare = reported.rsplit_once(':').map_or(reported, |(host, _)| host);
    reported == expected || bare == expected
}

fn reconcile(
    configured_peers: usize,
    configured_leader: Option<String>,
    status: &BackendStatus,
) -> Reconciliation {
    let peers_match = configured_peers == status.peers;
    let leader_mismatch = match &configured_leader {
        Some(expected) if !status.leader.trim().is_empty() => !names_node(&status.leader, expected),
        _ => false,
    };

    let mut message = if peers_match {
        "Status peers vs config matched".to_string()
    } else {
        format!(
            "Status peers vs config mismatched (backend {}, config {})",
            status.peers, configured_peers
        )
    };
    if leader_mismatch {
        message.push_str(&format!(
            "; backend leader {} is not the designated leader {}",
            status.leader,
            configured_leader.as_deref().unwrap_or("?")
        ));
    }

    Reconciliation {
        configured_peers,
        reported_peers: status.peers,
        peers_match,
        configured_leader,
        reported_leader: status.leader.clone(),
        leader_mismatch,
        message,
    }
}
