// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Runtime state of the node this gateway runs on

use crate::cluster::Reconciliation;
use crate::config::{NodeDescriptor, NodeSettings, RuntimeParams};
use crate::pool::BackendStatus;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::time::{Duration, Instant};

/// Topology-derived view, written by the cluster aggregator
#[derive(Debug, Clone, Default)]
pub struct ClusterState {
    /// Directory members other than this node
    pub peers: Vec<NodeDescriptor>,
    pub is_leader: bool,
    pub effective_max_pool: usize,
    /// Last status the backend reported about itself
    pub backend: Option<BackendStatus>,
    pub reconciliation: Option<Reconciliation>,
}

/// Shared node state
///
/// Written only by the config applier (through the gateway) and the cluster
/// aggregator; every other component reads it. Hand it around as
/// `Arc<NodeContext>`.
#[derive(Debug)]
pub struct NodeContext {
    settings: RwLock<NodeSettings>,
    params: RwLock<RuntimeParams>,
    cluster: RwLock<ClusterState>,
    started_at: DateTime<Utc>,
    started: Instant,
}

impl NodeContext {
    /// Create a context; cluster state stays empty until the aggregator runs
    pub fn new(settings: NodeSettings, params: RuntimeParams) -> Self {
        Self {
            settings: RwLock::new(settings),
            params: RwLock::new(params),
            cluster: RwLock::new(ClusterState::default()),
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    pub fn settings(&self) -> NodeSettings {
        self.settings.read().clone()
    }

    pub fn node_number(&self) -> u32 {
        self.settings.read().node_number
    }

    /// Copy of the current runtime parameters
    pub fn params(&self) -> RuntimeParams {
        self.params.read().clone()
    }

    /// Read the parameters in place without cloning the directory
    pub fn with_params<R>(&self, f: impl FnOnce(&RuntimeParams) -> R) -> R {
        f(&self.params.read())
    }

    pub fn token_ttl(&self) -> Duration {
        self.params.read().token_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.params.read().refresh_ttl
    }

    pub fn ttl_tick(&self) -> Duration {
        self.params.read().ttl_tick
    }

    pub fn pool_enabled(&self) -> bool {
        self.params.read().pool_enabled
    }

    pub fn cluster(&self) -> ClusterState {
        self.cluster.read().clone()
    }

    pub fn effective_max_pool(&self) -> usize {
        self.cluster.read().effective_max_pool
    }

    pub fn is_leader(&self) -> bool {
        self.cluster.read().is_leader
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn replace_params(&self, params: RuntimeParams) {
        *self.params.write() = params;
    }

    pub(crate) fn update_cluster(&self, f: impl FnOnce(&mut ClusterState)) {
        f(&mut self.cluster.write());
    }
}
