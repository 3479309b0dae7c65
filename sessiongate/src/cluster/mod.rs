// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Cluster topology: peers, leadership and the effective connection quota

pub mod aggregator;
pub mod leader;

pub use aggregator::{ClusterStatusAggregator, Reconciliation};
pub use leader::{LeaderPolicy, StaticLeaderPolicy, DEFAULT_LEADER_NODE};
