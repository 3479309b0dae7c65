// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Node runtime state

pub mod context;

pub use context::{ClusterState, NodeContext};
