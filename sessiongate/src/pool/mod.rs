// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Backend connections: contracts, the token-keyed pool and its sweeper

pub mod connection;
pub mod manager;
pub mod sweeper;

pub use connection::{BackendConfig, BackendConnection, BackendConnector, BackendStatus};
pub use manager::ConnectionPool;
pub use sweeper::{PoolSweeper, SweeperHandle};
