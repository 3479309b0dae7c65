// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! SessionGate - token-authenticated session and connection gateway
//!
//! SessionGate sits in front of a clustered SQL engine. It authenticates
//! users, issues opaque access/refresh token pairs, binds each session to its
//! own backend connection, expires both on a timer, and sizes the connection
//! quota from the cluster topology kept in a persisted config table.
//!
//! # Example
//!
//! ```ignore
//! use sessiongate::{ConfigStore, GatewayBuilder, StorageType};
//! use std::sync::Arc;
//!
//! let store = Arc::new(ConfigStore::open(StorageType::Sled, "./gateway-data")?);
//! let gateway = GatewayBuilder::new(connector, authenticator, store).build().await?;
//!
//! let session = gateway.establish_session("alice", "secret").await?;
//! let conn = gateway.connection_for(&session.access_token).await?;
//! let renewed = gateway.renew_session(&session.refresh_token).await?;
//! ```

pub mod cluster;
pub mod config;
pub mod error;
pub mod gateway;
pub mod node;
pub mod pool;
pub mod session;
pub mod storage;
pub mod ttl;

pub use cluster::{ClusterStatusAggregator, LeaderPolicy, Reconciliation, StaticLeaderPolicy};
pub use config::{
    ApplyReport, ConfigApplier, ConfigEntry, ConfigRegistry, ConfigSource, ConfigStore,
    NodeDescriptor, NodeMode, NodeSettings, RuntimeParams,
};
pub use error::{
    AuthError, CapacityError, ConfigError, ConnectionError, GatewayError, GatewayResult,
    SessionError, StartupError,
};
pub use gateway::{GatewayBuilder, NodeStatus, SessionGateway};
pub use node::NodeContext;
pub use pool::{
    BackendConfig, BackendConnection, BackendConnector, BackendStatus, ConnectionPool,
    PoolSweeper, SweeperHandle,
};
pub use session::{Authenticator, RefreshedSession, SessionCredential, TokenManager, UserIdentity};
pub use storage::StorageType;
pub use ttl::TtlMap;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
