// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the session gateway
//!
//! Errors are grouped by who can act on them:
//! - [`AuthError`]: client-facing, never retriable
//! - [`CapacityError`]: client should back off and retry later
//! - [`ConfigError`]: a single malformed config row, logged and skipped
//! - [`ConnectionError`]: backend failures, propagated untouched
//! - [`StartupError`]: anything that must abort process start

use thiserror::Error;

/// Authentication and token failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("invalid or expired refresh token")]
    InvalidOrExpiredRefresh,
}

/// Connection quota failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapacityError {
    #[error("connection pool quota exceeded (max {max})")]
    QuotaExceeded { max: usize },

    #[error("connection pooling is disabled on this node")]
    PoolDisabled,
}

/// Config table failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("cannot decode {category}/{key}: {reason}")]
    Decode {
        category: String,
        key: String,
        reason: String,
    },

    #[error("invalid value for {category}/{key}: {reason}")]
    InvalidValue {
        category: String,
        key: String,
        reason: String,
    },

    #[error("config storage error: {0}")]
    Storage(String),

    #[error("config serialization error: {0}")]
    Serialization(String),
}

impl ConfigError {
    pub(crate) fn decode(category: &str, key: &str, reason: impl Into<String>) -> Self {
        ConfigError::Decode {
            category: category.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(category: &str, key: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            category: category.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<crate::storage::StorageError> for ConfigError {
    fn from(err: crate::storage::StorageError) -> Self {
        ConfigError::Storage(err.to_string())
    }
}

impl From<bincode::Error> for ConfigError {
    fn from(err: bincode::Error) -> Self {
        ConfigError::Serialization(err.to_string())
    }
}

/// Backend connection failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("connection already closed")]
    Closed,

    #[error("backend error: {0}")]
    Backend(String),
}

/// Session-to-connection binding failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("no database connection bound to this session")]
    NoConnection,
}

/// Error returned by the gateway operations exposed to the request layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Capacity(#[from] CapacityError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl GatewayError {
    /// Only capacity errors go away by waiting
    pub fn is_retriable(&self) -> bool {
        matches!(self, GatewayError::Capacity(_))
    }
}

/// Fatal failures while bringing a node up
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("cannot open internal backend connection: {0}")]
    InternalConnection(#[source] ConnectionError),

    #[error("node settings not found; run `sessiongate init` first")]
    SettingsMissing,

    #[error("cannot load node settings: {0}")]
    Settings(#[source] ConfigError),

    #[error("cannot load config table: {0}")]
    Config(#[source] ConfigError),

    #[error("cannot read backend status: {0}")]
    BackendStatus(#[source] ConnectionError),
}

pub type GatewayResult<T> = Result<T, GatewayError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
