// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Backend connection contracts
//!
//! The gateway never speaks the backend protocol itself. It opens, hands out
//! and closes opaque handles through these traits and asks them for cluster
//! status.

use crate::error::ConnectionError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Cluster status as reported by the backend itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendStatus {
    /// Address of the node the backend considers leader
    pub leader: String,
    /// Number of peers the backend sees, not counting itself
    pub peers: usize,
    pub dir_size: u64,
    pub db_size: u64,
    pub last_backup: Option<DateTime<Utc>>,
}

/// One open backend connection
#[async_trait]
pub trait BackendConnection: Send + Sync {
    /// Close the connection; called exactly once by its owner
    async fn close(&self) -> Result<(), ConnectionError>;

    fn is_connected(&self) -> bool;

    async fn status(&self) -> Result<BackendStatus, ConnectionError>;

    /// Downcast hook for callers that know the concrete driver
    fn as_any(&self) -> &dyn Any;
}

/// Opens backend connections
#[async_trait]
pub trait BackendConnector: Send + Sync {
    async fn open(&self, config: &BackendConfig)
        -> Result<Arc<dyn BackendConnection>, ConnectionError>;
}

pub const ENV_DB_HOST: &str = "DB_HOST";
pub const ENV_DB_PORT: &str = "DB_PORT";
pub const ENV_DB_USERNAME: &str = "DB_USERNAME";
pub const ENV_DB_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_DB_DATABASE: &str = "DB_DATABASE";
pub const ENV_DB_SSL: &str = "DB_SSL";
pub const ENV_DB_OPTIONS: &str = "DB_OPTIONS";
pub const ENV_DB_CONSISTENCY: &str = "DB_CONSISTENCY";
pub const ENV_DB_API_KEY: &str = "DB_API_KEY";
pub const ENV_DB_CLIENT_ID: &str = "DB_CLIENT_ID";
pub const ENV_DB_HTTP_TIMEOUT: &str = "DB_HTTP_TIMEOUT";
pub const ENV_DB_RETRY_TIMEOUT: &str = "DB_RETRY_TIMEOUT";
pub const ENV_DB_MAX_RETRIES: &str = "DB_MAX_RETRIES";

/// Everything a connector needs to reach the backend
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub host: String,
    pub port: String,
    pub username: String,
    pub password: String,
    pub database: String,
    pub ssl: bool,
    pub options: String,
    pub consistency: String,
    pub api_key: String,
    pub client_id: String,
    pub http_timeout: Duration,
    pub retry_timeout: Duration,
    pub max_retries: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: "4001".to_string(),
            username: String::new(),
            password: String::new(),
            database: String::new(),
            ssl: false,
            options: String::new(),
            consistency: "weak".to_string(),
            api_key: String::new(),
            client_id: String::new(),
            http_timeout: Duration::from_secs(30),
            retry_timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }
}

impl BackendConfig {
    /// Read the `DB_*` variables; unset or unparsable ones keep their default
    pub fn from_env() -> Self {
        let mut config = Self::default();
        let text = |var: &str, slot: &mut String| {
            if let Ok(value) = env::var(var) {
                *slot = value.trim().to_string();
            }
        };
        text(ENV_DB_HOST, &mut config.host);
        text(ENV_DB_PORT, &mut config.port);
        text(ENV_DB_USERNAME, &mut config.username);
        text(ENV_DB_PASSWORD, &mut config.password);
        text(ENV_DB_DATABASE, &mut config.database);
        text(ENV_DB_OPTIONS, &mut config.options);
        text(ENV_DB_CONSISTENCY, &mut config.consistency);
        text(ENV_DB_API_KEY, &mut config.api_key);
        text(ENV_DB_CLIENT_ID, &mut config.client_id);

        if let Ok(value) = env::var(ENV_DB_SSL) {
            config.ssl = crate::config::settings::parse_flag(&value);
        }
        if let Some(secs) = env_number::<u64>(ENV_DB_HTTP_TIMEOUT) {
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_number::<u64>(ENV_DB_RETRY_TIMEOUT) {
            config.retry_timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = env_number::<u32>(ENV_DB_MAX_RETRIES) {
            config.max_retries = retries;
        }
        config
    }

    /// Base URL of the backend's HTTP API
    pub fn generate_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        let mut url = if self.port.is_empty() {
            format!("{}://{}", scheme, self.host)
        } else {
            format!("{}://{}:{}", scheme, self.host, self.port)
        };
        if !self.options.is_empty() {
            url.push('?');
            url.push_str(self.options.trim_start_matches('?'));
        }
        url
    }
}

fn env_number<T: std::str::FromStr>(var: &str) -> Option<T> {
    let raw = env::var(var).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not a number", var, raw);
            None
        }
    }
}

const REDACTED: &str = "***";

fn redact(secret: &str) -> &str {
    if secret.is_empty() {
        ""
    } else {
        REDACTED
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("database", &self.database)
            .field("ssl", &self.ssl)
            .field("options", &self.options)
            .field("consistency", &self.consistency)
            .field("api_key", &redact(&self.api_key))
            .field("client_id", &self.client_id)
            .field("http_timeout", &self.http_timeout)
            .field("retry_timeout", &self.retry_timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}
