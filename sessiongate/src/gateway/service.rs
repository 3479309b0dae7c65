// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Operations exposed to the request layer

use super::status::NodeStatus;
use crate::cluster::ClusterStatusAggregator;
use crate::config::{ApplyReport, ConfigApplier, ConfigSource};
use crate::error::{CapacityError, ConfigError, GatewayResult};
use crate::node::NodeContext;
use crate::pool::{BackendConfig, BackendConnection, BackendConnector, ConnectionPool, SweeperHandle};
use crate::session::{Authenticator, SessionCredential, TokenManager};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Session and connection lifecycle for one node
///
/// Build one with [`GatewayBuilder`](super::GatewayBuilder).
pub struct SessionGateway {
    pub(crate) context: Arc<NodeContext>,
    pub(crate) tokens: Arc<TokenManager>,
    pub(crate) pool: Arc<ConnectionPool>,
    pub(crate) aggregator: ClusterStatusAggregator,
    pub(crate) applier: Mutex<ConfigApplier>,
    pub(crate) source: Arc<dyn ConfigSource>,
    pub(crate) connector: Arc<dyn BackendConnector>,
    pub(crate) authenticator: Arc<dyn Authenticator>,
    pub(crate) backend_config: BackendConfig,
    pub(crate) internal: Arc<dyn BackendConnection>,
    pub(crate) sweeper: Mutex<Option<SweeperHandle>>,
    pub(crate) stopped: AtomicBool,
}

impl SessionGateway {
    pub fn context(&self) -> &Arc<NodeContext> {
        &self.context
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    /// Connection the gateway itself uses for settings and status
    pub fn internal_connection(&self) -> &Arc<dyn BackendConnection> {
        &self.internal
    }

    fn capacity_error(&self) -> CapacityError {
        if self.pool.is_enabled() {
            CapacityError::QuotaExceeded {
                max: self.pool.effective_max(),
            }
        } else {
            CapacityError::PoolDisabled
        }
    }

    /// Authenticate a user, open their connection and issue a token pair
    pub async fn establish_session(
        &self,
        username: &str,
        secret: &str,
    ) -> GatewayResult<Arc<SessionCredential>> {
        let identity = self.authenticator.authenticate(username, secret).await?;

        if !self.pool.is_available() {
            let err = self.capacity_error();
            log::warn!("Refusing session for '{}': {}", username, err);
            return Err(err.into());
        }

        let conn = self.connector.open(&self.backend_config).await?;
        let credential = self.tokens.create_session(&identity);

        if !self.pool.bind(&credential.access_token, conn.clone()).await {
            // lost the last slot to a concurrent establish
            self.tokens.revoke(&credential.access_token);
            if let Err(e) = conn.close().await {
                log::error!("Failed to close refused connection: {}", e);
            }
            let err = self.capacity_error();
            log::warn!("Refusing session for '{}': {}", username, err);
            return Err(err.into());
        }

        log::info!("Session established for user '{}'", identity.username);
        Ok(credential)
    }

    /// Exchange a refresh token for a new pair, keeping the pooled connection
    pub async fn renew_session(&self, refresh_token: &str) -> GatewayResult<Arc<SessionCredential>> {
        let refreshed = self.tokens.refresh_session(refresh_token)?;
        let moved = self
            .pool
            .rekey(&refreshed.previous.access_token, &refreshed.current.access_token)
            .await;
        if !moved {
            log::warn!(
                "No pooled connection to carry over for user '{}'",
                refreshed.current.username
            );
        }
        Ok(refreshed.current)
    }

    /// Connection bound to a live access token
    pub async fn connection_for(&self, access_token: &str) -> GatewayResult<Arc<dyn BackendConnection>> {
        self.tokens.validate_access(access_token)?;
        Ok(self.pool.acquire(access_token).await?)
    }

    /// Invalidate a session and close its connection
    pub async fn revoke_session(&self, access_token: &str) -> GatewayResult<()> {
        let credential = self.tokens.validate_access(access_token)?;
        self.tokens.revoke(access_token);
        self.pool.release(access_token).await;
        log::info!("Session revoked for user '{}'", credential.username);
        Ok(())
    }

    /// Snapshot of this node
    pub fn status(&self) -> NodeStatus {
        NodeStatus::collect(&self.context, self.pool.len(), self.tokens.active_sessions())
    }

    /// Backend status read through the caller's own connection, reconciled
    /// with the configured topology
    pub async fn cluster_status(&self, access_token: &str) -> GatewayResult<NodeStatus> {
        let conn = self.connection_for(access_token).await?;
        let backend = conn.status().await?;
        self.aggregator.observe_backend(&self.context, backend);
        Ok(self.status())
    }

    /// Re-read the config table and re-derive every runtime parameter
    ///
    /// Existing tokens and connections keep the TTLs they were issued with.
    pub fn reload_config(&self) -> Result<ApplyReport, ConfigError> {
        let mut applier = self.applier.lock();
        applier.load_all(self.source.as_ref())?;
        let mut params = self.context.params();
        let report = applier.apply_all(&mut params);
        drop(applier);

        self.context.replace_params(params);
        self.aggregator.refresh(&self.context);
        log::info!(
            "Config reloaded: effective max pool {}",
            self.context.effective_max_pool()
        );
        Ok(report)
    }

    pub fn ping(&self) -> &'static str {
        "pong"
    }

    /// Stop the sweeper, close every pooled connection, then the internal one
    pub async fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        let sweeper = self.sweeper.lock().take();
        if let Some(sweeper) = sweeper {
            sweeper.shutdown().await;
        }
        let closed = self.pool.close_all().await;
        self.tokens.clear();
        if let Err(e) = self.internal.close().await {
            log::error!("Failed to close internal connection: {}", e);
        }
        log::info!("Gateway stopped; closed {} pooled connections", closed);
    }
}
