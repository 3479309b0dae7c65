// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Node startup

use super::service::SessionGateway;
use crate::cluster::{ClusterStatusAggregator, LeaderPolicy, StaticLeaderPolicy};
use crate::config::{ConfigApplier, ConfigRegistry, ConfigSource, RuntimeParams};
use crate::error::StartupError;
use crate::node::NodeContext;
use crate::pool::{BackendConfig, BackendConnection, BackendConnector, ConnectionPool, PoolSweeper};
use crate::session::{Authenticator, TokenManager};
use parking_lot::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Assembles a [`SessionGateway`] from its collaborators
pub struct GatewayBuilder {
    connector: Arc<dyn BackendConnector>,
    authenticator: Arc<dyn Authenticator>,
    source: Arc<dyn ConfigSource>,
    backend_config: Option<BackendConfig>,
    leader_policy: Arc<dyn LeaderPolicy>,
    registry: ConfigRegistry,
    start_sweeper: bool,
}

impl GatewayBuilder {
    pub fn new(
        connector: Arc<dyn BackendConnector>,
        authenticator: Arc<dyn Authenticator>,
        source: Arc<dyn ConfigSource>,
    ) -> Self {
        Self {
            connector,
            authenticator,
            source,
            backend_config: None,
            leader_policy: Arc::new(StaticLeaderPolicy::default()),
            registry: ConfigRegistry::with_builtin(),
            start_sweeper: true,
        }
    }

    /// Backend connection settings; read from `DB_*` variables when not set
    pub fn backend_config(mut self, config: BackendConfig) -> Self {
        self.backend_config = Some(config);
        self
    }

    pub fn leader_policy(mut self, policy: Arc<dyn LeaderPolicy>) -> Self {
        self.leader_policy = policy;
        self
    }

    pub fn registry(mut self, registry: ConfigRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Run without the background sweeper; expiry then happens only on
    /// explicit `sweep` / `purge_expired` calls
    pub fn without_sweeper(mut self) -> Self {
        self.start_sweeper = false;
        self
    }

    /// Bring the node up
    ///
    /// Steps run in order and any failure aborts startup: open the internal
    /// connection, load node settings, load the config table, read backend
    /// status, apply config, derive the cluster view, start the sweeper.
    pub async fn build(self) -> Result<SessionGateway, StartupError> {
        let backend_config = self.backend_config.unwrap_or_else(BackendConfig::from_env);
        log::debug!("Opening internal connection to {}", backend_config.generate_url());
        let internal = self
            .connector
            .open(&backend_config)
            .await
            .map_err(StartupError::InternalConnection)?;

        match Self::prepare(self.source.as_ref(), &*internal, self.registry).await {
            Ok((context, applier, backend)) => {
                let context = Arc::new(context);
                let aggregator = ClusterStatusAggregator::new(self.leader_policy);
                aggregator.refresh(&context);
                aggregator.observe_backend(&context, backend);

                let tokens = Arc::new(TokenManager::new(context.clone()));
                let pool = Arc::new(ConnectionPool::new(context.clone()));
                let sweeper = self
                    .start_sweeper
                    .then(|| PoolSweeper::spawn(context.clone(), pool.clone(), tokens.clone()));

                let gateway = SessionGateway {
                    context,
                    tokens,
                    pool,
                    aggregator,
                    applier: Mutex::new(applier),
                    source: self.source,
                    connector: self.connector,
                    authenticator: self.authenticator,
                    backend_config,
                    internal,
                    sweeper: Mutex::new(sweeper),
                    stopped: AtomicBool::new(false),
                };
                log_startup_summary(&gateway);
                Ok(gateway)
            }
            Err(err) => {
                if let Err(e) = internal.close().await {
                    log::error!("Failed to close internal connection after startup error: {}", e);
                }
                Err(err)
            }
        }
    }

    async fn prepare(
        source: &dyn ConfigSource,
        internal: &dyn BackendConnection,
        registry: ConfigRegistry,
    ) -> Result<(NodeContext, ConfigApplier, crate::pool::BackendStatus), StartupError> {
        let mut settings = source
            .load_settings()
            .map_err(StartupError::Settings)?
            .ok_or(StartupError::SettingsMissing)?;
        settings.fill_from_env();

        let mut applier = ConfigApplier::new(registry);
        applier.load_all(source).map_err(StartupError::Config)?;

        let backend = internal.status().await.map_err(StartupError::BackendStatus)?;

        let mut params = RuntimeParams::default();
        let report = applier.apply_all(&mut params);
        if !report.is_clean() {
            log::warn!("{} config rows rejected at startup", report.errors.len());
        }

        Ok((NodeContext::new(settings, params), applier, backend))
    }
}

fn log_startup_summary(gateway: &SessionGateway) {
    let status = gateway.status();
    let params = gateway.context.params();
    log::info!(
        "SessionGate {} node {} ({}) at {} mode={} leader={}",
        status.version,
        status.node_number,
        status.label,
        status.url,
        status.mode,
        status.is_leader
    );
    log::info!(
        "Pool enabled={} max={} effective={} peers={}; tokens access={:?} refresh={:?} sweep={:?}",
        status.pool_enabled,
        status.max_pool,
        status.effective_max_pool,
        status.peers.len(),
        params.token_ttl,
        params.refresh_ttl,
        params.ttl_tick
    );
    if let Some(message) = &status.reconciliation {
        log::info!("{}", message);
    }
}
