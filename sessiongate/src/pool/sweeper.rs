// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Background expiry of pooled connections and session tokens

use super::manager::ConnectionPool;
use crate::node::NodeContext;
use crate::session::TokenManager;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Periodic sweep task
pub struct PoolSweeper;

/// Stops a running sweeper
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PoolSweeper {
    /// Spawn the sweep loop on the current tokio runtime
    ///
    /// The tick is read from the context before every wait, so a config
    /// reload changes the period from the next iteration on.
    pub fn spawn(
        context: Arc<NodeContext>,
        pool: Arc<ConnectionPool>,
        tokens: Arc<TokenManager>,
    ) -> SweeperHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            log::debug!("Sweeper started (tick {:?})", context.ttl_tick());
            loop {
                let tick = context.ttl_tick();
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => {
                        log::debug!("Sweeper shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(tick) => {
                        let closed = pool.sweep().await;
                        let purged = tokens.purge_expired();
                        if closed > 0 || purged > 0 {
                            log::info!(
                                "Expired {} connections and {} token entries",
                                closed,
                                purged
                            );
                        }
                    }
                }
            }
        });
        SweeperHandle { shutdown, task }
    }
}

impl SweeperHandle {
    /// Signal the loop and wait for it to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            log::error!("Sweeper task ended abnormally: {}", e);
        }
    }
}
