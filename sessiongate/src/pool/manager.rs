// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Token-keyed pool of backend connections
//!
//! Each entry maps a user's current access token to the connection opened for
//! that user and lives for the refresh TTL, so a client whose access token has
//! expired can still renew and keep its connection. The pool owns every
//! handle it holds and closes it exactly once: on expiry, release,
//! displacement or shutdown. Closing always happens after the entry has left
//! the map, never under a partition lock.

use super::connection::BackendConnection;
use crate::error::SessionError;
use crate::node::NodeContext;
use crate::ttl::{Rename, TtlMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub struct ConnectionPool {
    context: Arc<NodeContext>,
    entries: TtlMap<Arc<dyn BackendConnection>>,
    /// Reserved slots; never exceeds the effective maximum
    bound: AtomicUsize,
}

impl ConnectionPool {
    pub fn new(context: Arc<NodeContext>) -> Self {
        Self {
            context,
            entries: TtlMap::new(),
            bound: AtomicUsize::new(0),
        }
    }

    /// Effective quota, or zero when pooling is off
    pub fn effective_max(&self) -> usize {
        if self.context.pool_enabled() {
            self.context.effective_max_pool()
        } else {
            0
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.effective_max() > 0
    }

    /// Whether a new connection could be bound right now
    pub fn is_available(&self) -> bool {
        let max = self.effective_max();
        max > 0 && self.bound.load(Ordering::Acquire) < max
    }

    /// Connection bound to `token`; never opens one
    ///
    /// A handle that reports itself disconnected is evicted and closed, and
    /// the token reads as having no connection.
    pub async fn acquire(&self, token: &str) -> Result<Arc<dyn BackendConnection>, SessionError> {
        let conn = self.entries.get(token).ok_or(SessionError::NoConnection)?;
        if conn.is_connected() {
            return Ok(conn);
        }
        log::warn!("Pooled connection lost its backend, evicting");
        if let Some(dead) = self.entries.remove_if(token, |held| Arc::ptr_eq(held, &conn)) {
            self.release_slots(1);
            close_handle(dead, "disconnected").await;
        }
        Err(SessionError::NoConnection)
    }

    fn reserve_slot(&self) -> bool {
        let max = self.effective_max();
        let mut current = self.bound.load(Ordering::Acquire);
        loop {
            if current >= max {
                return false;
            }
            match self.bound.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    fn release_slots(&self, n: usize) {
        if n > 0 {
            self.bound.fetch_sub(n, Ordering::AcqRel);
        }
    }

    /// Bind a freshly opened connection to `token` for the refresh TTL
    ///
    /// A token that is already bound keeps its slot and only has its handle
    /// swapped. Otherwise returns `false` without touching `conn` when pooling
    /// is off or the quota is used up; the caller still owns the handle then.
    pub async fn bind(&self, token: &str, conn: Arc<dyn BackendConnection>) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let ttl = self.context.refresh_ttl();
        let conn = match self.entries.replace_live(token, ttl, conn) {
            Ok(displaced) => {
                close_handle(displaced, "displaced").await;
                return true;
            }
            Err(conn) => conn,
        };
        if !self.reserve_slot() {
            log::debug!(
                "Pool full ({} of {}), refusing bind",
                self.bound.load(Ordering::Acquire),
                self.effective_max()
            );
            return false;
        }
        if let Some(displaced) = self.entries.put(token, ttl, conn) {
            self.release_slots(1);
            close_handle(displaced, "displaced").await;
        }
        true
    }

    /// Move the connection bound to `old` under `new` with a fresh TTL
    ///
    /// `false` when `old` is absent or expired; the expired entry is left for
    /// the next sweep.
    pub async fn rekey(&self, old: &str, new: &str) -> bool {
        let ttl = self.context.refresh_ttl();
        match self.entries.rename(old, new, ttl) {
            Rename::Moved => true,
            Rename::Displaced(displaced) => {
                self.release_slots(1);
                close_handle(displaced, "displaced").await;
                true
            }
            Rename::Missing => false,
        }
    }

    /// Close and drop the connection bound to `token`
    pub async fn release(&self, token: &str) -> bool {
        match self.entries.remove(token) {
            Some(removed) => {
                self.release_slots(1);
                close_handle(removed.value, "released").await;
                true
            }
            None => false,
        }
    }

    /// Close every expired connection; returns how many were removed
    pub async fn sweep(&self) -> usize {
        let expired = self.entries.purge_expired();
        let count = expired.len();
        self.release_slots(count);
        for (_, conn) in expired {
            close_handle(conn, "expired").await;
        }
        if count > 0 {
            log::debug!("Swept {} expired connections", count);
        }
        count
    }

    /// Close every pooled connection
    pub async fn close_all(&self) -> usize {
        let all = self.entries.drain();
        let count = all.len();
        self.release_slots(count);
        for (_, conn) in all {
            close_handle(conn, "shutdown").await;
        }
        count
    }

    /// Entries held, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Slots currently reserved
    pub fn bound(&self) -> usize {
        self.bound.load(Ordering::Acquire)
    }
}

async fn close_handle(conn: Arc<dyn BackendConnection>, reason: &str) {
    if let Err(e) = conn.close().await {
        log::error!("Failed to close {} connection: {}", reason, e);
    }
}
