// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Access/refresh token issuing and validation
//!
//! Credentials are indexed twice: by access token (valid for the access TTL)
//! and by refresh token (valid for the refresh TTL). Both indexes hold the
//! same `Arc<SessionCredential>`.

use super::models::{RefreshedSession, SessionCredential, UserIdentity};
use crate::error::AuthError;
use crate::node::NodeContext;
use crate::ttl::TtlMap;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Opaque 64-hex-character token from two random UUIDs
fn generate_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Issues, validates, refreshes and revokes session tokens
pub struct TokenManager {
    context: Arc<NodeContext>,
    access: TtlMap<Arc<SessionCredential>>,
    refresh: TtlMap<Arc<SessionCredential>>,
}

impl TokenManager {
    pub fn new(context: Arc<NodeContext>) -> Self {
        Self {
            context,
            access: TtlMap::new(),
            refresh: TtlMap::new(),
        }
    }

    /// Issue a fresh token pair for `identity` using the current TTLs
    pub fn create_session(&self, identity: &UserIdentity) -> Arc<SessionCredential> {
        let (access_ttl, refresh_ttl) = self
            .context
            .with_params(|params| (params.token_ttl, params.refresh_ttl));

        let credential = Arc::new(SessionCredential {
            access_token: generate_token(),
            refresh_token: generate_token(),
            user_id: identity.user_id.clone(),
            username: identity.username.clone(),
            issued_at: Utc::now(),
            access_ttl,
            refresh_ttl,
        });

        self.access
            .put(credential.access_token.clone(), access_ttl, credential.clone());
        self.refresh
            .put(credential.refresh_token.clone(), refresh_ttl, credential.clone());
        log::debug!("Issued session for user '{}'", identity.username);
        credential
    }

    /// Credential behind a live access token
    pub fn validate_access(&self, access_token: &str) -> Result<Arc<SessionCredential>, AuthError> {
        self.access
            .get(access_token)
            .ok_or(AuthError::InvalidOrExpiredToken)
    }

    /// Trade a live refresh token for a new pair
    ///
    /// The refresh entry is removed before anything else, so among concurrent
    /// callers presenting the same token exactly one succeeds. The previous
    /// access token stops validating as well.
    pub fn refresh_session(&self, refresh_token: &str) -> Result<RefreshedSession, AuthError> {
        let removed = self
            .refresh
            .remove(refresh_token)
            .ok_or(AuthError::InvalidOrExpiredRefresh)?;
        if removed.expired {
            return Err(AuthError::InvalidOrExpiredRefresh);
        }
        let previous = removed.value;
        self.access.remove(&previous.access_token);

        let current = self.create_session(&previous.identity());
        log::debug!("Refreshed session for user '{}'", previous.username);
        Ok(RefreshedSession { previous, current })
    }

    /// Invalidate both tokens of the session behind `access_token`
    pub fn revoke(&self, access_token: &str) -> Option<Arc<SessionCredential>> {
        let removed = self.access.remove(access_token)?;
        let credential = removed.value;
        self.refresh.remove(&credential.refresh_token);
        log::debug!("Revoked session for user '{}'", credential.username);
        Some(credential)
    }

    /// Drop expired entries from both indexes; returns how many were dropped
    pub fn purge_expired(&self) -> usize {
        self.access.purge_expired().len() + self.refresh.purge_expired().len()
    }

    /// Sessions that can still be refreshed, counting expired ones not yet purged
    pub fn active_sessions(&self) -> usize {
        self.refresh.len()
    }

    /// Forget every token
    pub fn clear(&self) {
        self.access.drain();
        self.refresh.drain();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NodeSettings, RuntimeParams};
    use std::thread;
    use std::time::Duration;

    fn manager(token_ttl: Duration, refresh_ttl: Duration) -> TokenManager {
        let params = RuntimeParams {
            token_ttl,
            refresh_ttl,
            ..Default::default()
        };
        TokenManager::new(Arc::new(NodeContext::new(NodeSettings::new(1, "test"), params)))
    }

    fn alice() -> UserIdentity {
        UserIdentity::new("u-1", "alice")
    }

    #[test]
    fn test_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_create_and_validate() {
        let tokens = manager(Duration::from_secs(60), Duration::from_secs(120));
        let cred = tokens.create_session(&alice());
        assert_ne!(cred.access_token, cred.refresh_token);
        assert_eq!(cred.access_ttl, Duration::from_secs(60));

        let found = tokens.validate_access(&cred.access_token).unwrap();
        assert_eq!(found.username, "alice");
        // refresh tokens do not authorize requests
        assert_eq!(
            tokens.validate_access(&cred.refresh_token).unwrap_err(),
            AuthError::InvalidOrExpiredToken
        );
    }

    #[test]
    fn test_access_expires_before_refresh() {
        let tokens = manager(Duration::from_millis(30), Duration::from_secs(60));
        let cred = tokens.create_session(&alice());
        thread::sleep(Duration::from_millis(60));

        assert!(tokens.validate_access(&cred.access_token).is_err());
        let refreshed = tokens.refresh_session(&cred.refresh_token).unwrap();
        assert_eq!(refreshed.previous.access_token, cred.access_token);
        assert!(tokens.validate_access(&refreshed.current.access_token).is_ok());
    }

    #[test]
    fn test_refresh_is_single_use_and_retires_old_access() {
        let tokens = manager(Duration::from_secs(60), Duration::from_secs(120));
        let cred = tokens.create_session(&alice());

        let refreshed = tokens.refresh_session(&cred.refresh_token).unwrap();
        assert_eq!(refreshed.current.user_id, "u-1");
        assert!(tokens.validate_access(&cred.access_token).is_err());
        assert_eq!(
            tokens.refresh_session(&cred.refresh_token).unwrap_err(),
            AuthError::InvalidOrExpiredRefresh
        );
        assert_eq!(tokens.active_sessions(), 1);
    }

    #[test]
    fn test_expired_refresh_is_rejected() {
        let tokens = manager(Duration::from_millis(10), Duration::from_millis(20));
        let cred = tokens.create_session(&alice());
        thread::sleep(Duration::from_millis(50));
        assert_eq!(
            tokens.refresh_session(&cred.refresh_token).unwrap_err(),
            AuthError::InvalidOrExpiredRefresh
        );
    }

    #[test]
    fn test_revoke_and_purge() {
        let tokens = manager(Duration::from_millis(20), Duration::from_millis(40));
        let kept = tokens.create_session(&alice());
        let revoked = tokens.create_session(&UserIdentity::new("u-2", "bob"));

        assert!(tokens.revoke(&revoked.access_token).is_some());
        assert!(tokens.revoke(&revoked.access_token).is_none());
        assert!(tokens.refresh_session(&revoked.refresh_token).is_err());

        thread::sleep(Duration::from_millis(60));
        assert_eq!(tokens.purge_expired(), 2);
        assert_eq!(tokens.active_sessions(), 0);
        assert!(tokens.validate_access(&kept.access_token).is_err());
    }
}
