// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Session data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// An authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: String,
    pub username: String,
}

impl UserIdentity {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
        }
    }
}

/// A token pair issued to one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredential {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: String,
    pub username: String,
    pub issued_at: DateTime<Utc>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl SessionCredential {
    pub fn access_expires_at(&self) -> DateTime<Utc> {
        self.issued_at + to_chrono(self.access_ttl)
    }

    pub fn refresh_expires_at(&self) -> DateTime<Utc> {
        self.issued_at + to_chrono(self.refresh_ttl)
    }

    pub fn identity(&self) -> UserIdentity {
        UserIdentity::new(self.user_id.clone(), self.username.clone())
    }
}

fn to_chrono(ttl: Duration) -> chrono::Duration {
    chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36_500))
}

/// Result of a refresh: the retired pair and its replacement
#[derive(Debug, Clone)]
pub struct RefreshedSession {
    pub previous: std::sync::Arc<SessionCredential>,
    pub current: std::sync::Arc<SessionCredential>,
}
