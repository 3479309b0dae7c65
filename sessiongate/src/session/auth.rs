// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Credential check contract

use super::models::UserIdentity;
use crate::error::AuthError;
use async_trait::async_trait;

/// Verifies a username/secret pair, typically against the backend's user table
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, username: &str, secret: &str) -> Result<UserIdentity, AuthError>;
}
