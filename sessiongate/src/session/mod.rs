// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! User sessions: identities, token pairs and their lifecycle

pub mod auth;
pub mod models;
pub mod token;

pub use auth::Authenticator;
pub use models::{RefreshedSession, SessionCredential, UserIdentity};
pub use token::TokenManager;
