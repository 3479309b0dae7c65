// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! The gateway facade: startup plus the session operations the request layer calls
//!
//! ```text
//! establish: authenticate -> quota check -> open connection -> issue tokens -> bind
//! renew:     refresh tokens -> re-key pooled connection (no reconnect)
//! ```

pub mod builder;
pub mod service;
pub mod status;

pub use builder::GatewayBuilder;
pub use service::SessionGateway;
pub use status::NodeStatus;
