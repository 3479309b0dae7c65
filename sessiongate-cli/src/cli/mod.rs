// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for SessionGate
//!
//! Offline administration of a node's config store: node settings,
//! config table rows, the cluster directory and a dry-run of startup
//! config application.

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
pub use handlers::{handle_config, handle_init, handle_inspect, handle_peers, InitArgs};
