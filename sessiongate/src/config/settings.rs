// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! This node's own settings record

use super::node_directory::NodeMode;
use serde::{Deserialize, Serialize};
use std::env;

pub const ENV_GATEWAY_IP: &str = "GATEWAY_IP";
pub const ENV_GATEWAY_HOST: &str = "GATEWAY_HOST";
pub const ENV_GATEWAY_PORT: &str = "GATEWAY_PORT";
pub const ENV_GATEWAY_DBMS: &str = "GATEWAY_DBMS";
pub const ENV_GATEWAY_SSL: &str = "GATEWAY_SSL";

/// Identity and listening address of the node running this gateway
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeSettings {
    pub node_number: u32,
    pub label: String,
    pub host: String,
    pub port: String,
    pub ip: String,
    pub mode: NodeMode,
    pub ssl: bool,
    pub dbms: String,
}

impl NodeSettings {
    pub fn new(node_number: u32, label: impl Into<String>) -> Self {
        Self {
            node_number,
            label: label.into(),
            ..Default::default()
        }
    }

    /// Fill empty fields from the `GATEWAY_*` environment variables
    ///
    /// Stored values always win. `GATEWAY_SSL` only turns SSL on.
    pub fn fill_from_env(&mut self) {
        fill(&mut self.ip, ENV_GATEWAY_IP);
        fill(&mut self.host, ENV_GATEWAY_HOST);
        fill(&mut self.port, ENV_GATEWAY_PORT);
        fill(&mut self.dbms, ENV_GATEWAY_DBMS);
        if !self.ssl {
            self.ssl = env::var(ENV_GATEWAY_SSL)
                .map(|v| parse_flag(&v))
                .unwrap_or(false);
        }
    }

    /// Public URL of this node
    pub fn url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        let host = if self.host.is_empty() { &self.ip } else { &self.host };
        if self.port.is_empty() {
            format!("{}://{}", scheme, host)
        } else {
            format!("{}://{}:{}", scheme, host, self.port)
        }
    }
}

fn fill(field: &mut String, var: &str) {
    if field.trim().is_empty() {
        if let Ok(value) = env::var(var) {
            *field = value.trim().to_string();
        }
    }
}

pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
