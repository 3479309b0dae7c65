// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Cluster member descriptors stored under the `nodes` category
//!
//! Each row's text value has the form `number|host|address|mode`, for example
//! `2|db-2.internal|10.0.0.12|rw`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const FIELD_SEPARATOR: char = '|';
const FIELD_COUNT: usize = 4;

/// What a node serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeMode {
    Read,
    Write,
    #[default]
    ReadWrite,
    Backup,
}

impl NodeMode {
    pub fn as_short(&self) -> &'static str {
        match self {
            NodeMode::Read => "r",
            NodeMode::Write => "w",
            NodeMode::ReadWrite => "rw",
            NodeMode::Backup => "b",
        }
    }
}

impl fmt::Display for NodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_short())
    }
}

impl FromStr for NodeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "r" | "read" => Ok(NodeMode::Read),
            "w" | "write" => Ok(NodeMode::Write),
            "rw" | "readwrite" | "read-write" => Ok(NodeMode::ReadWrite),
            "b" | "backup" => Ok(NodeMode::Backup),
            other => Err(format!("unknown node mode '{}'", other)),
        }
    }
}

/// One member of the cluster as described by the config table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub node_number: u32,
    pub host: String,
    pub address: String,
    pub mode: NodeMode,
}

impl fmt::Display for NodeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}",
            self.node_number, self.host, self.address, self.mode
        )
    }
}

impl FromStr for NodeDescriptor {
    type Err = String;

    /// Parse `number|host|address|mode`; anything but exactly four fields is rejected
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(FIELD_SEPARATOR).map(str::trim).collect();
        if fields.len() != FIELD_COUNT {
            return Err(format!(
                "expected {} fields, found {}",
                FIELD_COUNT,
                fields.len()
            ));
        }

        let node_number = fields[0]
            .parse::<u32>()
            .map_err(|_| format!("node number '{}' is not a non-negative integer", fields[0]))?;
        if fields[1].is_empty() {
            return Err("host is empty".to_string());
        }
        let mode = fields[3].parse::<NodeMode>()?;

        Ok(NodeDescriptor {
            node_number,
            host: fields[1].to_string(),
            address: fields[2].to_string(),
            mode,
        })
    }
}
