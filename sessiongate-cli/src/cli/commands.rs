// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command definitions for SessionGate

use clap::{Parser, Subcommand, ValueEnum};
use sessiongate::{NodeMode, StorageType};
use std::path::PathBuf;

/// Log level options
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only errors
    Error,
    /// Warnings and errors
    Warn,
    /// Info, warnings, and errors
    Info,
    /// Debug messages and above (verbose)
    Debug,
    /// All messages including trace (very verbose)
    Trace,
    /// Disable all logging
    Off,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// SessionGate admin CLI - node settings and config table
#[derive(Parser)]
#[command(name = "sessiongate")]
#[command(about = "SessionGate - session and connection gateway administration")]
#[command(version)]
pub struct Cli {
    /// Data directory of the node's config store
    #[arg(long, global = true, default_value = "./gateway-data")]
    pub path: PathBuf,

    /// Storage engine (sled, memory)
    #[arg(long, global = true, default_value = "sled")]
    pub storage: StorageType,

    /// Set log level (error, warn, info, debug, trace, off)
    #[arg(short = 'l', long = "log-level", global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Verbose mode (equivalent to --log-level debug)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show version information
    Version,

    /// Write this node's settings record
    Init {
        /// Node number (1 is the designated leader)
        #[arg(long)]
        node_number: u32,

        /// Human-readable node label
        #[arg(long, default_value = "")]
        label: String,

        #[arg(long, default_value = "")]
        host: String,

        #[arg(long, default_value = "")]
        port: String,

        #[arg(long, default_value = "")]
        ip: String,

        /// Node mode (r, w, rw, b)
        #[arg(long, default_value = "rw")]
        mode: NodeMode,

        /// Serve over HTTPS
        #[arg(long)]
        ssl: bool,

        /// Backend engine name
        #[arg(long, default_value = "")]
        dbms: String,

        /// Overwrite existing settings
        #[arg(short, long)]
        force: bool,
    },

    /// Manage config table rows
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Manage the cluster node directory
    Peers {
        #[command(subcommand)]
        action: PeerAction,
    },

    /// Apply the stored config offline and show the resulting node view
    Inspect {
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

/// Config table subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Insert or overwrite a row
    Set {
        category: String,
        key: String,

        /// Integer value
        #[arg(long = "int", default_value_t = 0, allow_negative_numbers = true)]
        int_value: i64,

        /// Text value
        #[arg(long = "text", default_value = "")]
        text_value: String,
    },

    /// Delete a row
    Unset { category: String, key: String },

    /// Show every row
    List {
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

/// Node directory subcommands
#[derive(Subcommand)]
pub enum PeerAction {
    /// Add or replace a cluster member
    Add {
        number: u32,
        host: String,
        address: String,

        /// Node mode (r, w, rw, b)
        #[arg(default_value = "rw")]
        mode: NodeMode,
    },

    /// Show the cluster members
    List {
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}
