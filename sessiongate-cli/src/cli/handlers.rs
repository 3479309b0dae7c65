// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Command handlers operating on a node's config store

use super::commands::{ConfigAction, OutputFormat, PeerAction};
use super::output;
use colored::*;
use sessiongate::config::entry::CATEGORY_NODES;
use sessiongate::{
    ClusterStatusAggregator, ConfigApplier, ConfigEntry, ConfigRegistry, ConfigSource,
    ConfigStore, NodeContext, NodeDescriptor, NodeMode, NodeSettings, NodeStatus, RuntimeParams,
    StorageType,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("node already initialised at {0} (use --force to overwrite)")]
    AlreadyInitialized(PathBuf),

    #[error("node not initialised at {0}; run `sessiongate init` first")]
    NotInitialized(PathBuf),

    #[error("config row {0}/{1} not found")]
    RowNotFound(String, String),
}

/// Parameters for `init`
pub struct InitArgs {
    pub node_number: u32,
    pub label: String,
    pub host: String,
    pub port: String,
    pub ip: String,
    pub mode: NodeMode,
    pub ssl: bool,
    pub dbms: String,
    pub force: bool,
}

fn open_store(storage: StorageType, path: &Path) -> Result<ConfigStore, Box<dyn std::error::Error>> {
    log::debug!("Opening {} config store at {}", storage, path.display());
    Ok(ConfigStore::open(storage, path)?)
}

fn node_key(number: u32) -> String {
    format!("node_{}", number)
}

pub fn handle_init(storage: StorageType, path: &Path, args: InitArgs) -> CliResult {
    let store = open_store(storage, path)?;
    if store.load_settings()?.is_some() && !args.force {
        return Err(CliError::AlreadyInitialized(path.to_path_buf()).into());
    }

    let label = if args.label.is_empty() {
        format!("node-{}", args.node_number)
    } else {
        args.label
    };
    let settings = NodeSettings {
        node_number: args.node_number,
        label,
        host: args.host,
        port: args.port,
        ip: args.ip,
        mode: args.mode,
        ssl: args.ssl,
        dbms: args.dbms,
    };
    store.put_settings(&settings)?;
    store.flush()?;

    println!(
        "{} node {} ({}) at {}",
        "✅ Initialised".green(),
        settings.node_number,
        settings.label,
        path.display()
    );
    Ok(())
}

pub fn handle_config(storage: StorageType, path: &Path, action: ConfigAction) -> CliResult {
    let store = open_store(storage, path)?;
    match action {
        ConfigAction::Set {
            category,
            key,
            int_value,
            text_value,
        } => {
            let entry = ConfigEntry::new(category, key)
                .with_int(int_value)
                .with_text(text_value);
            if !ConfigRegistry::with_builtin().is_known(&entry.category, &entry.key) {
                println!(
                    "{}",
                    format!(
                        "⚠️  {}/{} is not a recognised row; it will be stored but ignored",
                        entry.category, entry.key
                    )
                    .yellow()
                );
            }
            store.put(&entry)?;
            println!("{} {}/{}", "✅ Set".green(), entry.category, entry.key);
        }
        ConfigAction::Unset { category, key } => {
            if !store.remove(&category, &key)? {
                return Err(CliError::RowNotFound(category, key).into());
            }
            println!("{} {}/{}", "✅ Removed".green(), category, key);
        }
        ConfigAction::List { format } => {
            let rows = store.load_all()?;
            println!("{}", output::format_rows(&rows, format));
        }
    }
    Ok(())
}

pub fn handle_peers(storage: StorageType, path: &Path, action: PeerAction) -> CliResult {
    let store = open_store(storage, path)?;
    match action {
        PeerAction::Add {
            number,
            host,
            address,
            mode,
        } => {
            let node = NodeDescriptor {
                node_number: number,
                host,
                address,
                mode,
            };
            // round-trip through the parser so only loadable rows are stored
            let text = node.to_string();
            text.parse::<NodeDescriptor>()?;
            store.put(&ConfigEntry::new(CATEGORY_NODES, node_key(number)).with_text(text))?;
            println!("{} node {}", "✅ Added".green(), node);
        }
        PeerAction::List { format } => {
            let mut applier = ConfigApplier::new(ConfigRegistry::with_builtin());
            applier.load_all(&store)?;
            let mut params = RuntimeParams::default();
            let report = applier.apply_all(&mut params);
            for err in &report.errors {
                eprintln!("{}", format!("⚠️  {}", err).yellow());
            }

            let nodes: Vec<NodeDescriptor> = params.node_directory.into_values().collect();
            let self_number = store.load_settings()?.map(|s| s.node_number);
            println!("{}", output::format_peers(&nodes, self_number, format));
        }
    }
    Ok(())
}

/// Apply the stored config exactly as startup would, without a backend
pub fn handle_inspect(storage: StorageType, path: &Path, format: OutputFormat) -> CliResult {
    let store = open_store(storage, path)?;
    let mut settings = store
        .load_settings()?
        .ok_or_else(|| CliError::NotInitialized(path.to_path_buf()))?;
    settings.fill_from_env();

    let mut applier = ConfigApplier::new(ConfigRegistry::with_builtin());
    applier.load_all(&store)?;
    let mut params = RuntimeParams::default();
    let report = applier.apply_all(&mut params);

    let context = NodeContext::new(settings, params.clone());
    ClusterStatusAggregator::default().refresh(&context);
    let status = NodeStatus::offline(&context);

    println!("{}", output::format_inspect(&status, &params, &report, format));
    Ok(())
}
