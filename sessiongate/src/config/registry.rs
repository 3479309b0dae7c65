// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Table of config appliers
//!
//! A scalar applier owns one `(category, key)` row and one runtime parameter.
//! It is called with the row when present and with `None` otherwise, and must
//! leave the parameter at its default in the `None` case. A collection
//! applier owns a whole category (the `nodes` directory) and sees every row
//! of it at once.

use super::entry::*;
use super::node_directory::NodeDescriptor;
use super::params::{
    minutes, RuntimeParams, DEFAULT_MAX_POOL, DEFAULT_REFRESH_TTL_MINUTES,
    DEFAULT_TOKEN_TTL_MINUTES, DEFAULT_TTL_TICK_MINUTES,
};
use crate::error::ConfigError;
use std::collections::BTreeMap;
use std::time::Duration;

/// Sets one parameter; `Ok(true)` iff an explicit value was applied
pub type ScalarApplier =
    fn(&mut RuntimeParams, Option<&ConfigEntry>) -> Result<bool, ConfigError>;

/// Rebuilds a parameter from every row of one category
pub type CollectionApplier = fn(&mut RuntimeParams, &[&ConfigEntry]) -> CollectionOutcome;

/// Result of a collection applier: rows applied plus rows rejected
#[derive(Debug, Default)]
pub struct CollectionOutcome {
    pub applied: usize,
    pub errors: Vec<ConfigError>,
}

#[derive(Clone)]
pub(crate) struct ScalarRegistration {
    pub category: String,
    pub key: String,
    pub apply: ScalarApplier,
}

#[derive(Clone)]
pub(crate) struct CollectionRegistration {
    pub category: String,
    pub apply: CollectionApplier,
}

/// Registered appliers, kept in registration order
#[derive(Clone)]
pub struct ConfigRegistry {
    scalars: Vec<ScalarRegistration>,
    collections: Vec<CollectionRegistration>,
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl ConfigRegistry {
    /// A registry with nothing registered
    pub fn empty() -> Self {
        Self {
            scalars: Vec::new(),
            collections: Vec::new(),
        }
    }

    /// The gateway's own parameters
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        registry.register_scalar(CATEGORY_CONNECTION, KEY_POOL_ON, apply_pool_on);
        registry.register_scalar(CATEGORY_CONNECTION, KEY_MAX_POOL, apply_max_pool);
        registry.register_scalar(CATEGORY_TOKEN, KEY_TOKEN_EXP, apply_token_exp);
        registry.register_scalar(CATEGORY_TOKEN, KEY_REFRESH_EXP, apply_refresh_exp);
        registry.register_scalar(CATEGORY_TOKEN, KEY_TOKEN_TTL, apply_token_ttl);
        registry.register_collection(CATEGORY_NODES, apply_node_directory);
        registry
    }

    /// Register (or replace) the applier for one row
    pub fn register_scalar(&mut self, category: &str, key: &str, apply: ScalarApplier) {
        let category = normalize_category(category);
        if let Some(existing) = self
            .scalars
            .iter_mut()
            .find(|r| r.category == category && r.key == key)
        {
            existing.apply = apply;
            return;
        }
        self.scalars.push(ScalarRegistration {
            category,
            key: key.to_string(),
            apply,
        });
    }

    /// Register (or replace) the applier for a whole category
    pub fn register_collection(&mut self, category: &str, apply: CollectionApplier) {
        let category = normalize_category(category);
        if let Some(existing) = self.collections.iter_mut().find(|r| r.category == category) {
            existing.apply = apply;
            return;
        }
        self.collections.push(CollectionRegistration { category, apply });
    }

    pub(crate) fn scalar(&self, category: &str, key: &str) -> Option<ScalarApplier> {
        self.scalars
            .iter()
            .find(|r| r.category == category && r.key == key)
            .map(|r| r.apply)
    }

    pub(crate) fn collection(&self, category: &str) -> Option<CollectionApplier> {
        self.collections
            .iter()
            .find(|r| r.category == category)
            .map(|r| r.apply)
    }

    pub(crate) fn scalars(&self) -> &[ScalarRegistration] {
        &self.scalars
    }

    pub(crate) fn collections(&self) -> &[CollectionRegistration] {
        &self.collections
    }

    /// Whether some applier consumes this row
    pub fn is_known(&self, category: &str, key: &str) -> bool {
        self.scalar(category, key).is_some() || self.collection(category).is_some()
    }
}

fn positive_minutes(entry: &ConfigEntry) -> Result<Duration, ConfigError> {
    if entry.int_value <= 0 {
        return Err(ConfigError::invalid(
            &entry.category,
            &entry.key,
            format!("expected a positive number of minutes, got {}", entry.int_value),
        ));
    }
    Ok(minutes(entry.int_value as u64))
}

fn apply_minutes(
    slot: &mut Duration,
    entry: Option<&ConfigEntry>,
    default_minutes: u64,
) -> Result<bool, ConfigError> {
    *slot = minutes(default_minutes);
    match entry {
        Some(entry) => {
            *slot = positive_minutes(entry)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn apply_token_exp(params: &mut RuntimeParams, entry: Option<&ConfigEntry>) -> Result<bool, ConfigError> {
    apply_minutes(&mut params.token_ttl, entry, DEFAULT_TOKEN_TTL_MINUTES)
}

fn apply_refresh_exp(params: &mut RuntimeParams, entry: Option<&ConfigEntry>) -> Result<bool, ConfigError> {
    apply_minutes(&mut params.refresh_ttl, entry, DEFAULT_REFRESH_TTL_MINUTES)
}

fn apply_token_ttl(params: &mut RuntimeParams, entry: Option<&ConfigEntry>) -> Result<bool, ConfigError> {
    apply_minutes(&mut params.ttl_tick, entry, DEFAULT_TTL_TICK_MINUTES)
}

fn apply_pool_on(params: &mut RuntimeParams, entry: Option<&ConfigEntry>) -> Result<bool, ConfigError> {
    match entry {
        Some(entry) => {
            params.pool_enabled = entry.is_truthy();
            Ok(true)
        }
        None => {
            params.pool_enabled = true;
            Ok(false)
        }
    }
}

fn apply_max_pool(params: &mut RuntimeParams, entry: Option<&ConfigEntry>) -> Result<bool, ConfigError> {
    params.max_pool = DEFAULT_MAX_POOL;
    let Some(entry) = entry else {
        return Ok(false);
    };
    if entry.int_value < 0 {
        return Err(ConfigError::invalid(
            &entry.category,
            &entry.key,
            format!("pool size cannot be negative, got {}", entry.int_value),
        ));
    }
    params.max_pool = entry.int_value as usize;
    if params.max_pool == 0 {
        params.pool_enabled = false;
    }
    Ok(true)
}

fn apply_node_directory(params: &mut RuntimeParams, rows: &[&ConfigEntry]) -> CollectionOutcome {
    let mut outcome = CollectionOutcome::default();
    let mut directory = BTreeMap::new();
    for row in rows {
        match row.text_value.parse::<NodeDescriptor>() {
            Ok(node) => {
                if let Some(previous) = directory.insert(node.node_number, node) {
                    log::warn!(
                        "node {} listed twice in config; keeping nodes/{}",
                        previous.node_number,
                        row.key
                    );
                }
                outcome.applied += 1;
            }
            Err(reason) => outcome
                .errors
                .push(ConfigError::decode(&row.category, &row.key, reason)),
        }
    }
    params.node_directory = directory;
    outcome
}
