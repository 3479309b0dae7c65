// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Applies config rows to [`RuntimeParams`]

use super::entry::{ConfigEntry, ConfigSnapshot};
use super::params::RuntimeParams;
use super::registry::ConfigRegistry;
use super::source::ConfigSource;
use crate::error::{ConfigError, ConfigResult};

/// What a full application did, row by row
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// `(category, key)` rows that set a parameter
    pub applied: Vec<(String, String)>,
    /// Registered rows absent from the table, left at their default
    pub defaulted: Vec<(String, String)>,
    /// Rows no applier consumes
    pub ignored: Vec<(String, String)>,
    /// Malformed rows; the affected parameter fell back to its default
    pub errors: Vec<ConfigError>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

fn error_names(err: &ConfigError, category: &str, key: &str) -> bool {
    match err {
        ConfigError::Decode {
            category: c, key: k, ..
        }
        | ConfigError::InvalidValue {
            category: c, key: k, ..
        } => c == category && k == key,
        _ => false,
    }
}

/// Holds the last loaded config snapshot and applies it through a registry
pub struct ConfigApplier {
    registry: ConfigRegistry,
    snapshot: ConfigSnapshot,
}

impl Default for ConfigApplier {
    fn default() -> Self {
        Self::new(ConfigRegistry::with_builtin())
    }
}

impl ConfigApplier {
    pub fn new(registry: ConfigRegistry) -> Self {
        Self {
            registry,
            snapshot: ConfigSnapshot::default(),
        }
    }

    /// Applier over rows that did not come from a [`ConfigSource`]
    pub fn with_entries(registry: ConfigRegistry, entries: Vec<ConfigEntry>) -> Self {
        Self {
            registry,
            snapshot: ConfigSnapshot::from_entries(entries),
        }
    }

    /// Replace the snapshot with every row of `source`; returns the row count
    pub fn load_all(&mut self, source: &dyn ConfigSource) -> ConfigResult<usize> {
        let entries = source.load_all()?;
        self.snapshot = ConfigSnapshot::from_entries(entries);
        log::debug!("Loaded {} config rows", self.snapshot.len());
        Ok(self.snapshot.len())
    }

    pub fn snapshot(&self) -> &ConfigSnapshot {
        &self.snapshot
    }

    pub fn registry(&self) -> &ConfigRegistry {
        &self.registry
    }

    /// Apply a single row; `true` iff an explicit value was applied
    ///
    /// Unregistered rows are ignored. For a collection category the whole
    /// category is re-applied and the answer concerns `key` only.
    pub fn apply(&self, params: &mut RuntimeParams, category: &str, key: &str) -> bool {
        if let Some(apply) = self.registry.scalar(category, key) {
            return match apply(params, self.snapshot.get(category, key)) {
                Ok(applied) => applied,
                Err(err) => {
                    log::warn!("{}; using default", err);
                    // reset to the default the applier knows about
                    let _ = apply(params, None);
                    false
                }
            };
        }

        if let Some(apply) = self.registry.collection(category) {
            let rows: Vec<&ConfigEntry> = self.snapshot.category(category).collect();
            let outcome = apply(params, &rows);
            for err in &outcome.errors {
                log::warn!("{}; entry skipped", err);
            }
            return self.snapshot.get(category, key).is_some()
                && !outcome.errors.iter().any(|e| error_names(e, category, key));
        }

        log::debug!("No applier registered for {}/{}", category, key);
        false
    }

    /// Apply every registration in order
    ///
    /// Every applier runs whether or not its row exists, so applying the same
    /// snapshot twice produces identical parameters.
    pub fn apply_all(&self, params: &mut RuntimeParams) -> ApplyReport {
        let mut report = ApplyReport::default();

        for reg in self.registry.scalars() {
            let row = self.snapshot.get(&reg.category, &reg.key);
            let id = (reg.category.clone(), reg.key.clone());
            match (reg.apply)(params, row) {
                Ok(true) => report.applied.push(id),
                Ok(false) => report.defaulted.push(id),
                Err(err) => {
                    log::warn!("{}; using default", err);
                    let _ = (reg.apply)(params, None);
                    report.errors.push(err);
                }
            }
        }

        for reg in self.registry.collections() {
            let rows: Vec<&ConfigEntry> = self.snapshot.category(&reg.category).collect();
            let outcome = (reg.apply)(params, &rows);
            for row in &rows {
                if !outcome
                    .errors
                    .iter()
                    .any(|e| error_names(e, &row.category, &row.key))
                {
                    report.applied.push((row.category.clone(), row.key.clone()));
                }
            }
            for err in outcome.errors {
                log::warn!("{}; entry skipped", err);
                report.errors.push(err);
            }
        }

        for entry in self.snapshot.entries() {
            if !self.registry.is_known(&entry.category, &entry.key) {
                log::debug!("Ignoring unrecognised config row {}/{}", entry.category, entry.key);
                report.ignored.push((entry.category.clone(), entry.key.clone()));
            }
        }

        if params.token_ttl >= params.refresh_ttl {
            log::warn!(
                "Access token TTL ({:?}) is not shorter than refresh TTL ({:?})",
                params.token_ttl,
                params.refresh_ttl
            );
        }

        log::debug!(
            "Config applied: {} set, {} default, {} ignored, {} rejected",
            report.applied.len(),
            report.defaulted.len(),
            report.ignored.len(),
            report.errors.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::entry::*;
    use crate::config::params::{minutes, DEFAULT_MAX_POOL};

    fn applier(entries: Vec<ConfigEntry>) -> ConfigApplier {
        ConfigApplier::with_entries(ConfigRegistry::with_builtin(), entries)
    }

    #[test]
    fn test_empty_table_yields_defaults() {
        let mut params = RuntimeParams::default();
        params.max_pool = 3;
        let report = applier(vec![]).apply_all(&mut params);
        assert_eq!(params, RuntimeParams::default());
        assert!(report.applied.is_empty());
        assert_eq!(report.defaulted.len(), 5);
    }

    #[test]
    fn test_apply_single_row() {
        let applier = applier(vec![
            ConfigEntry::new(CATEGORY_TOKEN, KEY_TOKEN_EXP).with_int(5),
        ]);
        let mut params = RuntimeParams::default();
        assert!(applier.apply(&mut params, CATEGORY_TOKEN, KEY_TOKEN_EXP));
        assert_eq!(params.token_ttl, minutes(5));
        assert!(!applier.apply(&mut params, CATEGORY_TOKEN, KEY_REFRESH_EXP));
        assert!(!applier.apply(&mut params, "misc", "whatever"));
    }

    #[test]
    fn test_invalid_row_falls_back_to_default() {
        let applier = applier(vec![
            ConfigEntry::new(CATEGORY_CONNECTION, KEY_MAX_POOL).with_int(-1),
        ]);
        let mut params = RuntimeParams::default();
        params.max_pool = 7;
        assert!(!applier.apply(&mut params, CATEGORY_CONNECTION, KEY_MAX_POOL));
        assert_eq!(params.max_pool, DEFAULT_MAX_POOL);

        let report = applier.apply_all(&mut params);
        assert_eq!(report.errors.len(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_unknown_rows_are_ignored() {
        let applier = applier(vec![
            ConfigEntry::new("", "motd").with_text("hi"),
            ConfigEntry::new(CATEGORY_TOKEN, "token_color").with_text("blue"),
        ]);
        let mut params = RuntimeParams::default();
        let report = applier.apply_all(&mut params);
        assert_eq!(report.ignored.len(), 2);
        assert_eq!(params, RuntimeParams::default());
    }

    #[test]
    fn test_node_rows_apply_individually() {
        let applier = applier(vec![
            ConfigEntry::new(CATEGORY_NODES, "node_1").with_text("1|a|10.0.0.1|rw"),
            ConfigEntry::new(CATEGORY_NODES, "node_2").with_text("2|b|10.0.0.2"),
        ]);
        let mut params = RuntimeParams::default();
        assert!(applier.apply(&mut params, CATEGORY_NODES, "node_1"));
        assert!(!applier.apply(&mut params, CATEGORY_NODES, "node_2"));
        assert_eq!(params.node_directory.len(), 1);
    }
}
