// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Config table and node settings persisted in an embedded store

use super::entry::{normalize_category, ConfigEntry};
use super::settings::NodeSettings;
use super::source::ConfigSource;
use crate::error::{ConfigError, ConfigResult};
use crate::storage::{create_storage_driver, BoxedDriver, StorageTree, StorageType};
use std::path::Path;

const CONFIG_TREE: &str = "_configs";
const SETTINGS_TREE: &str = "_settings";
const SETTINGS_KEY: &[u8] = b"node";
const KEY_SEPARATOR: char = '\u{1f}';

/// Read/write access to the `_configs` and `_settings` trees
pub struct ConfigStore {
    driver: BoxedDriver,
    configs: Box<dyn StorageTree>,
    settings: Box<dyn StorageTree>,
}

impl ConfigStore {
    pub fn new(driver: BoxedDriver) -> ConfigResult<Self> {
        let configs = driver.open_tree(CONFIG_TREE)?;
        let settings = driver.open_tree(SETTINGS_TREE)?;
        Ok(Self {
            driver,
            configs,
            settings,
        })
    }

    /// Open a store of the given type rooted at `path`
    pub fn open<P: AsRef<Path>>(storage_type: StorageType, path: P) -> ConfigResult<Self> {
        let driver = create_storage_driver(storage_type, path)?;
        Self::new(driver)
    }

    /// Throwaway in-memory store
    pub fn in_memory() -> ConfigResult<Self> {
        Self::open(StorageType::Memory, "")
    }

    fn row_key(category: &str, key: &str) -> Vec<u8> {
        format!("{}{}{}", normalize_category(category), KEY_SEPARATOR, key).into_bytes()
    }

    /// Insert or overwrite a config row
    pub fn put(&self, entry: &ConfigEntry) -> ConfigResult<()> {
        let mut entry = entry.clone();
        entry.category = normalize_category(&entry.category);
        if entry.key.trim().is_empty() {
            return Err(ConfigError::invalid(&entry.category, &entry.key, "key is empty"));
        }
        let bytes = bincode::serialize(&entry)?;
        self.configs
            .insert(&Self::row_key(&entry.category, &entry.key), &bytes)?;
        self.configs.flush()?;
        Ok(())
    }

    /// Delete a config row; returns whether it existed
    pub fn remove(&self, category: &str, key: &str) -> ConfigResult<bool> {
        let removed = self.configs.remove(&Self::row_key(category, key))?;
        self.configs.flush()?;
        Ok(removed)
    }

    pub fn put_settings(&self, settings: &NodeSettings) -> ConfigResult<()> {
        let bytes = bincode::serialize(settings)?;
        self.settings.insert(SETTINGS_KEY, &bytes)?;
        self.settings.flush()?;
        Ok(())
    }

    pub fn flush(&self) -> ConfigResult<()> {
        self.driver.flush()?;
        Ok(())
    }
}

impl ConfigSource for ConfigStore {
    /// Every decodable row; undecodable rows are logged and skipped
    fn load_all(&self) -> ConfigResult<Vec<ConfigEntry>> {
        let mut rows = Vec::new();
        for (key, bytes) in self.configs.entries()? {
            match bincode::deserialize::<ConfigEntry>(&bytes) {
                Ok(entry) => rows.push(entry),
                Err(e) => log::warn!(
                    "Skipping undecodable config row {:?}: {}",
                    String::from_utf8_lossy(&key).replace(KEY_SEPARATOR, "/"),
                    ConfigError::from(e)
                ),
            }
        }
        Ok(rows)
    }

    fn load_settings(&self) -> ConfigResult<Option<NodeSettings>> {
        match self.settings.get(SETTINGS_KEY)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }
}
