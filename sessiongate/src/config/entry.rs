// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Config table rows and the in-memory snapshot built from them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const CATEGORY_TOKEN: &str = "token";
pub const CATEGORY_CONNECTION: &str = "connection";
pub const CATEGORY_NODES: &str = "nodes";
/// Rows stored without a category end up here
pub const CATEGORY_NONE: &str = "nocategory";

pub const KEY_TOKEN_EXP: &str = "token_exp";
pub const KEY_REFRESH_EXP: &str = "refresh_exp";
pub const KEY_TOKEN_TTL: &str = "token_ttl";
pub const KEY_POOL_ON: &str = "pool_on";
pub const KEY_MAX_POOL: &str = "max_pool";

/// One `(category, key)` row of the config table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub category: String,
    pub key: String,
    pub int_value: i64,
    pub text_value: String,
}

impl ConfigEntry {
    pub fn new(category: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            category: normalize_category(&category.into()),
            key: key.into(),
            int_value: 0,
            text_value: String::new(),
        }
    }

    pub fn with_int(mut self, value: i64) -> Self {
        self.int_value = value;
        self
    }

    pub fn with_text(mut self, value: impl Into<String>) -> Self {
        self.text_value = value.into();
        self
    }

    /// Boolean reading of a flag row: `int_value == 1` or text `true`
    pub fn is_truthy(&self) -> bool {
        self.int_value == 1 || self.text_value.trim().eq_ignore_ascii_case("true")
    }
}

pub(crate) fn normalize_category(category: &str) -> String {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        CATEGORY_NONE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Config rows indexed by category, then key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSnapshot {
    categories: BTreeMap<String, BTreeMap<String, ConfigEntry>>,
}

impl ConfigSnapshot {
    pub fn from_entries(entries: impl IntoIterator<Item = ConfigEntry>) -> Self {
        let mut snapshot = Self::default();
        for entry in entries {
            snapshot.insert(entry);
        }
        snapshot
    }

    /// Insert a row; a later row with the same `(category, key)` wins
    pub fn insert(&mut self, mut entry: ConfigEntry) {
        entry.category = normalize_category(&entry.category);
        self.categories
            .entry(entry.category.clone())
            .or_default()
            .insert(entry.key.clone(), entry);
    }

    pub fn get(&self, category: &str, key: &str) -> Option<&ConfigEntry> {
        self.categories.get(category)?.get(key)
    }

    /// Every row of a category, in key order
    pub fn category(&self, category: &str) -> impl Iterator<Item = &ConfigEntry> {
        self.categories
            .get(category)
            .into_iter()
            .flat_map(|keys| keys.values())
    }

    pub fn entries(&self) -> impl Iterator<Item = &ConfigEntry> {
        self.categories.values().flat_map(|keys| keys.values())
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_category_is_normalized() {
        let snapshot = ConfigSnapshot::from_entries(vec![ConfigEntry {
            category: "  ".into(),
            key: "motd".into(),
            int_value: 0,
            text_value: "hello".into(),
        }]);
        assert_eq!(
            snapshot.get(CATEGORY_NONE, "motd").map(|e| e.text_value.as_str()),
            Some("hello")
        );
    }

    #[test]
    fn test_later_row_wins() {
        let snapshot = ConfigSnapshot::from_entries(vec![
            ConfigEntry::new(CATEGORY_TOKEN, KEY_TOKEN_EXP).with_int(10),
            ConfigEntry::new(CATEGORY_TOKEN, KEY_TOKEN_EXP).with_int(20),
        ]);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get(CATEGORY_TOKEN, KEY_TOKEN_EXP).unwrap().int_value, 20);
    }

    #[test]
    fn test_truthy_flag() {
        let row = ConfigEntry::new(CATEGORY_CONNECTION, KEY_POOL_ON);
        assert!(!row.is_truthy());
        assert!(row.clone().with_int(1).is_truthy());
        assert!(row.clone().with_text("TRUE").is_truthy());
        assert!(!row.with_int(2).is_truthy());
    }
}
