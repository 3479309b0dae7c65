// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Sharded map with per-entry time-to-live
//!
//! Keys are spread over a fixed number of partitions, each behind its own
//! `RwLock`, so operations on different keys rarely contend and no operation
//! ever holds more than two partition locks. Expired entries stay in place
//! (invisible to `get`) until [`TtlMap::purge_expired`] removes them and hands
//! them back to the caller, which lets owners of resources (pooled connections)
//! release them explicitly instead of relying on drop.

use parking_lot::RwLock;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Default number of lock partitions
pub const DEFAULT_SHARDS: usize = 16;

#[derive(Debug)]
struct TtlEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> TtlEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Value removed by [`TtlMap::remove`]
#[derive(Debug)]
pub struct Removed<V> {
    pub value: V,
    /// The entry had already outlived its TTL when it was removed
    pub expired: bool,
}

/// Outcome of [`TtlMap::rename`]
#[derive(Debug)]
pub enum Rename<V> {
    /// The entry now lives under the new key
    Moved,
    /// The entry moved and replaced a value already stored under the new key
    Displaced(V),
    /// The old key was absent or already expired; nothing changed
    Missing,
}

type Shard<V> = RwLock<HashMap<String, TtlEntry<V>>>;

/// Concurrent string-keyed map whose entries expire
pub struct TtlMap<V> {
    shards: Box<[Shard<V>]>,
    len: AtomicUsize,
}

impl<V: Clone> Default for TtlMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> TtlMap<V> {
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    /// Create a map with `shards` lock partitions (at least one)
    pub fn with_shards(shards: usize) -> Self {
        let shards = (0..shards.max(1))
            .map(|_| RwLock::new(HashMap::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            shards,
            len: AtomicUsize::new(0),
        }
    }

    fn shard_index(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }

    fn shard(&self, key: &str) -> &Shard<V> {
        &self.shards[self.shard_index(key)]
    }

    /// Insert `value` under `key` for `ttl`, returning any value it replaced
    pub fn put(&self, key: impl Into<String>, ttl: Duration, value: V) -> Option<V> {
        let key = key.into();
        let previous = self
            .shard(&key)
            .write()
            .insert(key, TtlEntry::new(value, ttl));
        match previous {
            Some(entry) => Some(entry.value),
            None => {
                self.len.fetch_add(1, Ordering::AcqRel);
                None
            }
        }
    }

    /// Live value for `key`; expired entries read as absent
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        self.shard(key)
            .read()
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.value.clone())
    }

    /// Swap the value of a live entry for `value` with a fresh `ttl`
    ///
    /// Returns the previous value, or hands `value` back when `key` is absent
    /// or expired. Never creates an entry.
    pub fn replace_live(&self, key: &str, ttl: Duration, value: V) -> Result<V, V> {
        let mut shard = self.shard(key).write();
        match shard.get_mut(key) {
            Some(entry) if !entry.is_expired_at(Instant::now()) => {
                let previous = std::mem::replace(entry, TtlEntry::new(value, ttl));
                Ok(previous.value)
            }
            _ => Err(value),
        }
    }

    /// Time left before `key` expires, if it is live
    pub fn expires_in(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.shard(key)
            .read()
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.expires_at - now)
    }

    /// Remove `key` whether or not it has expired
    pub fn remove(&self, key: &str) -> Option<Removed<V>> {
        let now = Instant::now();
        let entry = self.shard(key).write().remove(key)?;
        self.len.fetch_sub(1, Ordering::AcqRel);
        Some(Removed {
            expired: entry.is_expired_at(now),
            value: entry.value,
        })
    }

    /// Remove `key` only if its current value satisfies `pred`
    pub fn remove_if(&self, key: &str, pred: impl FnOnce(&V) -> bool) -> Option<V> {
        let mut shard = self.shard(key).write();
        if !shard.get(key).is_some_and(|entry| pred(&entry.value)) {
            return None;
        }
        let entry = shard.remove(key)?;
        self.len.fetch_sub(1, Ordering::AcqRel);
        Some(entry.value)
    }

    /// Move a live entry from `old` to `new` with a fresh `ttl`
    ///
    /// Both partitions are locked (in index order) for the whole move, so a
    /// concurrent purge either sees the entry under `old` before the move or
    /// under `new` after it, never neither.
    pub fn rename(&self, old: &str, new: impl Into<String>, ttl: Duration) -> Rename<V> {
        let new = new.into();
        if old == new {
            return match self.shard(old).write().get_mut(old) {
                Some(entry) if !entry.is_expired_at(Instant::now()) => {
                    entry.expires_at = Instant::now() + ttl;
                    Rename::Moved
                }
                _ => Rename::Missing,
            };
        }

        let old_idx = self.shard_index(old);
        let new_idx = self.shard_index(&new);
        let now = Instant::now();

        if old_idx == new_idx {
            let mut shard = self.shards[old_idx].write();
            match shard.get(old) {
                Some(entry) if !entry.is_expired_at(now) => {}
                _ => return Rename::Missing,
            }
            let Some(entry) = shard.remove(old) else {
                return Rename::Missing;
            };
            let displaced = shard.insert(new, TtlEntry::new(entry.value, ttl));
            return self.settle_rename(displaced);
        }

        let (first, second) = if old_idx < new_idx {
            (old_idx, new_idx)
        } else {
            (new_idx, old_idx)
        };
        let mut first_guard = self.shards[first].write();
        let mut second_guard = self.shards[second].write();
        let (old_shard, new_shard) = if old_idx == first {
            (&mut *first_guard, &mut *second_guard)
        } else {
            (&mut *second_guard, &mut *first_guard)
        };

        match old_shard.get(old) {
            Some(entry) if !entry.is_expired_at(now) => {}
            _ => return Rename::Missing,
        }
        let Some(entry) = old_shard.remove(old) else {
            return Rename::Missing;
        };
        let displaced = new_shard.insert(new, TtlEntry::new(entry.value, ttl));
        self.settle_rename(displaced)
    }

    fn settle_rename(&self, displaced: Option<TtlEntry<V>>) -> Rename<V> {
        match displaced {
            Some(entry) => {
                // two keys collapsed into one
                self.len.fetch_sub(1, Ordering::AcqRel);
                Rename::Displaced(entry.value)
            }
            None => Rename::Moved,
        }
    }

    /// Number of stored entries, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every expired entry and return it to the caller
    pub fn purge_expired(&self) -> Vec<(String, V)> {
        let mut purged = Vec::new();
        for shard in self.shards.iter() {
            let now = Instant::now();
            let mut guard = shard.write();
            let expired: Vec<String> = guard
                .iter()
                .filter(|(_, entry)| entry.is_expired_at(now))
                .map(|(key, _)| key.clone())
                .collect();
            for key in expired {
                if let Some(entry) = guard.remove(&key) {
                    purged.push((key, entry.value));
                }
            }
        }
        if !purged.is_empty() {
            self.len.fetch_sub(purged.len(), Ordering::AcqRel);
        }
        purged
    }

    /// Remove every entry, live or not
    pub fn drain(&self) -> Vec<(String, V)> {
        let mut drained = Vec::new();
        for shard in self.shards.iter() {
            drained.extend(
                shard
                    .write()
                    .drain()
                    .map(|(key, entry)| (key, entry.value)),
            );
        }
        if !drained.is_empty() {
            self.len.fetch_sub(drained.len(), Ordering::AcqRel);
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    const SHORT: Duration = Duration::from_millis(30);
    const LONG: Duration = Duration::from_secs(60);

    #[test]
    fn test_put_get_remove() {
        let map = TtlMap::new();
        assert!(map.put("a", LONG, 1).is_none());
        assert_eq!(map.put("a", LONG, 2), Some(1));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("a"), Some(2));

        let removed = map.remove("a").unwrap();
        assert_eq!(removed.value, 2);
        assert!(!removed.expired);
        assert!(map.is_empty());
        assert!(map.remove("a").is_none());
    }

    #[test]
    fn test_expired_entries_are_invisible_until_purged() {
        let map = TtlMap::new();
        map.put("short", SHORT, "s");
        map.put("long", LONG, "l");
        thread::sleep(SHORT * 2);

        assert_eq!(map.get("short"), None);
        assert_eq!(map.len(), 2);

        let purged = map.purge_expired();
        assert_eq!(purged, vec![("short".to_string(), "s")]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("long"), Some("l"));
    }

    #[test]
    fn test_remove_reports_expiry() {
        let map = TtlMap::new();
        map.put("k", SHORT, 7);
        thread::sleep(SHORT * 2);
        let removed = map.remove("k").unwrap();
        assert!(removed.expired);
        assert_eq!(removed.value, 7);
    }

    #[test]
    fn test_rename_moves_value_and_resets_ttl() {
        let map = TtlMap::new();
        map.put("old", Duration::from_millis(200), 42);
        thread::sleep(Duration::from_millis(50));

        assert!(matches!(map.rename("old", "new", LONG), Rename::Moved));
        assert_eq!(map.get("old"), None);
        assert_eq!(map.get("new"), Some(42));
        assert_eq!(map.len(), 1);
        assert!(map.expires_in("new").unwrap() > Duration::from_secs(59));
    }

    #[test]
    fn test_rename_of_missing_or_expired_is_noop() {
        let map: TtlMap<i32> = TtlMap::new();
        assert!(matches!(map.rename("ghost", "new", LONG), Rename::Missing));

        map.put("old", SHORT, 1);
        thread::sleep(SHORT * 2);
        assert!(matches!(map.rename("old", "new", LONG), Rename::Missing));
        // left behind for the purge
        assert_eq!(map.len(), 1);
        assert_eq!(map.purge_expired().len(), 1);
    }

    #[test]
    fn test_rename_onto_existing_key_displaces() {
        let map = TtlMap::with_shards(1);
        map.put("a", LONG, 1);
        map.put("b", LONG, 2);
        match map.rename("a", "b", LONG) {
            Rename::Displaced(v) => assert_eq!(v, 2),
            other => panic!("expected displacement, got {:?}", other),
        }
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("b"), Some(1));
    }

    #[test]
    fn test_replace_live_never_inserts() {
        let map = TtlMap::new();
        assert_eq!(map.replace_live("k", LONG, 1), Err(1));
        assert!(map.is_empty());

        map.put("k", LONG, 1);
        assert_eq!(map.replace_live("k", LONG, 2), Ok(1));
        assert_eq!(map.get("k"), Some(2));
        assert_eq!(map.len(), 1);

        map.put("gone", Duration::ZERO, 3);
        assert_eq!(map.replace_live("gone", LONG, 4), Err(4));
    }

    #[test]
    fn test_remove_if_checks_current_value() {
        let map = TtlMap::new();
        map.put("k", LONG, 1);
        assert_eq!(map.remove_if("k", |v| *v == 2), None);
        assert_eq!(map.len(), 1);
        assert_eq!(map.remove_if("k", |v| *v == 1), Some(1));
        assert!(map.is_empty());
        assert_eq!(map.remove_if("k", |_| true), None);
    }

    #[test]
    fn test_rename_racing_purge_loses_nothing() {
        for _ in 0..100 {
            let map = Arc::new(TtlMap::new());
            for i in 0..32 {
                map.put(format!("old{}", i), Duration::from_millis(2), i);
            }
            thread::sleep(Duration::from_millis(1));

            let purger = {
                let map = map.clone();
                thread::spawn(move || {
                    let mut purged = Vec::new();
                    for _ in 0..50 {
                        purged.extend(map.purge_expired().into_iter().map(|(_, v)| v));
                    }
                    purged
                })
            };
            let moved: Vec<i32> = (0..32)
                .filter(|i| {
                    matches!(
                        map.rename(&format!("old{}", i), format!("new{}", i), LONG),
                        Rename::Moved
                    )
                })
                .collect();
            let mut purged = purger.join().unwrap();
            purged.extend(map.purge_expired().into_iter().map(|(_, v)| v));

            // every value is either moved or purged, never both
            for i in &moved {
                assert!(!purged.contains(i));
                assert_eq!(map.get(&format!("new{}", i)), Some(*i));
            }
            assert_eq!(moved.len() + purged.len(), 32);
            assert_eq!(map.len(), moved.len());
        }
    }

    #[test]
    fn test_drain_empties_every_shard() {
        let map = TtlMap::new();
        for i in 0..100 {
            map.put(format!("k{}", i), LONG, i);
        }
        assert_eq!(map.drain().len(), 100);
        assert!(map.is_empty());
    }

    #[test]
    fn test_concurrent_remove_has_single_winner() {
        let map = Arc::new(TtlMap::new());
        map.put("once", LONG, ());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let map = map.clone();
                thread::spawn(move || map.remove("once").is_some())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert!(map.is_empty());
    }

    #[test]
    fn test_concurrent_renames_across_shards_keep_len() {
        let map = Arc::new(TtlMap::new());
        for i in 0..64 {
            map.put(format!("k{}", i), LONG, i);
        }
        let handles: Vec<_> = (0..64)
            .map(|i| {
                let map = map.clone();
                thread::spawn(move || {
                    map.rename(&format!("k{}", i), format!("r{}", i), LONG);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(map.len(), 64);
        assert!((0..64).all(|i| map.get(&format!("r{}", i)) == Some(i)));
    }
}
