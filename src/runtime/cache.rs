//! The condition-result cache (spec §4.3.4, §4.4, §9 "sharded concurrent
//! map keyed by a 128-bit content hash").
//!
//! Mirrors the teacher's `QueryCache` (`src/cache.rs`): a thread-safe
//! `HashMap` behind a lock, with the same clear-half eviction strategy,
//! keyed here by the condition subtree combined with table identity rather
//! than by raw SQL text.

use std::{
    collections::HashMap,
    hash::{DefaultHasher, Hash, Hasher},
    sync::RwLock
};

/// Thread-safe cache from a condition+table key to the resulting boolean
/// column. Bounded by entry count; evicts half the cache when full, same
/// as the teacher's query cache.
pub struct ConditionCache {
    entries:  RwLock<HashMap<u64, Vec<bool>>>,
    capacity: usize
}

impl ConditionCache {
    pub fn new(capacity: usize) -> Self {
        Self { entries: RwLock::new(HashMap::with_capacity(capacity)), capacity }
    }

    pub fn get(&self, key: u64) -> Option<Vec<bool>> {
        self.entries.read().ok()?.get(&key).cloned()
    }

    pub fn insert(&self, key: u64, column: Vec<bool>) {
        let Ok(mut entries) = self.entries.write() else { return };
        if entries.len() >= self.capacity {
            let stale: Vec<_> = entries.keys().take(self.capacity / 2).copied().collect();
            for key in stale {
                entries.remove(&key);
            }
        }
        entries.insert(key, column);
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Key derivation: a digest of the condition subtree's identity combined
/// with the table's identity, so cache entries never leak across tables
/// (spec §4.4).
pub fn cache_key(rule_id: &str, condition_path: &str, table_identity: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    rule_id.hash(&mut hasher);
    condition_path.hash(&mut hasher);
    table_identity.hash(&mut hasher);
    hasher.finish()
}

/// A cheap content digest of a table: row count plus a hash of each
/// column's values, used to invalidate cache entries when the working
/// table changes between phases (spec §4.4, §9).
pub fn table_identity(table: &crate::table::Table) -> u64 {
    let mut hasher = DefaultHasher::new();
    table.row_count().hash(&mut hasher);
    for name in table.column_names() {
        name.hash(&mut hasher);
        if let Some(column) = table.column(name) {
            for row in 0..column.len() {
                column.get_string(row).hash(&mut hasher);
            }
        }
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get_round_trips() {
        let cache = ConditionCache::new(16);
        cache.insert(42, vec![true, false, true]);
        assert_eq!(cache.get(42), Some(vec![true, false, true]));
    }

    #[test]
    fn evicts_half_when_full() {
        let cache = ConditionCache::new(4);
        for i in 0..4 {
            cache.insert(i, vec![true]);
        }
        assert_eq!(cache.len(), 4);
        cache.insert(100, vec![false]);
        assert!(cache.len() <= 3);
    }
}
