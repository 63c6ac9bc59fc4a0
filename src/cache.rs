//! Bounded TTL cache for upstream snapshots.
//!
//! Guarantees:
//! - Entries expire `ttl_ms` after insertion; expired entries are never
//!   returned.
//! - The clock is supplied by the caller, so tests drive expiry
//!   deterministically and the cache is owned per poller instance rather
//!   than living as a process-wide singleton.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;

pub struct TtlCache<K, V> {
    ttl_ms: i64,
    map: Mutex<HashMap<K, (i64, V)>>,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(ttl_ms: i64) -> Self {
        Self {
            ttl_ms,
            map: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a live entry, or `None` when missing or expired.
    pub fn get(&self, key: &K, now_ms: i64) -> Option<V> {
        let map = self.map.lock();
        let (inserted_ms, v) = map.get(key)?;
        if now_ms - inserted_ms >= self.ttl_ms {
            return None;
        }
        Some(v.clone())
    }

    pub fn insert(&self, key: K, value: V, now_ms: i64) {
        self.map.lock().insert(key, (now_ms, value));
    }

    /// Drops every expired entry. Called once per polling cycle to keep the
    /// map bounded by the working set.
    pub fn purge_expired(&self, now_ms: i64) {
        self.map
            .lock()
            .retain(|_, (inserted_ms, _)| now_ms - *inserted_ms < self.ttl_ms);
    }

    pub fn len(&self) -> usize {
        self.map.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.lock().is_empty()
    }
}
