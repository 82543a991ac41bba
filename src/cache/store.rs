//! Tag-aware cache backend.
//!
//! The backend contract mirrors what a CMS cache bin provides: keyed get and
//! set with invalidation tags and a maximum lifetime, plus tag-based mass
//! invalidation. [`MemoryCacheStore`] is the bundled implementation, used by
//! tests and the CLI; production hosts adapt their own bin.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::model::MaxAge;

/// Generic tag-aware cache backend.
pub trait CacheStore: Send + Sync {
    /// Fetch a raw entry; `None` when absent, invalidated or expired.
    fn get(&self, key: &str) -> Option<String>;

    /// Store an entry with its invalidation tags and lifetime.
    fn set(&self, key: &str, value: String, tags: &[String], max_age: MaxAge);

    /// Remove a single entry.
    fn delete(&self, key: &str);

    /// Invalidate every entry carrying any of the given tags.
    fn invalidate_tags(&self, tags: &[String]);
}

struct Entry {
    value: String,
    tags: HashSet<String>,
    expires_at: Option<Instant>,
}

/// In-memory tag-aware store.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries, for tests and diagnostics.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let expired = entries
            .get(key)
            .is_some_and(|e| e.expires_at.is_some_and(|at| Instant::now() >= at));
        if expired {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|e| e.value.clone())
    }

    fn set(&self, key: &str, value: String, tags: &[String], max_age: MaxAge) {
        let expires_at = match max_age {
            MaxAge::Permanent => None,
            MaxAge::Seconds(secs) => Some(Instant::now() + Duration::from_secs(u64::from(secs))),
        };
        let entry = Entry {
            value,
            tags: tags.iter().cloned().collect(),
            expires_at,
        };
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .insert(key.to_string(), entry);
    }

    fn delete(&self, key: &str) {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .remove(key);
    }

    fn invalidate_tags(&self, tags: &[String]) {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .retain(|_, entry| !tags.iter().any(|tag| entry.tags.contains(tag)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_roundtrip() {
        let store = MemoryCacheStore::new();
        store.set("k", "v".into(), &[], MaxAge::Permanent);
        assert_eq!(store.get("k"), Some("v".to_string()));
    }

    #[test]
    fn test_overwrite_keeps_latest() {
        let store = MemoryCacheStore::new();
        store.set("k", "first".into(), &[], MaxAge::Permanent);
        store.set("k", "second".into(), &[], MaxAge::Permanent);
        assert_eq!(store.get("k"), Some("second".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_tag_invalidation() {
        let store = MemoryCacheStore::new();
        store.set(
            "a",
            "1".into(),
            &["node:1".to_string()],
            MaxAge::Permanent,
        );
        store.set(
            "b",
            "2".into(),
            &["node:2".to_string()],
            MaxAge::Permanent,
        );

        store.invalidate_tags(&["node:1".to_string()]);

        assert_eq!(store.get("a"), None);
        assert_eq!(store.get("b"), Some("2".to_string()));
    }

    #[test]
    fn test_zero_max_age_expires_immediately() {
        let store = MemoryCacheStore::new();
        store.set("k", "v".into(), &[], MaxAge::Seconds(0));
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_delete() {
        let store = MemoryCacheStore::new();
        store.set("k", "v".into(), &[], MaxAge::Permanent);
        store.delete("k");
        assert_eq!(store.get("k"), None);
    }
}
