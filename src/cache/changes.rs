//! The change artifact cache.

use std::sync::Arc;

use tracing::warn;

use super::key::CacheVariantKey;
use super::store::CacheStore;
use crate::error::WikiDiffError;
use crate::model::ChangeArtifact;

/// Keyed cache of built [`ChangeArtifact`]s over a tag-aware backend.
///
/// Storing an artifact propagates its cache tags and max-age to the backend,
/// so host-side invalidation (the page being edited, a role changing) evicts
/// it without this module's involvement. Storing also drops any placeholder
/// entry for the key so readers stop seeing "still being built".
pub struct ChangeCache {
    store: Arc<dyn CacheStore>,
}

impl ChangeCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Whether an artifact exists for the key.
    pub fn is_cached(&self, key: &CacheVariantKey) -> bool {
        self.store.get(&key.cache_id()).is_some()
    }

    /// Fetch the artifact for a key, if present and still valid.
    pub fn get(&self, key: &CacheVariantKey) -> Option<ChangeArtifact> {
        let raw = self.store.get(&key.cache_id())?;
        match serde_json::from_str(&raw) {
            Ok(artifact) => Some(artifact),
            Err(error) => {
                // Treat a corrupt entry as a miss; the next build overwrites it.
                let error = WikiDiffError::from(error);
                warn!(key = %key, %error, "discarding corrupt cached artifact");
                self.store.delete(&key.cache_id());
                None
            }
        }
    }

    /// Store an artifact, replacing any previous one for the key.
    pub fn set(&self, key: &CacheVariantKey, artifact: &ChangeArtifact) {
        let raw = match serde_json::to_string(artifact) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(key = %key, %error, "failed to serialize artifact; not caching");
                return;
            }
        };
        let tags: Vec<String> = artifact.metadata.tags.iter().cloned().collect();
        self.store
            .set(&key.cache_id(), raw, &tags, artifact.metadata.max_age);
        self.store.delete(&key.placeholder_id());
    }

    /// Mark a key as "build in progress" so readers can show a placeholder.
    pub fn set_placeholder(&self, key: &CacheVariantKey) {
        self.store.set(
            &key.placeholder_id(),
            String::new(),
            &[],
            crate::model::MaxAge::Seconds(300),
        );
    }

    /// Whether a placeholder is pending for the key.
    pub fn has_placeholder(&self, key: &CacheVariantKey) -> bool {
        self.store.get(&key.placeholder_id()).is_some()
    }

    /// Drop the artifact (and placeholder) for a key.
    pub fn invalidate(&self, key: &CacheVariantKey) {
        self.store.delete(&key.cache_id());
        self.store.delete(&key.placeholder_id());
    }
}
