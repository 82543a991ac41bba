//! Cache variant keys.

use serde::{Deserialize, Serialize};

use crate::model::WikiPageId;

/// Identifies one cacheable diff variant: page, interface language, theme
/// and the acting user's permission hash.
///
/// Keyed by permission hash rather than role set so role combinations with
/// identical effective permissions share one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheVariantKey {
    pub page: WikiPageId,
    pub language: String,
    pub theme: String,
    pub permissions_hash: String,
}

impl CacheVariantKey {
    pub fn new(
        page: WikiPageId,
        language: impl Into<String>,
        theme: impl Into<String>,
        permissions_hash: impl Into<String>,
    ) -> Self {
        Self {
            page,
            language: language.into(),
            theme: theme.into(),
            permissions_hash: permissions_hash.into(),
        }
    }

    /// Deterministic cache id. A pure function of the four parts. Each part
    /// has its `:` characters escaped before joining, so a delimiter inside
    /// one part cannot make two distinct keys produce the same id.
    pub fn cache_id(&self) -> String {
        format!(
            "wiki_changes:{}:{}:{}:{}",
            escape_part(&self.page.to_string()),
            escape_part(&self.language),
            escape_part(&self.theme),
            escape_part(&self.permissions_hash)
        )
    }

    /// Cache id of the "still being built" placeholder entry for this key.
    pub fn placeholder_id(&self) -> String {
        format!("{}:placeholder", self.cache_id())
    }
}

/// Percent-escape `%` and the `:` field delimiter within one key part.
fn escape_part(part: &str) -> String {
    part.replace('%', "%25").replace(':', "%3A")
}

impl std::fmt::Display for CacheVariantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.cache_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> CacheVariantKey {
        CacheVariantKey::new(WikiPageId::new("42"), "en", "default", "abc123")
    }

    #[test]
    fn test_cache_id_is_deterministic() {
        assert_eq!(key().cache_id(), key().cache_id());
        assert_eq!(key().cache_id(), "wiki_changes:42:en:default:abc123");
    }

    #[test]
    fn test_varying_any_part_changes_the_id() {
        let base = key().cache_id();
        let variants = [
            CacheVariantKey::new(WikiPageId::new("43"), "en", "default", "abc123"),
            CacheVariantKey::new(WikiPageId::new("42"), "de", "default", "abc123"),
            CacheVariantKey::new(WikiPageId::new("42"), "en", "dark", "abc123"),
            CacheVariantKey::new(WikiPageId::new("42"), "en", "default", "def456"),
        ];
        for variant in variants {
            assert_ne!(variant.cache_id(), base);
        }
    }

    #[test]
    fn test_delimiter_inside_a_part_cannot_alias_another_key() {
        // Without escaping, page "a:b" + language "c" would concatenate to
        // the same id as page "a" + language "b:c".
        let first = CacheVariantKey::new(WikiPageId::new("a:b"), "c", "default", "abc123");
        let second = CacheVariantKey::new(WikiPageId::new("a"), "b:c", "default", "abc123");
        assert_ne!(first.cache_id(), second.cache_id());
    }

    #[test]
    fn test_placeholder_id_distinct_from_cache_id() {
        assert_ne!(key().placeholder_id(), key().cache_id());
        assert!(key().placeholder_id().starts_with(&key().cache_id()));
    }
}
