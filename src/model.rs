//! Core data model: pages, revisions, rendered output and cache metadata.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Stable identifier of a logical wiki page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WikiPageId(pub String);

impl WikiPageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WikiPageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of one immutable revision of a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevisionId(pub String);

impl RevisionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for RevisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// An immutable, dated revision of a wiki page.
///
/// The core only ever reads revisions; producing them is the host CMS's
/// responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub id: RevisionId,
    pub page: WikiPageId,
    /// The in-universe date this revision is effective for.
    pub date: NaiveDate,
}

/// Maximum cache lifetime. Permanent entries outlive any finite lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaxAge {
    Permanent,
    Seconds(u32),
}

impl MaxAge {
    /// The more restrictive of two lifetimes.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        match (self, other) {
            (Self::Permanent, other) => other,
            (this, Self::Permanent) => this,
            (Self::Seconds(a), Self::Seconds(b)) => Self::Seconds(a.min(b)),
        }
    }
}

/// Cache invalidation metadata bubbled out of rendering.
///
/// Tags identify what the content depends on; max-age bounds how long it may
/// be served. Merging is union-of-tags, most-restrictive max-age.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub tags: BTreeSet<String>,
    pub max_age: MaxAge,
}

impl Default for CacheMetadata {
    fn default() -> Self {
        Self {
            tags: BTreeSet::new(),
            max_age: MaxAge::Permanent,
        }
    }
}

impl CacheMetadata {
    /// Metadata with the given tags and a permanent lifetime.
    pub fn with_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            max_age: MaxAge::Permanent,
        }
    }

    /// Merge another revision's metadata into this one.
    pub fn merge(&mut self, other: &CacheMetadata) {
        self.tags.extend(other.tags.iter().cloned());
        self.max_age = self.max_age.min(other.max_age);
    }
}

/// A fully rendered revision: HTML plus the cache metadata captured during
/// rendering. Transient; produced fresh per build.
#[derive(Debug, Clone)]
pub struct RenderedRevision {
    pub html: String,
    pub metadata: CacheMetadata,
}

impl RenderedRevision {
    pub fn new(html: impl Into<String>, metadata: CacheMetadata) -> Self {
        Self {
            html: html.into(),
            metadata,
        }
    }
}

/// The final cacheable unit: a normalized change fragment plus the merged
/// metadata of both revisions that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeArtifact {
    pub html: String,
    pub metadata: CacheMetadata,
}

impl ChangeArtifact {
    pub fn new(html: impl Into<String>, metadata: CacheMetadata) -> Self {
        Self {
            html: html.into(),
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_age_min() {
        assert_eq!(
            MaxAge::Permanent.min(MaxAge::Seconds(60)),
            MaxAge::Seconds(60)
        );
        assert_eq!(
            MaxAge::Seconds(30).min(MaxAge::Permanent),
            MaxAge::Seconds(30)
        );
        assert_eq!(
            MaxAge::Seconds(30).min(MaxAge::Seconds(60)),
            MaxAge::Seconds(30)
        );
        assert_eq!(MaxAge::Permanent.min(MaxAge::Permanent), MaxAge::Permanent);
    }

    #[test]
    fn test_metadata_merge_unions_tags_and_restricts_age() {
        let mut current = CacheMetadata {
            tags: ["node:1", "node:1:rev:2"].iter().map(|s| s.to_string()).collect(),
            max_age: MaxAge::Permanent,
        };
        let previous = CacheMetadata {
            tags: ["node:1", "node:1:rev:1"].iter().map(|s| s.to_string()).collect(),
            max_age: MaxAge::Seconds(3600),
        };

        current.merge(&previous);

        assert_eq!(current.tags.len(), 3);
        assert!(current.tags.contains("node:1:rev:1"));
        assert_eq!(current.max_age, MaxAge::Seconds(3600));
    }

    #[test]
    fn test_artifact_roundtrips_through_json() {
        let artifact = ChangeArtifact::new(
            "<div class=\"wiki-changes\"><p>x</p></div>",
            CacheMetadata::with_tags(["node:1"]),
        );
        let json = serde_json::to_string(&artifact).expect("serialize");
        let back: ChangeArtifact = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(artifact, back);
    }
}
