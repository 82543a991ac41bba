//! Configuration for diff building and normalization.

use serde::{Deserialize, Serialize};

/// Behavior configuration for the diff engine and alteration pipeline.
///
/// Loadable from a host config file (serde) or built in code with the
/// `with_*` setters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangesConfig {
    /// Suppress href-only link changes entirely (no visual highlighting).
    ///
    /// Wiki links are routinely retargeted to the next revision's URL, so
    /// href-only changes are treated as expected noise. This knowingly
    /// over-suppresses: a link retargeted to an unrelated external URL with
    /// identical text is suppressed too. Disable to highlight every link
    /// change instead.
    pub suppress_href_only: bool,

    /// Strip the duplicated revision title block from the diff fragment.
    ///
    /// Page chrome already shows the title; keeping the copy in the
    /// fragment would render it twice.
    pub strip_revision_title: bool,

    /// Text-similarity threshold (0.0–1.0) for treating adjacent unmatched
    /// elements as one modified pair rather than a remove + add.
    pub similarity_threshold: f64,
}

impl Default for ChangesConfig {
    fn default() -> Self {
        Self {
            suppress_href_only: true,
            strip_revision_title: true,
            similarity_threshold: 0.5,
        }
    }
}

impl ChangesConfig {
    /// Create a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set href-only suppression.
    #[must_use]
    pub fn with_suppress_href_only(mut self, suppress: bool) -> Self {
        self.suppress_href_only = suppress;
        self
    }

    /// Set revision-title stripping.
    #[must_use]
    pub fn with_strip_revision_title(mut self, strip: bool) -> Self {
        self.strip_revision_title = strip;
        self
    }

    /// Set the modified-pair similarity threshold, clamped to 0.0–1.0.
    #[must_use]
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChangesConfig::default();
        assert!(config.suppress_href_only);
        assert!(config.strip_revision_title);
        assert!((config.similarity_threshold - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_builder_setters() {
        let config = ChangesConfig::new()
            .with_suppress_href_only(false)
            .with_similarity_threshold(1.5);
        assert!(!config.suppress_href_only);
        assert!((config.similarity_threshold - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ChangesConfig =
            serde_json::from_str(r#"{"suppress_href_only": false}"#).expect("valid config");
        assert!(!config.suppress_href_only);
        assert!(config.strip_revision_title, "unset fields take defaults");
    }
}
