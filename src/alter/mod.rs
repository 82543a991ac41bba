//! The DOM alteration pipeline.
//!
//! Raw diff markup is normalized into the stable presentation vocabulary by
//! a fixed, ordered sequence of passes. Each pass has a single
//! responsibility, operates on the whole tree, and is idempotent. Ordering
//! is a correctness dependency: unwrapping and list fixes must run before
//! pair grouping, grouping before reclassification, cleanup last.
//!
//! Passes are registered explicitly on an [`AlterPipeline`] rather than
//! dispatched through an event bus; the ordering contract is too load-bearing
//! for implicit priorities.

mod changed_pairs;
mod cleanup;
mod links;
mod list_nesting;
mod reclassify;
mod title;
mod unwrap_nested;

pub use changed_pairs::GroupChangedPairs;
pub use cleanup::CleanupMarkers;
pub use links::ReclassifyLinks;
pub use list_nesting::FixListNesting;
pub use reclassify::{ReclassifyAdded, ReclassifyRemoved};
pub use title::StripRevisionTitle;
pub use unwrap_nested::UnwrapNestedMarkers;

use tracing::debug;

use crate::config::ChangesConfig;
use crate::dom::DomTree;

/// A single normalization pass over the diff tree.
///
/// Passes must be idempotent, must not assume the output of later passes,
/// and must skip (rather than fail on) elements they cannot safely handle.
pub trait AlterPass: Send + Sync {
    /// Pass name for logging.
    fn name(&self) -> &'static str;

    /// Apply the pass, mutating the tree in place.
    fn apply(&self, tree: &mut DomTree);
}

/// An ordered list of alteration passes.
pub struct AlterPipeline {
    passes: Vec<Box<dyn AlterPass>>,
}

impl AlterPipeline {
    /// Create an empty pipeline.
    pub fn empty() -> Self {
        Self { passes: Vec::new() }
    }

    /// The standard pipeline, in the required execution order:
    ///
    /// 1. unwrap nested markers
    /// 2. fix invalid list nesting
    /// 3. group changed (delete + insert) pairs
    /// 4. reclassify added content
    /// 5. reclassify removed content
    /// 6. reclassify links (and suppress href-only changes)
    /// 7. clean up leftover markers and raw classes
    /// 8. strip the duplicated revision title
    ///
    /// 1 and 2 must precede 3 so pairs are formed from single, validly
    /// placed markers; 3 must precede 4 and 5 so changed halves are not
    /// mislabeled as plain added/removed; 7 must run last.
    pub fn standard(config: &ChangesConfig) -> Self {
        let mut pipeline = Self::empty();
        pipeline
            .register(UnwrapNestedMarkers)
            .register(FixListNesting)
            .register(GroupChangedPairs)
            .register(ReclassifyAdded)
            .register(ReclassifyRemoved)
            .register(ReclassifyLinks::new(config.suppress_href_only));
        pipeline.register(CleanupMarkers);
        if config.strip_revision_title {
            pipeline.register(StripRevisionTitle);
        }
        pipeline
    }

    /// Append a pass to the end of the pipeline.
    pub fn register(&mut self, pass: impl AlterPass + 'static) -> &mut Self {
        self.passes.push(Box::new(pass));
        self
    }

    /// Registered pass names, in execution order.
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run every pass, in order.
    pub fn run(&self, tree: &mut DomTree) {
        for pass in &self.passes {
            debug!(pass = pass.name(), "running alteration pass");
            pass.apply(tree);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_pipeline_order() {
        let pipeline = AlterPipeline::standard(&ChangesConfig::default());
        assert_eq!(
            pipeline.pass_names(),
            vec![
                "unwrap-nested-markers",
                "fix-list-nesting",
                "group-changed-pairs",
                "reclassify-added",
                "reclassify-removed",
                "reclassify-links",
                "cleanup-markers",
                "strip-revision-title",
            ]
        );
    }

    #[test]
    fn test_title_pass_configurable() {
        let config = ChangesConfig::default().with_strip_revision_title(false);
        let pipeline = AlterPipeline::standard(&config);
        assert!(!pipeline.pass_names().contains(&"strip-revision-title"));
    }
}
