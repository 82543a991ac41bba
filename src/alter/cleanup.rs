//! Pass 7: cleanup.
//!
//! Runs last. Any marker still carrying only raw diff classes was skipped by
//! every earlier pass and is unwrapped rather than shipped. Markers nested
//! inside non-flow contexts (`figure`, `picture`) are unwrapped regardless
//! of labeling, and any remaining raw class is stripped from the tree.

use super::AlterPass;
use crate::diff::markup::{marker_kind, strip_raw_classes, RAW_CLASSES};
use crate::dom::{DomTree, Selector};

/// Contexts whose content model excludes marker elements.
const NON_FLOW_PARENTS: &[&str] = &["figure", "picture"];

pub struct CleanupMarkers;

impl AlterPass for CleanupMarkers {
    fn name(&self) -> &'static str {
        "cleanup-markers"
    }

    fn apply(&self, tree: &mut DomTree) {
        let candidates = tree.descendants(tree.root());
        for node in candidates {
            if !tree.is_attached(node) {
                continue;
            }
            let in_non_flow_context = tree
                .parent(node)
                .and_then(|p| tree.tag(p))
                .is_some_and(|t| NON_FLOW_PARENTS.contains(&t));
            let is_leftover_raw = marker_kind(tree, node).is_some();
            let is_marker_element = tree
                .tag(node)
                .is_some_and(|t| t == "ins" || t == "del" || t == "span")
                && (is_leftover_raw || tree.has_class(node, crate::diff::markup::DIFF_CLASS));

            if is_leftover_raw || (is_marker_element && in_non_flow_context) {
                tree.unwrap_node(node);
            }
        }

        // Belt and braces: no raw class survives this pass anywhere.
        for node in tree.select(&Selector::any()) {
            if RAW_CLASSES.iter().any(|class| tree.has_class(node, class)) {
                strip_raw_classes(tree, node);
            }
        }
    }
}
