//! Passes 4 and 5: reclassify added and removed content.
//!
//! After pair grouping, any marker still carrying raw diff classes is a
//! plain addition or removal. These are relabeled into the stable
//! vocabulary. This also catches the per-text-run markers cloned into lists
//! by the list-nesting pass.

use super::AlterPass;
use crate::diff::markup::{
    marker_kind, strip_raw_classes, MarkerKind, ADDED_CLASS, DIFF_CLASS, RAW_HREF_CLASS,
    REMOVED_CLASS,
};
use crate::dom::DomTree;

pub struct ReclassifyAdded;

impl AlterPass for ReclassifyAdded {
    fn name(&self) -> &'static str {
        "reclassify-added"
    }

    fn apply(&self, tree: &mut DomTree) {
        reclassify(tree, MarkerKind::Insert, ADDED_CLASS);
    }
}

pub struct ReclassifyRemoved;

impl AlterPass for ReclassifyRemoved {
    fn name(&self) -> &'static str {
        "reclassify-removed"
    }

    fn apply(&self, tree: &mut DomTree) {
        reclassify(tree, MarkerKind::Delete, REMOVED_CLASS);
    }
}

fn reclassify(tree: &mut DomTree, kind: MarkerKind, modifier: &str) {
    let candidates = tree.descendants(tree.root());
    for node in candidates {
        if marker_kind(tree, node) != Some(kind) {
            continue;
        }
        // Href-change markers are consumed by the link pass.
        if tree.has_class(node, RAW_HREF_CLASS) {
            continue;
        }
        strip_raw_classes(tree, node);
        tree.add_class(node, DIFF_CLASS);
        tree.add_class(node, modifier);
    }
}
