//! Pass 3: group changed pairs.
//!
//! A deletion immediately followed by an insertion at the same position is
//! one semantic edit. Both halves are wrapped in a container carrying the
//! changed modifier, and relabeled with the changed-removed / changed-added
//! classes so they can be styled as a unit.

use super::AlterPass;
use crate::diff::markup::{
    marker_kind, strip_raw_classes, MarkerKind, CHANGED_ADDED_CLASS, CHANGED_CLASS,
    CHANGED_REMOVED_CLASS, DIFF_CLASS, RAW_HREF_CLASS,
};
use crate::dom::{DomTree, NodeId};

pub struct GroupChangedPairs;

impl AlterPass for GroupChangedPairs {
    fn name(&self) -> &'static str {
        "group-changed-pairs"
    }

    fn apply(&self, tree: &mut DomTree) {
        let candidates = tree.descendants(tree.root());
        for node in candidates {
            if !tree.is_attached(node) {
                continue;
            }
            if marker_kind(tree, node) != Some(MarkerKind::Delete) {
                continue;
            }
            // Href-change wrappers belong to the link pass.
            if tree.has_class(node, RAW_HREF_CLASS) {
                continue;
            }
            let Some(insert) = following_insert_marker(tree, node) else {
                continue;
            };

            let container = tree.create_element("span");
            tree.add_class(container, DIFF_CLASS);
            tree.add_class(container, CHANGED_CLASS);
            tree.insert_before(node, container);
            tree.append(container, node);
            tree.append(container, insert);

            strip_raw_classes(tree, node);
            tree.add_class(node, CHANGED_REMOVED_CLASS);
            strip_raw_classes(tree, insert);
            tree.add_class(insert, CHANGED_ADDED_CLASS);
        }
    }
}

/// The insert marker immediately following `node`, skipping at most
/// whitespace-only text.
fn following_insert_marker(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    let mut current = tree.next_sibling(node)?;
    while tree.is_whitespace_text(current) {
        current = tree.next_sibling(current)?;
    }
    if marker_kind(tree, current) == Some(MarkerKind::Insert)
        && !tree.has_class(current, RAW_HREF_CLASS)
    {
        Some(current)
    } else {
        None
    }
}
