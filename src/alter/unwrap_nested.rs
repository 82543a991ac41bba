//! Pass 1: unwrap nested markers.
//!
//! The diff engine can double-mark a change by wrapping a marker directly in
//! another marker of the same kind. When a marker's only meaningful child is
//! such a marker, the outer one is unwrapped so each change is marked once.

use super::AlterPass;
use crate::diff::markup::marker_kind;
use crate::dom::{DomTree, NodeId};

pub struct UnwrapNestedMarkers;

impl AlterPass for UnwrapNestedMarkers {
    fn name(&self) -> &'static str {
        "unwrap-nested-markers"
    }

    fn apply(&self, tree: &mut DomTree) {
        let candidates = tree.descendants(tree.root());
        for node in candidates {
            if !tree.is_attached(node) {
                continue;
            }
            let Some(outer_kind) = marker_kind(tree, node) else {
                continue;
            };
            if let Some(inner) = sole_meaningful_child(tree, node) {
                if marker_kind(tree, inner) == Some(outer_kind) {
                    tree.unwrap_node(node);
                }
            }
        }
    }
}

/// The single non-whitespace child of a node, if there is exactly one.
fn sole_meaningful_child(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    let mut found = None;
    for &child in tree.children(node) {
        if tree.is_whitespace_text(child) {
            continue;
        }
        if found.is_some() {
            return None;
        }
        found = Some(child);
    }
    found
}
