//! Pass 2: fix invalid list nesting.
//!
//! `ins`/`del` are not valid parents of list elements. When a marker wraps a
//! list, the marker is pushed down: every non-whitespace text run inside the
//! marker's subtree gets its own cloned marker, and the original wrapper is
//! unwrapped. Whitespace-only runs are skipped so empty markers are never
//! created between list items.

use super::AlterPass;
use crate::diff::markup::marker_kind;
use crate::dom::{DomTree, NodeData, NodeId};

/// Tags whose content model forbids a marker parent.
const LIST_TAGS: &[&str] = &["ul", "ol", "dl"];

pub struct FixListNesting;

impl AlterPass for FixListNesting {
    fn name(&self) -> &'static str {
        "fix-list-nesting"
    }

    fn apply(&self, tree: &mut DomTree) {
        let candidates = tree.descendants(tree.root());
        for node in candidates {
            if !tree.is_attached(node) {
                continue;
            }
            if marker_kind(tree, node).is_none() {
                continue;
            }
            if !wraps_list(tree, node) {
                continue;
            }
            push_marker_down(tree, node);
        }
    }
}

/// True when any direct child of the marker is a list element.
fn wraps_list(tree: &DomTree, marker: NodeId) -> bool {
    tree.children(marker)
        .iter()
        .any(|&child| tree.tag(child).is_some_and(|t| LIST_TAGS.contains(&t)))
}

/// Clone the marker onto each non-whitespace text run in its subtree, then
/// unwrap the original.
fn push_marker_down(tree: &mut DomTree, marker: NodeId) {
    let NodeData::Element { tag, attrs } = tree.data(marker).clone() else {
        return;
    };

    let text_runs: Vec<NodeId> = tree
        .descendants(marker)
        .into_iter()
        .filter(|&n| n != marker && tree.text(n).is_some() && !tree.is_whitespace_text(n))
        .collect();

    for text in text_runs {
        let clone = tree.create_element(tag.clone());
        for (name, value) in &attrs {
            tree.set_attr(clone, name.clone(), value.clone());
        }
        tree.wrap(text, clone);
    }

    tree.unwrap_node(marker);
}
