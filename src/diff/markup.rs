//! Diff marker vocabulary.
//!
//! Two vocabularies live here. The *raw* vocabulary is what the diff engine
//! emits; the *stable* vocabulary is what the alteration pipeline rewrites it
//! into. Downstream styling depends on the stable classes byte-for-byte, so
//! they are defined once and never spelled out inline.

use crate::dom::{DomTree, NodeId};

// ============================================================================
// Raw diff-engine vocabulary
// ============================================================================

/// Tag wrapping inserted content.
pub const INS_TAG: &str = "ins";

/// Tag wrapping deleted content.
pub const DEL_TAG: &str = "del";

/// Class on a pure insertion marker.
pub const RAW_INS_CLASS: &str = "diffins";

/// Class on a pure deletion marker.
pub const RAW_DEL_CLASS: &str = "diffdel";

/// Class on both halves of a modified (replaced) pair.
pub const RAW_MOD_CLASS: &str = "diffmod";

/// Class marking an anchor whose only change is its `href`.
///
/// Appears on the new anchor itself and on the `<del>` wrapping the old one.
pub const RAW_HREF_CLASS: &str = "diffhref";

/// Every raw class, for the cleanup pass.
pub const RAW_CLASSES: &[&str] = &[RAW_INS_CLASS, RAW_DEL_CLASS, RAW_MOD_CLASS, RAW_HREF_CLASS];

// ============================================================================
// Stable presentation vocabulary
// ============================================================================

/// Base class on the artifact's container element.
pub const BASE_CLASS: &str = "wiki-changes";

/// Element class carried by every normalized diff marker.
pub const DIFF_CLASS: &str = "wiki-changes__diff";

/// Modifier for purely added content.
pub const ADDED_CLASS: &str = "wiki-changes__diff--added";

/// Modifier for purely removed content.
pub const REMOVED_CLASS: &str = "wiki-changes__diff--removed";

/// Modifier on the container wrapping a changed (removed + added) pair.
pub const CHANGED_CLASS: &str = "wiki-changes__diff--changed";

/// Class on the added half of a changed pair.
pub const CHANGED_ADDED_CLASS: &str = "wiki-changes__diff-changed-added";

/// Class on the removed half of a changed pair.
pub const CHANGED_REMOVED_CLASS: &str = "wiki-changes__diff-changed-removed";

/// Class on links inside or carrying a change.
pub const LINK_CLASS: &str = "wiki-changes__diff-link";

/// Modifier on changed links.
pub const LINK_CHANGED_CLASS: &str = "wiki-changes__diff-link--changed";

/// Class on the rendered revision title block stripped by the final pass.
pub const REVISION_TITLE_CLASS: &str = "wiki-page-revision-title";

// ============================================================================
// Marker classification helpers
// ============================================================================

/// Semantic kind of a raw diff marker element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Insert,
    Delete,
}

/// Classify a node as a raw marker element, if it is one.
///
/// A marker is an `ins`/`del` element carrying any raw diff class. Bare
/// `ins`/`del` elements authored in page content are not markers.
pub fn marker_kind(tree: &DomTree, id: NodeId) -> Option<MarkerKind> {
    let kind = match tree.tag(id)? {
        t if t == INS_TAG => MarkerKind::Insert,
        t if t == DEL_TAG => MarkerKind::Delete,
        _ => return None,
    };
    if RAW_CLASSES.iter().any(|class| tree.has_class(id, class)) {
        Some(kind)
    } else {
        None
    }
}

/// Strip every raw diff class from an element.
pub fn strip_raw_classes(tree: &mut DomTree, id: NodeId) {
    for class in RAW_CLASSES {
        tree.remove_class(id, class);
    }
}
