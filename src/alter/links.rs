//! Pass 6: reclassify links.
//!
//! Links inside changed regions get the stable link classes. Links whose
//! only change is their target URL are treated as expected noise by
//! default: wiki links are retargeted to the next revision's URL on every
//! publish, and highlighting each one would drown real changes. The old
//! link is dropped and the new one is left unmarked in place.
//!
//! The suppression heuristic does not check whether either URL is an
//! internal wiki link, so an external retarget with identical text is
//! suppressed too; hosts that care can disable suppression.

use super::AlterPass;
use crate::diff::markup::{
    strip_raw_classes, DEL_TAG, DIFF_CLASS, LINK_CHANGED_CLASS, LINK_CLASS, RAW_HREF_CLASS,
    REMOVED_CLASS,
};
use crate::dom::{DomTree, NodeId, Selector};

pub struct ReclassifyLinks {
    suppress_href_only: bool,
}

impl ReclassifyLinks {
    pub fn new(suppress_href_only: bool) -> Self {
        Self { suppress_href_only }
    }
}

impl AlterPass for ReclassifyLinks {
    fn name(&self) -> &'static str {
        "reclassify-links"
    }

    fn apply(&self, tree: &mut DomTree) {
        self.handle_href_only_changes(tree);
        self.relabel_links_in_changed_regions(tree);
    }
}

impl ReclassifyLinks {
    fn handle_href_only_changes(&self, tree: &mut DomTree) {
        let anchors = tree.select(&Selector::element("a").with_class(RAW_HREF_CLASS));
        for anchor in anchors {
            if !tree.is_attached(anchor) {
                continue;
            }
            let wrapper = preceding_href_wrapper(tree, anchor);

            if self.suppress_href_only {
                if let Some(wrapper) = wrapper {
                    tree.detach(wrapper);
                }
                tree.remove_class(anchor, RAW_HREF_CLASS);
            } else {
                if let Some(wrapper) = wrapper {
                    strip_raw_classes(tree, wrapper);
                    tree.add_class(wrapper, DIFF_CLASS);
                    tree.add_class(wrapper, REMOVED_CLASS);
                }
                strip_raw_classes(tree, anchor);
                tree.add_class(anchor, LINK_CLASS);
                tree.add_class(anchor, LINK_CHANGED_CLASS);
            }
        }
    }

    /// Links under any stable diff marker get the link classes.
    fn relabel_links_in_changed_regions(&self, tree: &mut DomTree) {
        let region = Selector::any().with_class(DIFF_CLASS);
        let anchors = tree.select(&Selector::element("a"));
        for anchor in anchors {
            if tree.closest_ancestor(anchor, &region).is_none() {
                continue;
            }
            strip_raw_classes(tree, anchor);
            tree.add_class(anchor, LINK_CLASS);
            tree.add_class(anchor, LINK_CHANGED_CLASS);
        }
    }
}

/// The `del` wrapper holding the old link, immediately before the new
/// anchor (whitespace tolerated).
fn preceding_href_wrapper(tree: &DomTree, anchor: NodeId) -> Option<NodeId> {
    let parent = tree.parent(anchor)?;
    let mut idx = tree.sibling_index(anchor)?;
    while idx > 0 {
        idx -= 1;
        let sibling = tree.children(parent)[idx];
        if tree.is_whitespace_text(sibling) {
            continue;
        }
        if tree.is_element(sibling, DEL_TAG) && tree.has_class(sibling, RAW_HREF_CLASS) {
            return Some(sibling);
        }
        return None;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_fragment_lenient;

    const HREF_CHANGE: &str = concat!(
        r#"<p><del class="diffhref"><a href="/wiki/2049-09-28/Topic">Topic</a></del>"#,
        r#"<a class="diffhref" href="/wiki/2049-10-01/Topic">Topic</a></p>"#,
    );

    #[test]
    fn test_href_only_change_suppressed_by_default() {
        let mut tree = parse_fragment_lenient(HREF_CHANGE);
        ReclassifyLinks::new(true).apply(&mut tree);
        assert_eq!(
            tree.to_html(),
            r#"<p><a href="/wiki/2049-10-01/Topic">Topic</a></p>"#
        );
    }

    #[test]
    fn test_href_only_change_highlighted_when_suppression_off() {
        let mut tree = parse_fragment_lenient(HREF_CHANGE);
        ReclassifyLinks::new(false).apply(&mut tree);
        let html = tree.to_html();
        assert!(html.contains(LINK_CHANGED_CLASS), "{html}");
        assert!(html.contains(REMOVED_CLASS), "{html}");
        assert!(!html.contains(RAW_HREF_CLASS), "{html}");
    }

    #[test]
    fn test_link_inside_added_region_relabeled() {
        let mut tree = parse_fragment_lenient(&format!(
            r#"<ins class="{DIFF_CLASS}"><a href="/wiki/Topic">Topic</a></ins>"#
        ));
        ReclassifyLinks::new(true).apply(&mut tree);
        let html = tree.to_html();
        assert!(html.contains(LINK_CLASS), "{html}");
        assert!(html.contains(LINK_CHANGED_CLASS), "{html}");
    }

    #[test]
    fn test_unchanged_link_untouched() {
        let html = r#"<p><a href="/wiki/Topic">Topic</a></p>"#;
        let mut tree = parse_fragment_lenient(html);
        ReclassifyLinks::new(true).apply(&mut tree);
        assert_eq!(tree.to_html(), html);
    }

    #[test]
    fn test_anchor_without_wrapper_still_unmarked() {
        // Wrapper already gone (malformed input); the class is still cleared.
        let mut tree =
            parse_fragment_lenient(r#"<p><a class="diffhref" href="/new">T</a></p>"#);
        ReclassifyLinks::new(true).apply(&mut tree);
        assert_eq!(tree.to_html(), r#"<p><a href="/new">T</a></p>"#);
    }

    #[test]
    fn test_idempotent() {
        let mut tree = parse_fragment_lenient(HREF_CHANGE);
        let pass = ReclassifyLinks::new(true);
        pass.apply(&mut tree);
        let once = tree.to_html();
        pass.apply(&mut tree);
        assert_eq!(tree.to_html(), once);
    }
}
