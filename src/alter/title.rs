//! Pass 8: strip the duplicated revision title.
//!
//! Normal page rendering embeds the revision title block in the fragment;
//! the page chrome around a changes view already shows a title, so the copy
//! is removed from the diff output.

use super::AlterPass;
use crate::diff::markup::REVISION_TITLE_CLASS;
use crate::dom::{DomTree, Selector};

pub struct StripRevisionTitle;

impl AlterPass for StripRevisionTitle {
    fn name(&self) -> &'static str {
        "strip-revision-title"
    }

    fn apply(&self, tree: &mut DomTree) {
        let titles = tree.select(&Selector::any().with_class(REVISION_TITLE_CLASS));
        for title in titles {
            if tree.is_attached(title) {
                tree.detach(title);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_fragment_lenient;

    #[test]
    fn test_title_block_removed() {
        let mut tree = parse_fragment_lenient(&format!(
            r#"<h1 class="{REVISION_TITLE_CLASS}">Topic</h1><p>Body.</p>"#
        ));
        StripRevisionTitle.apply(&mut tree);
        assert_eq!(tree.to_html(), "<p>Body.</p>");
    }

    #[test]
    fn test_plain_headings_kept() {
        let html = "<h1>Topic</h1><p>Body.</p>";
        let mut tree = parse_fragment_lenient(html);
        StripRevisionTitle.apply(&mut tree);
        assert_eq!(tree.to_html(), html);
    }

    #[test]
    fn test_idempotent() {
        let mut tree = parse_fragment_lenient(&format!(
            r#"<h1 class="{REVISION_TITLE_CLASS}">Topic</h1><p>Body.</p>"#
        ));
        StripRevisionTitle.apply(&mut tree);
        let once = tree.to_html();
        StripRevisionTitle.apply(&mut tree);
        assert_eq!(tree.to_html(), once);
    }
}
