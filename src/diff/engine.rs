//! Structural HTML diff engine.
//!
//! Produces one merged tree from two rendered revisions. Child sequences are
//! aligned by subtree hash with an LCS table; unmatched subtrees become raw
//! `ins`/`del` markers, adjacent unmatched pairs with similar text are
//! recursed into as modified pairs, and matched text runs get a word-level
//! diff. The output uses the raw vocabulary in [`super::markup`]; the
//! alteration pipeline is responsible for normalizing it.

use strsim::normalized_levenshtein;
use tracing::debug;

use super::markup::{
    DEL_TAG, INS_TAG, RAW_DEL_CLASS, RAW_HREF_CLASS, RAW_INS_CLASS, RAW_MOD_CLASS,
};
use super::words::{self, Op, WordSegment};
use crate::dom::{parse_fragment_lenient, DomTree, NodeId};

/// Seam to the HTML diff algorithm.
///
/// Implementations must tolerate malformed input without raising and must
/// emit the raw marker vocabulary from [`super::markup`].
pub trait HtmlDiffer: Send + Sync {
    /// Diff two rendered HTML strings into one merged, annotated tree.
    fn diff(&self, old_html: &str, new_html: &str) -> DomTree;
}

/// Default tree differ.
pub struct StructuralDiffer {
    similarity_threshold: f64,
}

impl StructuralDiffer {
    /// Create a differ with default settings.
    pub fn new() -> Self {
        Self {
            similarity_threshold: 0.5,
        }
    }

    /// Set the text-similarity threshold above which an adjacent unmatched
    /// old/new element pair is treated as modified rather than replaced.
    #[must_use]
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold.clamp(0.0, 1.0);
        self
    }
}

impl Default for StructuralDiffer {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlDiffer for StructuralDiffer {
    fn diff(&self, old_html: &str, new_html: &str) -> DomTree {
        let old_tree = parse_fragment_lenient(old_html);
        let new_tree = parse_fragment_lenient(new_html);

        let mut out = DomTree::new();
        let out_root = out.root();
        let mut merger = Merger {
            old: &old_tree,
            new: &new_tree,
            out: &mut out,
            similarity_threshold: self.similarity_threshold,
        };
        merger.merge_children(old_tree.root(), new_tree.root(), out_root);

        debug!(
            old_len = old_html.len(),
            new_len = new_html.len(),
            "structural diff complete"
        );
        out
    }
}

/// Recursive merge state. Borrows both input trees and owns the output.
struct Merger<'a> {
    old: &'a DomTree,
    new: &'a DomTree,
    out: &'a mut DomTree,
    similarity_threshold: f64,
}

impl Merger<'_> {
    /// Merge the child lists of a matched old/new element pair into
    /// `out_parent`.
    fn merge_children(&mut self, old_node: NodeId, new_node: NodeId, out_parent: NodeId) {
        let old_children = self.old.children(old_node).to_vec();
        let new_children = self.new.children(new_node).to_vec();

        let old_keys: Vec<u64> = old_children
            .iter()
            .map(|&c| self.old.subtree_hash(c))
            .collect();
        let new_keys: Vec<u64> = new_children
            .iter()
            .map(|&c| self.new.subtree_hash(c))
            .collect();

        let ops = words::lcs_ops(&old_keys, &new_keys);

        let (mut i, mut j) = (0, 0);
        let mut cursor = 0;
        while cursor < ops.len() {
            match ops[cursor] {
                Op::Keep => {
                    copy_subtree(self.new, new_children[j], self.out, out_parent);
                    i += 1;
                    j += 1;
                    cursor += 1;
                }
                Op::Delete | Op::Insert => {
                    let mut deleted = Vec::new();
                    let mut inserted = Vec::new();
                    while cursor < ops.len() && ops[cursor] != Op::Keep {
                        match ops[cursor] {
                            Op::Delete => {
                                deleted.push(old_children[i]);
                                i += 1;
                            }
                            Op::Insert => {
                                inserted.push(new_children[j]);
                                j += 1;
                            }
                            Op::Keep => unreachable!(),
                        }
                        cursor += 1;
                    }
                    self.merge_changed_run(&deleted, &inserted, out_parent);
                }
            }
        }
    }

    /// Handle a run of unmatched old/new children between two stable points.
    ///
    /// Children are paired positionally; each pair is either a text diff, an
    /// href-only anchor change, a modified element pair to recurse into, or
    /// a wholesale replacement. Leftovers are marked deleted/inserted.
    fn merge_changed_run(&mut self, deleted: &[NodeId], inserted: &[NodeId], out_parent: NodeId) {
        let pairs = deleted.len().min(inserted.len());

        for idx in 0..pairs {
            let old_child = deleted[idx];
            let new_child = inserted[idx];

            match (self.old.tag(old_child), self.new.tag(new_child)) {
                (None, None) => {
                    let old_text = self.old.text(old_child).unwrap_or_default().to_string();
                    let new_text = self.new.text(new_child).unwrap_or_default().to_string();
                    self.emit_text_diff(&old_text, &new_text, out_parent);
                }
                (Some(old_tag), Some(new_tag)) if old_tag == new_tag => {
                    if old_tag == "a" && self.is_href_only_change(old_child, new_child) {
                        self.emit_href_change(old_child, new_child, out_parent);
                    } else if self.is_modified_pair(old_child, new_child) {
                        // Same tag, similar text: keep the element, diff inside.
                        let shell = copy_shallow(self.new, new_child, self.out);
                        self.out.append(out_parent, shell);
                        self.merge_children(old_child, new_child, shell);
                    } else {
                        self.emit_deleted(old_child, out_parent);
                        self.emit_inserted(new_child, out_parent);
                    }
                }
                _ => {
                    self.emit_deleted(old_child, out_parent);
                    self.emit_inserted(new_child, out_parent);
                }
            }
        }

        for &old_child in &deleted[pairs..] {
            self.emit_deleted(old_child, out_parent);
        }
        for &new_child in &inserted[pairs..] {
            self.emit_inserted(new_child, out_parent);
        }
    }

    /// Word-diff two text runs into the output, marking changed words.
    fn emit_text_diff(&mut self, old_text: &str, new_text: &str, out_parent: NodeId) {
        for segment in words::diff_words(old_text, new_text) {
            match segment {
                WordSegment::Unchanged(text) => {
                    let node = self.out.create_text(text);
                    self.out.append(out_parent, node);
                }
                WordSegment::Inserted(text) => {
                    self.emit_text_marker(INS_TAG, RAW_INS_CLASS, &text, out_parent);
                }
                WordSegment::Deleted(text) => {
                    self.emit_text_marker(DEL_TAG, RAW_DEL_CLASS, &text, out_parent);
                }
                WordSegment::Replaced { old, new } => {
                    self.emit_text_marker(DEL_TAG, RAW_MOD_CLASS, &old, out_parent);
                    self.emit_text_marker(INS_TAG, RAW_MOD_CLASS, &new, out_parent);
                }
            }
        }
    }

    /// Whitespace-only changes are emitted unmarked; everything else gets a
    /// raw marker element.
    fn emit_text_marker(&mut self, tag: &str, class: &str, text: &str, out_parent: NodeId) {
        if text.chars().all(char::is_whitespace) {
            let node = self.out.create_text(text.to_string());
            self.out.append(out_parent, node);
            return;
        }
        let marker = self.out.create_element(tag);
        self.out.add_class(marker, class);
        let node = self.out.create_text(text.to_string());
        self.out.append(marker, node);
        self.out.append(out_parent, marker);
    }

    /// True when two anchors differ in `href` but not in visible text.
    fn is_href_only_change(&self, old_anchor: NodeId, new_anchor: NodeId) -> bool {
        self.old.attr(old_anchor, "href") != self.new.attr(new_anchor, "href")
            && self.old.flatten_text(old_anchor) == self.new.flatten_text(new_anchor)
    }

    /// Emit an href-only anchor change: old anchor in a `del` wrapper, new
    /// anchor carrying the href-change class. The link pass decides whether
    /// this surfaces at all.
    fn emit_href_change(&mut self, old_anchor: NodeId, new_anchor: NodeId, out_parent: NodeId) {
        let wrapper = self.out.create_element(DEL_TAG);
        self.out.add_class(wrapper, RAW_HREF_CLASS);
        let old_copy = copy_subtree_detached(self.old, old_anchor, self.out);
        self.out.append(wrapper, old_copy);
        self.out.append(out_parent, wrapper);

        let new_copy = copy_subtree_detached(self.new, new_anchor, self.out);
        self.out.add_class(new_copy, RAW_HREF_CLASS);
        self.out.append(out_parent, new_copy);
    }

    /// Similar-enough text content means we diff inside the element instead
    /// of replacing it wholesale.
    fn is_modified_pair(&self, old_child: NodeId, new_child: NodeId) -> bool {
        let old_text = self.old.flatten_text(old_child);
        let new_text = self.new.flatten_text(new_child);
        if old_text.trim().is_empty() && new_text.trim().is_empty() {
            return true;
        }
        normalized_levenshtein(&old_text, &new_text) >= self.similarity_threshold
    }

    fn emit_deleted(&mut self, old_child: NodeId, out_parent: NodeId) {
        if self.old.is_whitespace_text(old_child) {
            return;
        }
        let marker = self.out.create_element(DEL_TAG);
        self.out.add_class(marker, RAW_DEL_CLASS);
        let copy = copy_subtree_detached(self.old, old_child, self.out);
        self.out.append(marker, copy);
        self.out.append(out_parent, marker);
    }

    fn emit_inserted(&mut self, new_child: NodeId, out_parent: NodeId) {
        if self.new.is_whitespace_text(new_child) {
            let copy = copy_subtree_detached(self.new, new_child, self.out);
            self.out.append(out_parent, copy);
            return;
        }
        let marker = self.out.create_element(INS_TAG);
        self.out.add_class(marker, RAW_INS_CLASS);
        let copy = copy_subtree_detached(self.new, new_child, self.out);
        self.out.append(marker, copy);
        self.out.append(out_parent, marker);
    }
}

/// Copy a subtree from a source tree into the output under `out_parent`.
fn copy_subtree(src: &DomTree, node: NodeId, out: &mut DomTree, out_parent: NodeId) {
    let copy = copy_subtree_detached(src, node, out);
    out.append(out_parent, copy);
}

/// Copy a subtree from a source tree into the output arena, detached.
fn copy_subtree_detached(src: &DomTree, node: NodeId, out: &mut DomTree) -> NodeId {
    let copy = copy_shallow(src, node, out);
    for &child in src.children(node) {
        let child_copy = copy_subtree_detached(src, child, out);
        out.append(copy, child_copy);
    }
    copy
}

/// Copy a single node (element shell with attributes, or text) without its
/// children.
fn copy_shallow(src: &DomTree, node: NodeId, out: &mut DomTree) -> NodeId {
    match src.tag(node) {
        Some(tag) => {
            let copy = out.create_element(tag.to_string());
            if let crate::dom::NodeData::Element { attrs, .. } = src.data(node) {
                for (name, value) in attrs {
                    out.set_attr(copy, name.clone(), value.clone());
                }
            }
            copy
        }
        None => out.create_text(src.text(node).unwrap_or_default().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Selector;

    fn diff(old: &str, new: &str) -> DomTree {
        StructuralDiffer::new().diff(old, new)
    }

    #[test]
    fn test_identical_inputs_produce_clean_copy() {
        let html = "<p>The sky is blue.</p>";
        let tree = diff(html, html);
        assert_eq!(tree.to_html(), html);
    }

    #[test]
    fn test_word_insertion_marked() {
        let tree = diff(
            "<p>The sky is blue.</p>",
            "<p>The sky is very blue today.</p>",
        );
        let html = tree.to_html();
        assert!(
            html.contains(r#"<ins class="diffins">very </ins>"#),
            "missing insertion marker: {html}"
        );
        assert!(
            html.contains(r#"<ins class="diffins"> today</ins>"#),
            "missing second insertion marker: {html}"
        );
        assert!(!html.contains("diffdel"), "no deletions expected: {html}");
    }

    #[test]
    fn test_word_replacement_marked_as_mod_pair() {
        let tree = diff("<p>the red sky</p>", "<p>the green sky</p>");
        let html = tree.to_html();
        assert!(html.contains(r#"<del class="diffmod">red</del>"#), "{html}");
        assert!(html.contains(r#"<ins class="diffmod">green</ins>"#), "{html}");
        // Delete comes before insert.
        let del_pos = html.find("diffmod\">red").expect("del present");
        let ins_pos = html.find("diffmod\">green").expect("ins present");
        assert!(del_pos < ins_pos);
    }

    #[test]
    fn test_added_block_wrapped_in_ins() {
        let tree = diff("<p>intro</p>", "<p>intro</p><ul><li>A</li><li>B</li></ul>");
        let markers = tree.select(&Selector::element("ins").with_class(RAW_INS_CLASS));
        assert_eq!(markers.len(), 1);
        let ul = tree.children(markers[0])[0];
        assert_eq!(tree.tag(ul), Some("ul"));
    }

    #[test]
    fn test_removed_block_wrapped_in_del() {
        let tree = diff("<p>a</p><p>b</p>", "<p>a</p>");
        let markers = tree.select(&Selector::element("del").with_class(RAW_DEL_CLASS));
        assert_eq!(markers.len(), 1);
        assert_eq!(tree.flatten_text(markers[0]), "b");
    }

    #[test]
    fn test_href_only_change_gets_href_markers() {
        let tree = diff(
            r#"<p><a href="/wiki/2049-09-28/Topic">Topic</a></p>"#,
            r#"<p><a href="/wiki/2049-10-01/Topic">Topic</a></p>"#,
        );
        let html = tree.to_html();
        assert!(html.contains(RAW_HREF_CLASS), "{html}");
        // Old anchor preserved inside a del wrapper, new one marked inline.
        let wrappers = tree.select(&Selector::element("del").with_class(RAW_HREF_CLASS));
        assert_eq!(wrappers.len(), 1);
        let new_anchor = tree.select(&Selector::element("a").with_class(RAW_HREF_CLASS));
        assert_eq!(new_anchor.len(), 1);
        assert_eq!(
            tree.attr(new_anchor[0], "href"),
            Some("/wiki/2049-10-01/Topic")
        );
    }

    #[test]
    fn test_anchor_text_change_is_not_href_only() {
        let tree = diff(
            r#"<p><a href="/a">Old label</a></p>"#,
            r#"<p><a href="/b">New label</a></p>"#,
        );
        let html = tree.to_html();
        assert!(!html.contains(RAW_HREF_CLASS), "{html}");
    }

    #[test]
    fn test_similar_paragraphs_diffed_in_place() {
        let tree = diff(
            "<p>The sky is blue and wide.</p>",
            "<p>The sky is green and wide.</p>",
        );
        // The <p> itself survives; only the changed word is marked.
        let paragraphs = tree.select(&Selector::element("p"));
        assert_eq!(paragraphs.len(), 1);
        assert!(tree.to_html().contains("diffmod"));
    }

    #[test]
    fn test_dissimilar_paragraphs_replaced_wholesale() {
        let tree = diff(
            "<p>Completely original wording here.</p>",
            "<p>Nothing at all like before.</p>",
        );
        let dels = tree.select(&Selector::element("del").with_class(RAW_DEL_CLASS));
        let inss = tree.select(&Selector::element("ins").with_class(RAW_INS_CLASS));
        assert_eq!(dels.len(), 1);
        assert_eq!(inss.len(), 1);
    }

    #[test]
    fn test_unparseable_inputs_degrade_to_empty() {
        let tree = diff("", "");
        assert!(tree.is_empty());
    }

    #[test]
    fn test_unchanged_siblings_not_marked() {
        let tree = diff(
            "<h2>Title</h2><p>stable</p><p>old text</p>",
            "<h2>Title</h2><p>stable</p><p>new text</p>",
        );
        let html = tree.to_html();
        assert!(html.starts_with("<h2>Title</h2><p>stable</p>"), "{html}");
    }
}
