//! HTML serialization for [`DomTree`] fragments.

use super::tree::{DomTree, NodeData, NodeId};

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

impl DomTree {
    /// Serialize the whole fragment (children of the synthetic root).
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for &child in self.children(self.root()) {
            self.serialize_node(child, &mut out);
        }
        out
    }

    /// Serialize a single subtree.
    pub fn node_to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.serialize_node(id, &mut out);
        out
    }

    fn serialize_node(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            NodeData::Text(text) => out.push_str(&escape_text(text)),
            NodeData::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                for &child in self.children(id) {
                    self.serialize_node(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_fragment_lenient;

    #[test]
    fn test_roundtrip_simple() {
        let html = r#"<p class="lede">The sky is <em>blue</em>.</p>"#;
        let tree = parse_fragment_lenient(html);
        assert_eq!(tree.to_html(), html);
    }

    #[test]
    fn test_text_escaping() {
        let mut tree = DomTree::new();
        let text = tree.create_text("a < b & c > d");
        tree.append(tree.root(), text);
        assert_eq!(tree.to_html(), "a &lt; b &amp; c &gt; d");
    }

    #[test]
    fn test_attr_escaping() {
        let mut tree = DomTree::new();
        let a = tree.create_element("a");
        tree.set_attr(a, "title", r#"say "hi" & more"#);
        tree.append(tree.root(), a);
        assert_eq!(tree.to_html(), r#"<a title="say &quot;hi&quot; &amp; more"></a>"#);
    }

    #[test]
    fn test_void_elements_have_no_closing_tag() {
        let tree = parse_fragment_lenient(r#"<p>line<br>break</p>"#);
        assert_eq!(tree.to_html(), "<p>line<br>break</p>");
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let html = r#"<div id="x" class="y" data-z="1"><span>s</span></div>"#;
        let tree = parse_fragment_lenient(html);
        assert_eq!(tree.to_html(), tree.to_html());
        assert_eq!(tree.to_html(), html);
    }
}
