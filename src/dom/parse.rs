//! Lenient HTML fragment parsing.
//!
//! Rendered revisions routinely contain near-valid HTML (block elements in
//! inline contexts, stray closing tags). Structural parse errors are
//! collected and logged at debug level, never propagated; an input that
//! cannot be parsed at all yields an empty tree.

use html5ever::tendril::TendrilSink;
use html5ever::{local_name, namespace_url, ns, parse_fragment, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use tracing::debug;

use super::tree::DomTree;
use super::NodeId;

/// Parse an HTML fragment into an owned [`DomTree`].
///
/// The fragment is parsed as `<body>` content. Comments, doctypes and
/// processing instructions are dropped; text nodes (including
/// whitespace-only runs) are preserved since list handling depends on them.
pub fn parse_fragment_lenient(html: &str) -> DomTree {
    let context = QualName::new(None, ns!(html), local_name!("body"));
    let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, vec![]).one(html);

    let errors = &dom.errors;
    if !errors.is_empty() {
        debug!(
            error_count = errors.len(),
            first = %errors[0],
            "suppressed HTML parse errors"
        );
    }

    let mut tree = DomTree::new();
    let root = tree.root();
    for child in fragment_children(&dom.document) {
        convert_into(&child, &mut tree, root);
    }
    tree
}

/// Locate the actual fragment nodes under the parser's document node.
///
/// Fragment parsing wraps output in a synthetic `<html>` element; unwrap it
/// when present so callers see the fragment content directly.
fn fragment_children(document: &Handle) -> Vec<Handle> {
    let children = document.children.borrow();
    if children.len() == 1 {
        if let RcNodeData::Element { ref name, .. } = children[0].data {
            if name.local.as_ref() == "html" {
                return children[0].children.borrow().clone();
            }
        }
    }
    children.clone()
}

fn convert_into(handle: &Handle, tree: &mut DomTree, parent: NodeId) {
    match &handle.data {
        RcNodeData::Element { name, attrs, .. } => {
            let element = tree.create_element(name.local.to_string());
            for attr in attrs.borrow().iter() {
                tree.set_attr(element, attr.name.local.to_string(), attr.value.to_string());
            }
            tree.append(parent, element);
            for child in handle.children.borrow().iter() {
                convert_into(child, tree, element);
            }
        }
        RcNodeData::Text { contents } => {
            let text = contents.borrow().to_string();
            if !text.is_empty() {
                let node = tree.create_text(text);
                tree.append(parent, node);
            }
        }
        // Comments, doctypes and PIs carry no diffable content.
        RcNodeData::Comment { .. }
        | RcNodeData::Doctype { .. }
        | RcNodeData::ProcessingInstruction { .. }
        | RcNodeData::Document => {}
    }
}
