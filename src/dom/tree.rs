//! Arena-based DOM tree with stable node handles.

use indexmap::IndexMap;
use xxhash_rust::xxh3::Xxh3;

/// Handle to a node in a [`DomTree`] arena.
///
/// Handles stay valid for the lifetime of the tree; detaching a node does not
/// invalidate handles into its subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Payload of a single node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// An element with a lowercase tag name and ordered attributes.
    Element {
        tag: String,
        attrs: IndexMap<String, String>,
    },
    /// A text run.
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An owned, mutable DOM fragment.
///
/// The tree always has a synthetic root; parsed fragment content hangs off
/// it. Detached nodes remain in the arena but are unreachable from the root.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create an empty tree containing only the synthetic root.
    pub fn new() -> Self {
        let root = Node {
            data: NodeData::Element {
                tag: "#fragment".to_string(),
                attrs: IndexMap::new(),
            },
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// The synthetic fragment root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// True when the tree holds no content beyond the root.
    pub fn is_empty(&self) -> bool {
        self.nodes[self.root.0].children.is_empty()
    }

    // ------------------------------------------------------------------
    // Node creation
    // ------------------------------------------------------------------

    /// Create a detached element node.
    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.push_node(NodeData::Element {
            tag: tag.into(),
            attrs: IndexMap::new(),
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push_node(NodeData::Text(text.into()))
    }

    fn push_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Node payload.
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    /// Element tag name, or `None` for text nodes.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { tag, .. } => Some(tag.as_str()),
            NodeData::Text(_) => None,
        }
    }

    /// True when the node is an element with the given tag name.
    pub fn is_element(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id) == Some(tag)
    }

    /// Text content for text nodes, `None` for elements.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Text(text) => Some(text.as_str()),
            NodeData::Element { .. } => None,
        }
    }

    /// True for a text node consisting solely of whitespace.
    pub fn is_whitespace_text(&self, id: NodeId) -> bool {
        self.text(id)
            .is_some_and(|t| t.chars().all(char::is_whitespace))
    }

    /// Parent handle, `None` for the root and detached nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Child handles in document order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Position of a node within its parent's child list.
    pub fn sibling_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// The next sibling, if any.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let idx = self.sibling_index(id)?;
        self.children(parent).get(idx + 1).copied()
    }

    /// True when the node is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(p) => current = p,
                None => return false,
            }
        }
    }

    /// Pre-order traversal of the subtree rooted at `id`, including `id`.
    ///
    /// Collected up front so callers can mutate while iterating; check
    /// [`Self::is_attached`] before touching stale handles.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Walk ancestors from the parent of `id` up to (and including) the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            out.push(node);
            current = self.parent(node);
        }
        out
    }

    /// Concatenated text content of the subtree.
    pub fn flatten_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(text) = self.text(node) {
                out.push_str(text);
            }
        }
        out
    }

    // ------------------------------------------------------------------
    // Attributes and classes
    // ------------------------------------------------------------------

    /// Attribute value on an element.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            NodeData::Text(_) => None,
        }
    }

    /// Set an attribute on an element; no-op on text nodes.
    pub fn set_attr(&mut self, id: NodeId, name: impl Into<String>, value: impl Into<String>) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id.0].data {
            attrs.insert(name.into(), value.into());
        }
    }

    /// Remove an attribute from an element.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id.0].data {
            attrs.shift_remove(name);
        }
    }

    /// Whitespace-separated class list.
    pub fn classes(&self, id: NodeId) -> Vec<String> {
        self.attr(id, "class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// True when the element carries the given class.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|c| c.split_whitespace().any(|existing| existing == class))
    }

    /// Add a class, preserving order and uniqueness.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        let mut classes = self.classes(id);
        classes.push(class.to_string());
        self.set_attr(id, "class", classes.join(" "));
    }

    /// Remove a class; drops the attribute entirely when no classes remain.
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        let classes: Vec<String> = self
            .classes(id)
            .into_iter()
            .filter(|c| c != class)
            .collect();
        if classes.is_empty() {
            self.remove_attr(id, "class");
        } else {
            self.set_attr(id, "class", classes.join(" "));
        }
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Append a child as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `new` immediately before `reference` in its parent.
    ///
    /// No-op when `reference` has no parent.
    pub fn insert_before(&mut self, reference: NodeId, new: NodeId) {
        let Some(parent) = self.parent(reference) else {
            return;
        };
        self.detach(new);
        let idx = self
            .sibling_index(reference)
            .unwrap_or(self.children(parent).len());
        self.nodes[new.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(idx, new);
    }

    /// Insert `new` immediately after `reference` in its parent.
    pub fn insert_after(&mut self, reference: NodeId, new: NodeId) {
        let Some(parent) = self.parent(reference) else {
            return;
        };
        self.detach(new);
        let idx = self
            .sibling_index(reference)
            .map(|i| i + 1)
            .unwrap_or(self.children(parent).len());
        self.nodes[new.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(idx, new);
    }

    /// Remove a node from its parent. The subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            self.nodes[parent.0].children.retain(|&c| c != id);
            self.nodes[id.0].parent = None;
        }
    }

    /// Replace a node with its own children, then detach it.
    ///
    /// No-op when the node has no parent (already detached, or the root).
    pub fn unwrap_node(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let Some(idx) = self.sibling_index(id) else {
            return;
        };
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for (offset, &child) in children.iter().enumerate() {
            self.nodes[child.0].parent = Some(parent);
            self.nodes[parent.0].children.insert(idx + offset, child);
        }
        self.nodes[parent.0].children.retain(|&c| c != id);
        self.nodes[id.0].parent = None;
    }

    /// Wrap a node in `wrapper`: the wrapper takes the node's place and the
    /// node becomes its only child.
    pub fn wrap(&mut self, id: NodeId, wrapper: NodeId) {
        self.insert_before(id, wrapper);
        self.append(wrapper, id);
    }

    /// Deep-copy a subtree into this tree, returning the detached copy root.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let data = self.nodes[id.0].data.clone();
        let copy = self.push_node(data);
        let children: Vec<NodeId> = self.children(id).to_vec();
        for child in children {
            let child_copy = self.clone_subtree(child);
            self.append(copy, child_copy);
        }
        copy
    }

    // ------------------------------------------------------------------
    // Hashing
    // ------------------------------------------------------------------

    /// Structural hash of the subtree (tag, attributes, text, children).
    ///
    /// Used by the differ to prune unchanged regions in O(1).
    pub fn subtree_hash(&self, id: NodeId) -> u64 {
        let mut hasher = Xxh3::new();
        self.hash_into(id, &mut hasher);
        hasher.digest()
    }

    fn hash_into(&self, id: NodeId, hasher: &mut Xxh3) {
        match &self.nodes[id.0].data {
            NodeData::Element { tag, attrs } => {
                hasher.update(b"e");
                hasher.update(tag.as_bytes());
                for (name, value) in attrs {
                    hasher.update(name.as_bytes());
                    hasher.update(b"=");
                    hasher.update(value.as_bytes());
                    hasher.update(b";");
                }
            }
            NodeData::Text(text) => {
                hasher.update(b"t");
                hasher.update(text.as_bytes());
            }
        }
        hasher.update(b"[");
        for &child in self.children(id) {
            self.hash_into(child, hasher);
        }
        hasher.update(b"]");
    }
}
