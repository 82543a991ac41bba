//! Structural selectors over the owned tree.
//!
//! A deliberately small query layer: tag name, class and attribute
//! predicates plus descendant/ancestor traversal. The alteration passes need
//! nothing more.

use super::tree::{DomTree, NodeId};

/// A structural element predicate, built fluently.
///
/// ```
/// use wiki_changes::dom::Selector;
///
/// let marker = Selector::element("ins").with_class("diffins");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Selector {
    tag: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

impl Selector {
    /// Match any element.
    pub fn any() -> Self {
        Self::default()
    }

    /// Match elements with the given tag name.
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }

    /// Require a class.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Require an attribute to be present, regardless of value.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>) -> Self {
        self.attrs.push((name.into(), None));
        self
    }

    /// Require an attribute with an exact value.
    #[must_use]
    pub fn with_attr_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), Some(value.into())));
        self
    }

    /// Test a single node against this selector. Text nodes never match.
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        let Some(tag) = tree.tag(id) else {
            return false;
        };
        if tag.starts_with('#') {
            // Synthetic root.
            return false;
        }
        if let Some(expected) = &self.tag {
            if tag != expected {
                return false;
            }
        }
        for class in &self.classes {
            if !tree.has_class(id, class) {
                return false;
            }
        }
        for (name, value) in &self.attrs {
            match (tree.attr(id, name), value) {
                (None, _) => return false,
                (Some(actual), Some(expected)) if actual != expected => return false,
                _ => {}
            }
        }
        true
    }
}

impl DomTree {
    /// All elements matching `selector`, in document order.
    pub fn select(&self, selector: &Selector) -> Vec<NodeId> {
        self.select_in(self.root(), selector)
    }

    /// Matching elements within the subtree rooted at `scope` (exclusive).
    pub fn select_in(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&id| id != scope && selector.matches(self, id))
            .collect()
    }

    /// Nearest ancestor matching `selector`, if any.
    pub fn closest_ancestor(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        self.ancestors(id)
            .into_iter()
            .find(|&ancestor| selector.matches(self, ancestor))
    }
}
