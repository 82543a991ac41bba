//! Owned DOM tree and query layer.
//!
//! The alteration pipeline mutates diff markup in place, so the tree is an
//! arena of nodes addressed by [`NodeId`] handles rather than a pointer
//! graph. Parsing is lenient: rendered revision markup frequently contains
//! near-valid HTML and must never fail the build.

mod parse;
mod query;
mod serialize;
mod tree;

pub use parse::parse_fragment_lenient;
pub use query::Selector;
pub use tree::{DomTree, NodeData, NodeId};
