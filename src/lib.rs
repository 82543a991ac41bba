//! **A library for diffing and normalizing rendered wiki revisions.**
//!
//! `wiki-changes` compares the rendered HTML of two dated revisions of a
//! wiki page and produces a normalized change fragment: additions, removals
//! and changed regions are marked up with a stable, theme-friendly class
//! vocabulary instead of the diff engine's raw `ins`/`del` tags.
//!
//! The library powers both a CLI driver (diff two HTML files) and a host
//! CMS integration: the host implements a few collaborator traits
//! (rendering, revision storage, access control) and gets orchestration,
//! per-permission-variant caching and cache warming on top.
//!
//! ## Core Concepts & Modules
//!
//! - **[`dom`]**: An owned DOM tree parsed leniently from HTML fragments,
//!   with the mutation primitives and structural queries the alteration
//!   passes need.
//! - **[`diff`]**: The [`HtmlDiffer`] trait and its default
//!   [`StructuralDiffer`], which merges two revision trees into one tree
//!   carrying raw change markers.
//! - **[`alter`]**: The ordered [`AlterPipeline`] of DOM passes that turn
//!   raw markers into the stable output vocabulary.
//! - **[`build`]**: The [`ChangeBuilder`] orchestrator tying rendering,
//!   diffing and caching together per permission variant.
//! - **[`cache`]**: Tag-aware artifact caching with deterministic variant
//!   keys and single-flight build coordination.
//! - **[`warmer`]**: Batch cache warming with cursor-based resumption and
//!   account impersonation.
//!
//! ## Getting Started: Diffing Two Fragments
//!
//! ```
//! use wiki_changes::alter::AlterPipeline;
//! use wiki_changes::config::ChangesConfig;
//! use wiki_changes::diff::{HtmlDiffer, StructuralDiffer};
//!
//! let differ = StructuralDiffer::new();
//! let mut tree = differ.diff(
//!     "<p>The sky is blue.</p>",
//!     "<p>The sky is very blue today.</p>",
//! );
//! AlterPipeline::standard(&ChangesConfig::default()).run(&mut tree);
//!
//! let fragment = tree.to_html();
//! assert!(fragment.contains("wiki-changes__diff--added"));
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // Doc completeness: # Errors / # Panics sections are aspirational
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    // Variable names like `old`/`new` are clear in context
    clippy::similar_names
)]

pub mod alter;
pub mod build;
pub mod cache;
pub mod cli;
pub mod config;
pub mod diff;
pub mod dom;
pub mod error;
pub mod model;
pub mod variants;
pub mod warmer;

// Re-export the types most integrations touch.
pub use alter::{AlterPass, AlterPipeline};
pub use build::{BuildOutcome, ChangeBuilder, PageStore, RevisionRenderer};
pub use cache::{CacheStore, CacheVariantKey, ChangeCache, MemoryCacheStore};
pub use config::ChangesConfig;
pub use diff::{HtmlDiffer, StructuralDiffer};
pub use dom::DomTree;
pub use error::{Result, WikiDiffError};
pub use model::{CacheMetadata, ChangeArtifact, Revision, RevisionId, WikiPageId};
pub use warmer::{AccountSwitcher, CacheWarmer, WarmReport};
