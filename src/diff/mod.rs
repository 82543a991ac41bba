//! HTML structural diffing.
//!
//! [`HtmlDiffer`] is the seam to the diff algorithm: given two rendered HTML
//! strings it returns one merged tree annotated with the raw marker
//! vocabulary in [`markup`]. The bundled [`StructuralDiffer`] is the default
//! implementation; hosts may swap in another differ as long as it emits the
//! same vocabulary.

pub mod engine;
pub mod markup;
pub mod words;

pub use engine::{HtmlDiffer, StructuralDiffer};
