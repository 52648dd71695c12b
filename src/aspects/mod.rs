//! Aspect taxonomy: named topics and the keyword lemmas that signal them.

pub mod source;
pub mod taxonomy;

pub use source::AspectSource;
pub use taxonomy::{Aspect, AspectTaxonomy};
