//! Dependency tree over the tokens of a single sentence.

pub mod error;
pub mod graph;

pub use error::GraphError;
pub use graph::DependencyTree;
