use thiserror::Error;

/// Errors that can occur while building a dependency tree
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("Dependency tree has no tokens")]
    Empty,

    #[error("Node index out of bounds: {index} (token count: {len})")]
    NodeOutOfBounds { index: usize, len: usize },

    #[error("Head chain starting at token {0} never reaches a root")]
    Cycle(usize),
}
