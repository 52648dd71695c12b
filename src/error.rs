//! Error types for the annotation pipeline

use std::path::PathBuf;
use thiserror::Error;

use crate::digraph::GraphError;

/// Errors raised synchronously to the caller of the pipeline.
#[derive(Debug, Error)]
pub enum AnnotateError {
    /// Taxonomy or pipeline configuration is unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A boolean-only parameter received something else.
    #[error("invalid flag `{name}`: expected a boolean, found {found}")]
    InvalidFlag { name: String, found: String },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Format { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, AnnotateError>;
