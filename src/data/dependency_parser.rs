use std::collections::HashSet;

use crate::error::Result;
use crate::types::Sentence;

/// Tokenizer plus dependency parser that turns raw text into sentences.
///
/// Implementations are shared read-only across worker threads. Every string in
/// `tokenizer_exceptions` must come back as a single token.
pub trait DependencyParser: Send + Sync {
    fn parse(&self, text: &str, tokenizer_exceptions: &HashSet<String>) -> Result<Vec<Sentence>>;
}
