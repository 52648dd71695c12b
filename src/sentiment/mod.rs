//! Polarity scoring of rendered span text.
//!
//! The pipeline only depends on the [`PolarityScorer`] trait and reads the
//! `compound` field of its output. [`LexiconScorer`] is the bundled rule-based
//! implementation.

pub mod lexicon;

pub use lexicon::LexiconScorer;

use serde::Serialize;

/// Polarity breakdown of a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PolarityScores {
    pub negative: f64,
    pub neutral: f64,
    pub positive: f64,
    /// Normalized overall polarity in [-1.0, 1.0]
    pub compound: f64,
}

/// A pure, thread-safe text scorer shared by every pipeline invocation.
///
/// Implementations must be deterministic: the same text always yields the same
/// scores.
pub trait PolarityScorer: Send + Sync {
    fn polarity_scores(&self, text: &str) -> PolarityScores;

    fn compound(&self, text: &str) -> f64 {
        self.polarity_scores(text).compound
    }
}
