use serde::{Deserialize, Serialize};

/// A half-open token range `[start, end)` within a sentence.
///
/// Two spans are equal when their ranges are equal; the sentiment score is an
/// annotation on the span, not part of its identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    /// Compound polarity in [-1.0, 1.0], set by the sentiment stage
    pub sentiment: Option<f64>,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            sentiment: None,
        }
    }

    pub fn length(&self) -> usize {
        self.end - self.start
    }

}

impl PartialEq for Span {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end
    }
}

impl Eq for Span {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_sentiment() {
        let mut scored = Span::new(2, 5);
        scored.sentiment = Some(-0.4);
        assert_eq!(scored, Span::new(2, 5));
        assert_ne!(scored, Span::new(2, 6));
    }

    #[test]
    fn test_length() {
        assert_eq!(Span::new(2, 4).length(), 2);
        assert_eq!(Span::new(0, 17).length(), 17);
    }
}
