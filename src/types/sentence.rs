use std::collections::HashMap;

use crate::digraph::DependencyTree;
use crate::error::{AnnotateError, Result};
use crate::types::{AspectSentiments, Span, Token};

/// Tokens that attach to the preceding token without a space
const NO_SPACE_BEFORE: &[&str] = &[".", ",", ";", ":", "!", "?", ")", "]", "}", "%", "...", "n't"];
/// Tokens that attach to the following token without a space
const NO_SPACE_AFTER: &[&str] = &["(", "[", "{", "$", "#"];

/// A parsed sentence: tokens, their dependency tree, and the annotations the
/// pipeline stages write onto it.
///
/// Derived attributes start out absent and are filled in stage order. Spans are
/// owned by the sentence and referenced from tokens by index, so tokens that
/// resolve to the same range share one span.
#[derive(Debug, Clone)]
pub struct Sentence {
    tokens: Vec<Token>,
    tree: DependencyTree,
    spans: Vec<Span>,
    span_ids: HashMap<(usize, usize), usize>,
    pub(crate) contains_aspect: bool,
    pub(crate) aspects: Option<Vec<String>>,
    pub(crate) keywords: Option<Vec<usize>>,
    pub(crate) aspect_sentiments: AspectSentiments,
    pub(crate) anonymized: Option<String>,
}

impl Sentence {
    pub fn new(tokens: Vec<Token>, tree: DependencyTree) -> Result<Self> {
        if tokens.len() != tree.len() {
            return Err(AnnotateError::Configuration(format!(
                "sentence has {} tokens but its dependency tree has {} nodes",
                tokens.len(),
                tree.len()
            )));
        }
        if let Some(token) = tokens.iter().enumerate().find(|(i, t)| t.index != *i) {
            return Err(AnnotateError::Configuration(format!(
                "token '{}' at position {} carries index {}",
                token.1.text, token.0, token.1.index
            )));
        }

        Ok(Self {
            tokens,
            tree,
            spans: Vec::new(),
            span_ids: HashMap::new(),
            contains_aspect: false,
            aspects: None,
            keywords: None,
            aspect_sentiments: AspectSentiments::default(),
            anonymized: None,
        })
    }

    /// Build a sentence from parallel word/lemma slices and a head vector.
    pub fn from_heads(words: &[&str], lemmas: &[&str], heads: Vec<usize>) -> Result<Self> {
        if words.len() != lemmas.len() {
            return Err(AnnotateError::Configuration(format!(
                "{} words but {} lemmas",
                words.len(),
                lemmas.len()
            )));
        }
        let tokens = words
            .iter()
            .zip(lemmas)
            .enumerate()
            .map(|(i, (word, lemma))| Token::new(i, *word, *lemma))
            .collect();
        Self::new(tokens, DependencyTree::from_heads(heads)?)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub(crate) fn token_mut(&mut self, index: usize) -> &mut Token {
        &mut self.tokens[index]
    }

    pub fn tree(&self) -> &DependencyTree {
        &self.tree
    }

    pub fn head(&self, index: usize) -> usize {
        self.tree.head(index)
    }

    pub fn children(&self, index: usize) -> &[usize] {
        self.tree.children(index)
    }

    pub fn contains_aspect(&self) -> bool {
        self.contains_aspect
    }

    /// Aspects in order of first mention; `None` until detection found any.
    pub fn aspects(&self) -> Option<&[String]> {
        self.aspects.as_deref()
    }

    /// Indices of keyword tokens; `None` until detection found any.
    pub fn keywords(&self) -> Option<&[usize]> {
        self.keywords.as_deref()
    }

    pub fn keyword_tokens(&self) -> Option<impl Iterator<Item = &Token>> {
        self.keywords
            .as_ref()
            .map(|indices| indices.iter().map(move |&i| &self.tokens[i]))
    }

    pub fn aspect_sentiments(&self) -> &AspectSentiments {
        &self.aspect_sentiments
    }

    pub fn anonymized(&self) -> Option<&str> {
        self.anonymized.as_deref()
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn span(&self, id: usize) -> Option<&Span> {
        self.spans.get(id)
    }

    pub(crate) fn span_mut(&mut self, id: usize) -> &mut Span {
        &mut self.spans[id]
    }

    /// The resolved parent span of the token at `index`, if any.
    pub fn parent_span(&self, index: usize) -> Option<&Span> {
        self.tokens
            .get(index)?
            .parent_span
            .and_then(|id| self.spans.get(id))
    }

    /// Return the id of the span covering `[start, end)`, creating it if needed.
    pub(crate) fn intern_span(&mut self, start: usize, end: usize) -> usize {
        if let Some(&id) = self.span_ids.get(&(start, end)) {
            return id;
        }
        let id = self.spans.len();
        self.spans.push(Span::new(start, end));
        self.span_ids.insert((start, end), id);
        id
    }

    /// Drop every derived attribute so the pipeline can run again from scratch.
    pub(crate) fn reset_annotations(&mut self) {
        self.tokens.iter_mut().for_each(Token::clear_annotations);
        self.spans.clear();
        self.span_ids.clear();
        self.contains_aspect = false;
        self.aspects = None;
        self.keywords = None;
        self.aspect_sentiments = AspectSentiments::default();
        self.anonymized = None;
    }

    /// The whole sentence as text.
    pub fn text(&self) -> String {
        detokenize(self.tokens.iter().map(|t| t.text.as_str()))
    }

    /// Text covered by `span`.
    pub fn span_text(&self, span: &Span) -> String {
        let end = span.end.min(self.tokens.len());
        let start = span.start.min(end);
        detokenize(self.tokens[start..end].iter().map(|t| t.text.as_str()))
    }
}

/// Join token texts back into running text.
pub fn detokenize<'a>(words: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    let mut glue_next = true;
    for word in words {
        let attaches = NO_SPACE_BEFORE.contains(&word) || word.starts_with('\'');
        if !glue_next && !attaches {
            out.push(' ');
        }
        out.push_str(word);
        glue_next = NO_SPACE_AFTER.contains(&word);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn professor_sentence() -> Sentence {
        Sentence::from_heads(
            &["the", "professor", "was", "mean", "."],
            &["the", "professor", "be", "mean", "."],
            vec![1, 2, 2, 2, 2],
        )
        .unwrap()
    }

    #[test]
    fn test_detokenize() {
        assert_eq!(
            detokenize(["I", "enjoyed", "the", "course", ",", "but", "it", "was", "n't", "fun", "."]),
            "I enjoyed the course, but it wasn't fun."
        );
        assert_eq!(detokenize(["the", "(", "final", ")", "exam", "'s", "grade"]), "the (final) exam's grade");
        assert_eq!(detokenize(Vec::<&str>::new()), "");
    }

    #[test]
    fn test_span_text() {
        let sentence = professor_sentence();
        assert_eq!(sentence.text(), "the professor was mean.");
        assert_eq!(sentence.span_text(&Span::new(0, 4)), "the professor was mean");
        assert_eq!(sentence.span_text(&Span::new(3, 9)), "mean.");
    }

    #[test]
    fn test_intern_span_deduplicates() {
        let mut sentence = professor_sentence();
        let a = sentence.intern_span(0, 4);
        let b = sentence.intern_span(1, 4);
        let c = sentence.intern_span(0, 4);
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(sentence.spans().len(), 2);
    }

    #[test]
    fn test_rejects_mismatched_tree() {
        let tree = DependencyTree::from_heads(vec![0, 0]).unwrap();
        let tokens = vec![Token::new(0, "hi", "hi")];
        assert!(matches!(
            Sentence::new(tokens, tree),
            Err(AnnotateError::Configuration(_))
        ));
    }

    #[test]
    fn test_new_sentence_has_no_annotations() {
        let sentence = professor_sentence();
        assert!(!sentence.contains_aspect());
        assert!(sentence.aspects().is_none());
        assert!(sentence.keywords().is_none());
        assert!(sentence.aspect_sentiments().is_empty());
        assert!(sentence.parent_span(1).is_none());
    }
}
