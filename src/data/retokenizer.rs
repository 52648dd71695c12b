//! Merges tokens that spell out a multi-word keyword into a single token.
//!
//! Parsers split keywords such as "mid-term" or "mid term" into several tokens.
//! Sentences arrive already parsed, so instead of registering tokenizer
//! exceptions up front the split pieces are merged back afterwards: the merged
//! token takes the keyword as its lemma and inherits the head of the group's
//! top-most token.

use log::debug;
use regex::Regex;

use crate::aspects::AspectTaxonomy;
use crate::digraph::DependencyTree;
use crate::error::Result;
use crate::types::{Sentence, Token};

/// Pieces a tokenizer typically produces for a keyword: words and the separators between them
const PIECE_PATTERN: &str = r"[^\s\-/']+|[\-/']";

#[derive(Debug, Clone)]
struct Piece {
    text: String,
    /// Whitespace separates this piece from the previous one
    spaced: bool,
}

#[derive(Debug, Clone)]
struct Expression {
    keyword: String,
    pieces: Vec<Piece>,
}

/// A matched group of tokens `[start, end)` and the expression it spells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeMatch {
    pub start: usize,
    pub end: usize,
    expression: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MultiWordMerger {
    /// Longest expressions first
    expressions: Vec<Expression>,
}

impl MultiWordMerger {
    pub fn new<'a>(keywords: impl IntoIterator<Item = &'a str>) -> Self {
        let piece_re = Regex::new(PIECE_PATTERN).expect("piece pattern is a valid regex");
        let mut expressions: Vec<Expression> = keywords
            .into_iter()
            .filter_map(|keyword| {
                let keyword = keyword.to_lowercase();
                let mut pieces = Vec::new();
                let mut last_end = 0;
                for m in piece_re.find_iter(&keyword) {
                    pieces.push(Piece {
                        text: m.as_str().to_string(),
                        spaced: m.start() > last_end,
                    });
                    last_end = m.end();
                }
                (pieces.len() > 1).then_some(Expression { keyword, pieces })
            })
            .collect();
        expressions.sort_by(|a, b| b.pieces.len().cmp(&a.pieces.len()));
        Self { expressions }
    }

    pub fn from_taxonomy(taxonomy: &AspectTaxonomy) -> Self {
        Self::new(taxonomy.multi_word_keywords())
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    /// Non-overlapping matches, scanning left to right and preferring longer expressions.
    pub fn find_matches(&self, sentence: &Sentence) -> Vec<MergeMatch> {
        let words: Vec<String> = sentence.tokens().iter().map(|t| t.text.to_lowercase()).collect();
        let mut matches = Vec::new();
        let mut i = 0;

        while i < words.len() {
            let found = self
                .expressions
                .iter()
                .enumerate()
                .find(|(_, expr)| expr.matches_at(&words, i));
            match found {
                Some((expression, expr)) => {
                    let end = i + expr.pieces.len();
                    matches.push(MergeMatch { start: i, end, expression });
                    i = end;
                }
                None => i += 1,
            }
        }
        matches
    }

    /// Merge every matched group and rebuild the dependency tree.
    pub fn apply(&self, sentence: Sentence) -> Result<Sentence> {
        let matches = self.find_matches(&sentence);
        if matches.is_empty() {
            return Ok(sentence);
        }

        let tree = sentence.tree();
        let len = sentence.len();

        // old token index -> new token index
        let mut new_index = vec![0; len];
        // (representative old index, merged text and lemma if any)
        let mut groups: Vec<(usize, Option<(String, String)>)> = Vec::new();
        let mut cursor = 0;
        let mut pending = matches.iter().peekable();

        while cursor < len {
            match pending.peek() {
                Some(m) if m.start == cursor => {
                    let expr = &self.expressions[m.expression];
                    let representative = (m.start..m.end)
                        .min_by_key(|&t| tree.ancestors(t).len())
                        .unwrap_or(m.start);
                    let text = expr.join(&sentence.tokens()[m.start..m.end]);
                    for old in m.start..m.end {
                        new_index[old] = groups.len();
                    }
                    debug!(
                        "Merging tokens {}..{} into '{}' (lemma '{}')",
                        m.start, m.end, text, expr.keyword
                    );
                    groups.push((representative, Some((text, expr.keyword.clone()))));
                    cursor = m.end;
                    pending.next();
                }
                _ => {
                    new_index[cursor] = groups.len();
                    groups.push((cursor, None));
                    cursor += 1;
                }
            }
        }

        let mut tokens = Vec::with_capacity(groups.len());
        let mut heads = Vec::with_capacity(groups.len());
        for (index, (representative, merged)) in groups.into_iter().enumerate() {
            let source = &sentence.tokens()[representative];
            let mut token = match merged {
                Some((text, lemma)) => Token::new(index, text, lemma),
                None => Token::new(index, source.text.clone(), source.lemma.clone()),
            };
            token.tag = source.tag.clone();
            token.entity = source.entity.clone();
            tokens.push(token);

            let head = new_index[tree.head(representative)];
            heads.push(if tree.is_root(representative) { index } else { head });
        }

        Sentence::new(tokens, DependencyTree::from_heads(heads)?)
    }
}

impl Expression {
    fn matches_at(&self, words: &[String], start: usize) -> bool {
        let last = self.pieces.len() - 1;
        if start + self.pieces.len() > words.len() {
            return false;
        }
        self.pieces.iter().enumerate().all(|(j, piece)| {
            let word = &words[start + j];
            *word == piece.text
                || (j == last && word.strip_suffix('s') == Some(piece.text.as_str()))
        })
    }

    /// Re-join the matched tokens with this expression's separators.
    fn join(&self, tokens: &[Token]) -> String {
        let mut text = String::new();
        for (piece, token) in self.pieces.iter().zip(tokens) {
            if piece.spaced && !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&token.text);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The mid - terms were horrible . I wish the mid term was less boring .
    fn mid_term_sentence() -> Sentence {
        let words = [
            "The", "mid", "-", "terms", "were", "horrible", ".", "I", "wish", "the", "mid", "term",
            "was", "less", "boring", ".",
        ];
        let lemmas = [
            "the", "mid", "-", "term", "be", "horrible", ".", "I", "wish", "the", "mid", "term",
            "be", "less", "boring", ".",
        ];
        let heads = vec![3, 3, 3, 4, 4, 4, 4, 8, 8, 11, 11, 12, 8, 14, 12, 8];
        Sentence::from_heads(&words, &lemmas, heads).unwrap()
    }

    #[test]
    fn test_expression_pieces() {
        let merger = MultiWordMerger::new(["mid-term", "mid term", "exam"]);
        assert_eq!(merger.expressions.len(), 2);
        let pieces: Vec<_> = merger.expressions[0].pieces.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(pieces, vec!["mid", "-", "term"]);
    }

    #[test]
    fn test_merges_plural_and_spaced_forms() {
        let merger = MultiWordMerger::new(["mid-term", "mid term"]);
        let merged = merger.apply(mid_term_sentence()).unwrap();

        assert_eq!(merged.len(), 13);
        let first = merged.token(1).unwrap();
        assert_eq!(first.text, "mid-terms");
        assert_eq!(first.lemma, "mid-term");
        let second = merged.token(8).unwrap();
        assert_eq!(second.text, "mid term");
        assert_eq!(second.lemma, "mid term");
    }

    #[test]
    fn test_merged_tree_is_rewired() {
        let merger = MultiWordMerger::new(["mid-term", "mid term"]);
        let merged = merger.apply(mid_term_sentence()).unwrap();

        // "The" hung off "terms", now off the merged token
        assert_eq!(merged.head(0), 1);
        // merged "mid-terms" keeps the head of "terms" ("were")
        assert_eq!(merged.head(1), 2);
        // "the" hung off "term", now off merged "mid term"
        assert_eq!(merged.head(7), 8);
        assert_eq!(merged.head(8), 9);
        assert_eq!(merged.tree().roots(), vec![2, 6]);
        assert_eq!(merged.text(), "The mid-terms were horrible. I wish the mid term was less boring.");
    }

    #[test]
    fn test_no_match_returns_sentence_unchanged() {
        let merger = MultiWordMerger::new(["power/point"]);
        let sentence = mid_term_sentence();
        let heads = sentence.tree().heads().to_vec();
        let same = merger.apply(sentence).unwrap();
        assert_eq!(same.tree().heads(), heads.as_slice());
    }

    #[test]
    fn test_empty_merger() {
        assert!(MultiWordMerger::new(["exam", "quiz"]).is_empty());
        assert!(MultiWordMerger::from_taxonomy(&AspectTaxonomy::default_education())
            .find_matches(&mid_term_sentence())
            .len()
            == 1);
    }
}
