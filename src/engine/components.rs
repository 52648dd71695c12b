//! The annotation stages, in the order the engine runs them.
//!
//! Each stage reads what earlier stages wrote onto the sentence and adds its own
//! attributes. A stage whose input is absent (a sentence without any aspect)
//! leaves the sentence untouched. Every stage computes its result first and
//! writes it in one go, so a sentence is never left half-annotated.

use std::collections::HashMap;

use log::debug;

use crate::aspects::AspectTaxonomy;
use crate::digraph::DependencyTree;
use crate::engine::constants::*;
use crate::sentiment::PolarityScorer;
use crate::types::sentence::detokenize;
use crate::types::{AspectSentiments, Sentence, Token};

/// Flag whether any token's lemma is a taxonomy keyword.
pub fn set_contains_aspect(sentence: &mut Sentence, taxonomy: &AspectTaxonomy) {
    sentence.contains_aspect = sentence
        .tokens()
        .iter()
        .any(|token| taxonomy.is_keyword(&token.normalized_lemma()));
}

/// List aspects in the order they are first evidenced in the sentence.
pub fn set_aspects(sentence: &mut Sentence, taxonomy: &AspectTaxonomy) {
    if !sentence.contains_aspect {
        return;
    }

    let mut aspects: Vec<String> = Vec::new();
    for token in sentence.tokens() {
        let lemma = token.normalized_lemma();
        for aspect in taxonomy.iter() {
            if aspects.contains(&aspect.name) {
                continue;
            }
            if aspect.keywords.contains(&lemma) {
                aspects.push(aspect.name.clone());
            }
        }
    }
    sentence.aspects = Some(aspects);
}

/// Collect every keyword token, in sentence order.
pub fn set_keywords(sentence: &mut Sentence, taxonomy: &AspectTaxonomy) {
    if !sentence.contains_aspect {
        return;
    }

    let keywords = sentence
        .tokens()
        .iter()
        .filter(|token| taxonomy.is_keyword(&token.normalized_lemma()))
        .map(|token| token.index)
        .collect();
    sentence.keywords = Some(keywords);
}

/// Label each keyword token with the first aspect that lists its lemma.
pub fn set_token_aspects(sentence: &mut Sentence, taxonomy: &AspectTaxonomy) {
    let Some(keywords) = sentence.keywords.clone() else {
        return;
    };

    let assignments: Vec<(usize, String)> = keywords
        .iter()
        .filter_map(|&index| {
            let token = &sentence.tokens()[index];
            if token.aspect.is_some() {
                return None;
            }
            taxonomy
                .aspect_for(&token.normalized_lemma())
                .map(|aspect| (index, aspect.to_string()))
        })
        .collect();

    for (index, aspect) in assignments {
        sentence.token_mut(index).aspect = Some(aspect);
    }
}

/// Tokens a span-level stage works on: every token, or only the keywords.
fn target_tokens(sentence: &Sentence, include_non_keywords: bool) -> Option<Vec<usize>> {
    if include_non_keywords {
        Some((0..sentence.len()).collect())
    } else {
        sentence.keywords.clone()
    }
}

/// Resolve the parent span of every target token.
pub fn set_token_parent_span(
    sentence: &mut Sentence,
    min_length: usize,
    include_non_keywords: bool,
) {
    let Some(targets) = target_tokens(sentence, include_non_keywords) else {
        return;
    };

    let bounds: Vec<(usize, (usize, usize))> = targets
        .iter()
        .map(|&index| (index, resolve_parent_span(sentence.tree(), index, min_length)))
        .collect();

    for (index, (start, end)) in bounds {
        let id = sentence.intern_span(start, end);
        sentence.token_mut(index).parent_span = Some(id);
    }
}

/// Compute the parent span `[start, end)` of `token`.
///
/// The base span covers the whole subtree of the token's head. While it is
/// shorter than `min_length` and the head is not a root, the head's own head is
/// used instead. If climbing bottoms out, the span is widened symmetrically.
pub fn resolve_parent_span(
    tree: &DependencyTree,
    token: usize,
    min_length: usize,
) -> (usize, usize) {
    let mut head = tree.head(token);
    let (mut start, mut end) = tree.subtree_bounds(head);

    // A head chain is never longer than the sentence.
    let mut climbs = 0;
    while end - start < min_length && !tree.is_root(head) && climbs < tree.len() {
        head = tree.head(head);
        (start, end) = tree.subtree_bounds(head);
        climbs += 1;
        debug!("Token {}: climbed to head {}, span {}..{}", token, head, start, end);
    }

    expand_span(start, end, min_length, tree.len())
}

/// Widen `[start, end)` to at least `min_length` tokens within a sentence of `len` tokens.
///
/// The deficit is split evenly, with the odd token going right. Whatever cannot
/// fit on one side moves to the other.
pub fn expand_span(start: usize, end: usize, min_length: usize, len: usize) -> (usize, usize) {
    let current = end - start;
    if current >= min_length {
        return (start, end);
    }
    if min_length >= len {
        return (0, len);
    }

    let deficit = min_length - current;
    let mut left = deficit / 2;
    let mut right = deficit - left;

    if start < left {
        right += left - start;
        left = start;
    }
    let room_right = len - end;
    if room_right < right {
        left += right - room_right;
        right = room_right;
    }

    (start.saturating_sub(left), (end + right).min(len))
}

/// Score the parent span of every target token with `scorer`.
pub fn set_span_sentiment(
    sentence: &mut Sentence,
    scorer: &dyn PolarityScorer,
    include_non_keywords: bool,
) {
    let Some(targets) = target_tokens(sentence, include_non_keywords) else {
        return;
    };

    let mut span_ids: Vec<usize> = targets
        .iter()
        .filter_map(|&index| sentence.tokens()[index].parent_span)
        .collect();
    span_ids.sort_unstable();
    span_ids.dedup();

    let scores: Vec<(usize, f64)> = span_ids
        .into_iter()
        .filter_map(|id| {
            let span = sentence.span(id)?;
            let text = sentence.span_text(span);
            let compound = scorer.compound(&text);
            debug!("Span {}..{} '{}' scored {}", span.start, span.end, text, compound);
            Some((id, compound))
        })
        .collect();

    for (id, compound) in scores {
        sentence.span_mut(id).sentiment = Some(compound);
    }
}

/// Average the keyword span sentiments of each aspect.
pub fn set_aspect_sentiments(sentence: &mut Sentence, taxonomy: &AspectTaxonomy) {
    let scores: Vec<(String, f64)> = sentence
        .keyword_tokens()
        .map(|tokens| {
            tokens
                .filter_map(|token| keyword_score(sentence, token))
                .collect()
        })
        .unwrap_or_default();

    sentence.aspect_sentiments = mean_by_aspect(taxonomy, scores);
}

/// Aspect and parent-span sentiment of a keyword token, when both are known
pub(crate) fn keyword_score(sentence: &Sentence, token: &Token) -> Option<(String, f64)> {
    let aspect = token.aspect.clone()?;
    let sentiment = sentence.parent_span(token.index)?.sentiment?;
    Some((aspect, sentiment))
}

/// Mean score per aspect; aspects without scores stay absent.
pub fn mean_by_aspect(
    taxonomy: &AspectTaxonomy,
    scores: impl IntoIterator<Item = (String, f64)>,
) -> AspectSentiments {
    let mut groups: HashMap<String, (f64, usize)> = HashMap::new();
    for (aspect, score) in scores {
        let entry = groups.entry(aspect).or_insert((0.0, 0));
        entry.0 += score;
        entry.1 += 1;
    }

    let mut sentiments = AspectSentiments::absent(taxonomy.names());
    for (aspect, (sum, count)) in groups {
        if count > 0 {
            sentiments.set(&aspect, Some(sum / count as f64));
        }
    }
    sentiments
}

/// Render the sentence with proper nouns replaced by a placeholder.
pub fn set_anonymized(sentence: &mut Sentence, taxonomy: &AspectTaxonomy) {
    let words: Vec<&str> = sentence
        .tokens()
        .iter()
        .map(|token| {
            if is_proper_noun(token) && !taxonomy.is_keyword(&token.normalized_lemma()) {
                ANONYMIZED_PLACEHOLDER
            } else {
                token.text.as_str()
            }
        })
        .collect();
    sentence.anonymized = Some(detokenize(words));
}

fn is_proper_noun(token: &Token) -> bool {
    let person = token.entity.as_deref().is_some_and(|label| {
        let label = label
            .strip_prefix("B-")
            .or_else(|| label.strip_prefix("I-"))
            .unwrap_or(label);
        PERSON_ENTITY_LABELS.contains(&label)
    });
    let proper_tag = token
        .tag
        .as_deref()
        .is_some_and(|tag| PROPER_NOUN_TAGS.contains(&tag));
    person || proper_tag
}
