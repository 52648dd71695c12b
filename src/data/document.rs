use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::data::constants::*;
use crate::digraph::DependencyTree;
use crate::types::{Sentence, Token};

/// Represents a complete document with metadata and sentences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub metadata: Vec<String>,
    pub sentences: Vec<RawSentence>,
}

/// A single sentence as stored in the document, before annotation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSentence {
    #[serde(rename = "numTokens")]
    pub num_tokens: u32,
    pub fields: Vec<Field>,
}

/// Represents a field in a sentence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum Field {
    #[serde(rename = "ai.lum.odinson.TokensField")]
    TokensField {
        name: String,
        tokens: Vec<String>,
    },
    #[serde(rename = "ai.lum.odinson.GraphField")]
    GraphField {
        name: String,
        edges: Vec<(u32, u32, String)>, // (head, dependent, relation)
        roots: Vec<u32>,
    },
}

impl Field {
    pub fn name(&self) -> &str {
        match self {
            Field::TokensField { name, .. } => name,
            Field::GraphField { name, .. } => name,
        }
    }
}

/// Represents a dependency graph field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphField {
    pub name: String,
    pub edges: Vec<(u32, u32, String)>,
    pub roots: Vec<u32>,
}

impl Document {
    /// Get a specific field by name from a sentence
    pub fn get_field(&self, sentence_idx: usize, field_name: &str) -> Option<&Field> {
        self.sentences
            .get(sentence_idx)?
            .fields
            .iter()
            .find(|field| field.name() == field_name)
    }

    /// Get tokens from a specific field
    pub fn get_tokens(&self, sentence_idx: usize, field_name: &str) -> Option<&[String]> {
        match self.get_field(sentence_idx, field_name)? {
            Field::TokensField { tokens, .. } => Some(tokens),
            _ => None,
        }
    }

    /// Get dependencies from a sentence
    pub fn get_dependencies(&self, sentence_idx: usize) -> Option<GraphField> {
        match self.get_field(sentence_idx, FIELD_DEPENDENCIES)? {
            Field::GraphField { edges, roots, .. } => Some(GraphField {
                name: FIELD_DEPENDENCIES.to_string(),
                edges: edges.clone(),
                roots: roots.clone(),
            }),
            _ => None,
        }
    }

    /// Get sentence length
    pub fn sentence_length(&self, sentence_idx: usize) -> Option<u32> {
        self.sentences.get(sentence_idx).map(|s| s.num_tokens)
    }

    /// Build the annotatable sentence at `sentence_idx`.
    ///
    /// Words come from `word` (or `raw`), lemmas from `lemma` (falling back to the
    /// word), heads from the `dependencies` graph. Without a graph every token is
    /// its own root.
    pub fn sentence(&self, sentence_idx: usize) -> Result<Sentence> {
        let num_tokens = self
            .sentence_length(sentence_idx)
            .ok_or_else(|| anyhow!("Document '{}' has no sentence {}", self.id, sentence_idx))?
            as usize;

        let words = self
            .get_tokens(sentence_idx, FIELD_WORD)
            .or_else(|| self.get_tokens(sentence_idx, FIELD_RAW))
            .ok_or_else(|| {
                anyhow!(
                    "Document '{}' sentence {}: no '{}' or '{}' field",
                    self.id, sentence_idx, FIELD_WORD, FIELD_RAW
                )
            })?;
        if words.len() != num_tokens {
            return Err(anyhow!(
                "Document '{}' sentence {}: {} words but numTokens is {}",
                self.id, sentence_idx, words.len(), num_tokens
            ));
        }

        let lemmas = self.aligned_tokens(sentence_idx, FIELD_LEMMA, num_tokens);
        let tags = self.aligned_tokens(sentence_idx, FIELD_TAG, num_tokens);
        let entities = self.aligned_tokens(sentence_idx, FIELD_ENTITY, num_tokens);

        let tokens = words
            .iter()
            .enumerate()
            .map(|(i, word)| {
                let lemma = lemmas.map(|l| l[i].as_str()).unwrap_or(word.as_str());
                let mut token = Token::new(i, word.as_str(), lemma);
                token.tag = tags.map(|t| t[i].clone());
                token.entity = entities.map(|e| e[i].clone());
                token
            })
            .collect();

        let tree = match self.get_dependencies(sentence_idx) {
            Some(deps) => DependencyTree::from_edges(num_tokens, &deps.edges, &deps.roots)?,
            None => {
                log::warn!(
                    "Document '{}' sentence {}: no dependency graph, treating every token as a root",
                    self.id, sentence_idx
                );
                DependencyTree::from_heads((0..num_tokens).collect())?
            }
        };

        Ok(Sentence::new(tokens, tree)?)
    }

    /// Build every non-empty sentence of the document, paired with its index.
    pub fn to_sentences(&self) -> Result<Vec<(usize, Sentence)>> {
        let mut sentences = Vec::with_capacity(self.sentences.len());
        for (idx, raw) in self.sentences.iter().enumerate() {
            if raw.num_tokens == 0 {
                log::warn!("Document '{}' sentence {}: no tokens, skipping it", self.id, idx);
                continue;
            }
            sentences.push((idx, self.sentence(idx)?));
        }
        Ok(sentences)
    }

    /// Token field values, if present with the expected length
    fn aligned_tokens(
        &self,
        sentence_idx: usize,
        field_name: &str,
        num_tokens: usize,
    ) -> Option<&[String]> {
        let tokens = self.get_tokens(sentence_idx, field_name)?;
        if tokens.len() == num_tokens {
            Some(tokens)
        } else {
            log::warn!(
                "Document '{}' sentence {}: field '{}' has {} tokens but numTokens is {}, ignoring it",
                self.id, sentence_idx, field_name, tokens.len(), num_tokens
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFESSOR_DOC: &str = r#"{
        "id": "review-1",
        "metadata": [],
        "sentences": [{
            "numTokens": 5,
            "fields": [
                {"$type": "ai.lum.odinson.TokensField", "name": "word", "tokens": ["The", "professor", "was", "mean", "."]},
                {"$type": "ai.lum.odinson.TokensField", "name": "lemma", "tokens": ["the", "professor", "be", "mean", "."]},
                {"$type": "ai.lum.odinson.TokensField", "name": "tag", "tokens": ["DT", "NN", "VBD", "JJ", "."]},
                {"$type": "ai.lum.odinson.GraphField", "name": "dependencies",
                 "edges": [[1, 0, "det"], [2, 1, "nsubj"], [2, 3, "acomp"], [2, 4, "punct"]],
                 "roots": [2]}
            ]
        }]
    }"#;

    #[test]
    fn test_sentence_from_document() {
        let doc: Document = serde_json::from_str(PROFESSOR_DOC).unwrap();
        let sentence = doc.sentence(0).unwrap();

        assert_eq!(sentence.len(), 5);
        assert_eq!(sentence.tree().heads(), &[1, 2, 2, 2, 2]);
        assert_eq!(sentence.token(2).unwrap().lemma, "be");
        assert_eq!(sentence.token(1).unwrap().tag.as_deref(), Some("NN"));
        assert_eq!(sentence.token(1).unwrap().entity, None);
        assert_eq!(sentence.text(), "The professor was mean.");
    }

    #[test]
    fn test_missing_lemma_falls_back_to_word() {
        let json = r#"{"id": "d", "sentences": [{"numTokens": 2, "fields": [
            {"$type": "ai.lum.odinson.TokensField", "name": "word", "tokens": ["Hello", "world"]}
        ]}]}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        let sentence = doc.sentence(0).unwrap();
        assert_eq!(sentence.token(0).unwrap().lemma, "Hello");
        assert!(sentence.tree().is_root(0) && sentence.tree().is_root(1));
    }

    #[test]
    fn test_empty_sentence_is_skipped() {
        let json = r#"{"id": "d", "sentences": [
            {"numTokens": 0, "fields": [
                {"$type": "ai.lum.odinson.TokensField", "name": "word", "tokens": []}
            ]},
            {"numTokens": 2, "fields": [
                {"$type": "ai.lum.odinson.TokensField", "name": "word", "tokens": ["Great", "class"]}
            ]}
        ]}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        let sentences = doc.to_sentences().unwrap();
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].0, 1);
        assert_eq!(sentences[0].1.text(), "Great class");
    }

    #[test]
    fn test_word_count_mismatch_is_error() {
        let json = r#"{"id": "d", "sentences": [{"numTokens": 3, "fields": [
            {"$type": "ai.lum.odinson.TokensField", "name": "word", "tokens": ["Hello", "world"]}
        ]}]}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert!(doc.sentence(0).is_err());
        assert!(doc.sentence(7).is_err());
    }
}
