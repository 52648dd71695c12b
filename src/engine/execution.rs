//! Text, document and batch entry points for AspectSentimentEngine

use std::collections::HashSet;

use anyhow::{anyhow, Result};
use log::warn;
use rayon::prelude::*;

use crate::data::{DependencyParser, Document};
use crate::engine::components::{keyword_score, mean_by_aspect};
use crate::engine::core::AspectSentimentEngine;
use crate::results::{DocumentAnnotation, SentenceAnnotation};
use crate::types::{AspectSentiments, Sentence};

impl AspectSentimentEngine {
    /// Parse `text` with `parser`, keeping multi-word keywords whole, and annotate
    /// every resulting sentence.
    pub fn annotate_text(
        &self,
        text: &str,
        parser: &dyn DependencyParser,
    ) -> crate::error::Result<Vec<Sentence>> {
        let exceptions: HashSet<String> =
            self.taxonomy.tokenizer_exceptions().into_iter().collect();
        parser
            .parse(text, &exceptions)?
            .into_iter()
            .map(|sentence| self.annotate(sentence))
            .collect()
    }

    /// Annotate every sentence of a document and aggregate its aspect sentiments.
    pub fn annotate_document(&self, document: &Document) -> Result<DocumentAnnotation> {
        let mut ids = Vec::with_capacity(document.sentences.len());
        let mut sentences = Vec::with_capacity(document.sentences.len());
        for (idx, sentence) in document.to_sentences()? {
            let annotated = self
                .annotate(sentence)
                .map_err(|e| anyhow!("Document '{}' sentence {}: {}", document.id, idx, e))?;
            ids.push(idx);
            sentences.push(annotated);
        }

        let aspect_sentiments = self.document_sentiments(&sentences);
        Ok(DocumentAnnotation {
            document_id: document.id.clone(),
            sentences: ids
                .into_iter()
                .zip(&sentences)
                .map(|(idx, s)| SentenceAnnotation::from_sentence(idx, s))
                .collect(),
            aspect_sentiments,
        })
    }

    /// Annotate documents in parallel. Results keep the input order.
    pub fn annotate_documents(&self, documents: &[Document]) -> Vec<Result<DocumentAnnotation>> {
        documents
            .par_iter()
            .map(|document| {
                let result = self.annotate_document(document);
                if let Err(e) = &result {
                    warn!("Skipping document '{}': {}", document.id, e);
                }
                result
            })
            .collect()
    }

    /// Mean sentiment per aspect over the keyword occurrences of all `sentences`.
    pub fn document_sentiments(&self, sentences: &[Sentence]) -> AspectSentiments {
        let scores = sentences.iter().flat_map(|sentence| {
            sentence
                .keyword_tokens()
                .into_iter()
                .flatten()
                .filter_map(move |token| keyword_score(sentence, token))
        });
        mean_by_aspect(&self.taxonomy, scores)
    }
}
