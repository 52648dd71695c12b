//! Core AspectSentimentEngine struct and constructor

use std::sync::Arc;

use log::{debug, info};

use crate::aspects::{AspectSource, AspectTaxonomy};
use crate::data::MultiWordMerger;
use crate::engine::components;
use crate::engine::config::PipelineConfig;
use crate::error::Result;
use crate::sentiment::{LexiconScorer, PolarityScorer};
use crate::types::Sentence;

/// Runs the aspect sentiment pipeline over parsed sentences.
///
/// The taxonomy and scorer are fixed at construction and only read afterwards,
/// so one engine can serve many threads.
pub struct AspectSentimentEngine {
    pub(crate) taxonomy: Arc<AspectTaxonomy>,
    pub(crate) scorer: Arc<dyn PolarityScorer>,
    pub(crate) merger: MultiWordMerger,
    pub(crate) config: PipelineConfig,
}

impl AspectSentimentEngine {
    /// Create an engine that scores spans with the built-in lexicon.
    pub fn new(aspects: impl Into<AspectSource>, config: PipelineConfig) -> Result<Self> {
        Self::with_scorer(aspects, config, Arc::new(LexiconScorer::new()))
    }

    /// Create an engine that scores spans with `scorer`.
    pub fn with_scorer(
        aspects: impl Into<AspectSource>,
        config: PipelineConfig,
        scorer: Arc<dyn PolarityScorer>,
    ) -> Result<Self> {
        let taxonomy = aspects.into().resolve()?;
        let merger = MultiWordMerger::from_taxonomy(&taxonomy);
        info!(
            "Aspect sentiment engine ready: {} aspects, {} keywords, parent span min length {}",
            taxonomy.len(),
            taxonomy.keywords().len(),
            config.parent_span_min_length
        );

        Ok(Self {
            taxonomy: Arc::new(taxonomy),
            scorer,
            merger,
            config,
        })
    }

    pub fn taxonomy(&self) -> &AspectTaxonomy {
        &self.taxonomy
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn scorer(&self) -> &dyn PolarityScorer {
        self.scorer.as_ref()
    }

    /// Merge split multi-word keywords (if enabled), then annotate.
    pub fn annotate(&self, sentence: Sentence) -> Result<Sentence> {
        let mut sentence = if self.config.merge_multi_word_keywords && !self.merger.is_empty() {
            self.merger.apply(sentence)?
        } else {
            sentence
        };
        self.annotate_in_place(&mut sentence);
        Ok(sentence)
    }

    /// Run every stage on `sentence`, discarding any earlier annotations.
    pub fn annotate_in_place(&self, sentence: &mut Sentence) {
        let taxonomy = self.taxonomy.as_ref();
        let config = &self.config;

        sentence.reset_annotations();
        components::set_contains_aspect(sentence, taxonomy);
        components::set_aspects(sentence, taxonomy);
        components::set_keywords(sentence, taxonomy);
        components::set_token_aspects(sentence, taxonomy);
        components::set_token_parent_span(
            sentence,
            config.parent_span_min_length,
            config.include_non_keywords,
        );
        components::set_span_sentiment(sentence, self.scorer.as_ref(), config.include_non_keywords);
        components::set_aspect_sentiments(sentence, taxonomy);
        if config.anonymize {
            components::set_anonymized(sentence, taxonomy);
        }

        debug!(
            "Annotated '{}': aspects {:?}",
            sentence.text(),
            sentence.aspects().unwrap_or_default()
        );
    }
}
