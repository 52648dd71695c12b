pub mod aspects;
pub mod data;
pub mod digraph;
pub mod engine;
pub mod error;
pub mod results;
pub mod sentiment;
pub mod types;

pub use aspects::{Aspect, AspectSource, AspectTaxonomy};
pub use data::{DependencyParser, Document, DocumentParser, MultiWordMerger};
pub use engine::{AspectSentimentEngine, PipelineConfig};
pub use error::{AnnotateError, Result};
pub use results::{DocumentAnnotation, KeywordAnnotation, SentenceAnnotation, SpanAnnotation};
pub use sentiment::{LexiconScorer, PolarityScorer, PolarityScores};
pub use types::{AspectSentiments, Sentence, Span, Token};
