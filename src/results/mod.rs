pub mod annotation;

pub use annotation::{DocumentAnnotation, KeywordAnnotation, SentenceAnnotation, SpanAnnotation};
