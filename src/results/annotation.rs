use serde::{Deserialize, Serialize};

use crate::types::{AspectSentiments, Sentence};

/// A keyword occurrence with the aspect it evidences and its parent span
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordAnnotation {
    pub index: usize,
    pub text: String,
    pub lemma: String,
    pub aspect: Option<String>,
    pub parent_span: Option<SpanAnnotation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpanAnnotation {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub sentiment: Option<f64>,
}

/// Serializable view of one annotated sentence
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SentenceAnnotation {
    /// Sentence index within its document
    pub sentence_id: usize,
    pub text: String,
    pub contains_aspect: bool,
    pub aspects: Option<Vec<String>>,
    pub keywords: Option<Vec<KeywordAnnotation>>,
    pub aspect_sentiments: AspectSentiments,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anonymized: Option<String>,
}

impl SentenceAnnotation {
    pub fn from_sentence(sentence_id: usize, sentence: &Sentence) -> Self {
        let keywords = sentence.keyword_tokens().map(|tokens| {
            tokens
                .map(|token| KeywordAnnotation {
                    index: token.index,
                    text: token.text.clone(),
                    lemma: token.lemma.clone(),
                    aspect: token.aspect.clone(),
                    parent_span: sentence.parent_span(token.index).map(|span| SpanAnnotation {
                        start: span.start,
                        end: span.end,
                        text: sentence.span_text(span),
                        sentiment: span.sentiment,
                    }),
                })
                .collect()
        });

        Self {
            sentence_id,
            text: sentence.text(),
            contains_aspect: sentence.contains_aspect(),
            aspects: sentence.aspects().map(|a| a.to_vec()),
            keywords,
            aspect_sentiments: sentence.aspect_sentiments().clone(),
            anonymized: sentence.anonymized().map(str::to_string),
        }
    }

    /// Get a formatted string representation
    pub fn to_formatted_string(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Sentence {}: {}\n", self.sentence_id, self.text));
        if let Some(anonymized) = &self.anonymized {
            output.push_str(&format!("Anonymized: {}\n", anonymized));
        }
        for keyword in self.keywords.iter().flatten() {
            let aspect = keyword.aspect.as_deref().unwrap_or("-");
            match &keyword.parent_span {
                Some(span) => output.push_str(&format!(
                    "  {} [{}] -> '{}' {}\n",
                    keyword.text,
                    aspect,
                    span.text,
                    format_score(span.sentiment)
                )),
                None => output.push_str(&format!("  {} [{}]\n", keyword.text, aspect)),
            }
        }
        for (aspect, score) in self.aspect_sentiments.iter() {
            if score.is_some() {
                output.push_str(&format!("  {}: {}\n", aspect, format_score(score)));
            }
        }
        output
    }
}

/// All sentence annotations of one document plus document-level aspect means
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DocumentAnnotation {
    pub document_id: String,
    pub sentences: Vec<SentenceAnnotation>,
    pub aspect_sentiments: AspectSentiments,
}

impl DocumentAnnotation {
    /// Sentences that mention at least one aspect
    pub fn aspect_sentences(&self) -> impl Iterator<Item = &SentenceAnnotation> {
        self.sentences.iter().filter(|s| s.contains_aspect)
    }

    pub fn keyword_count(&self) -> usize {
        self.sentences
            .iter()
            .filter_map(|s| s.keywords.as_ref())
            .map(Vec::len)
            .sum()
    }

    /// Get a formatted string representation
    pub fn to_formatted_string(&self) -> String {
        let mut output = format!("Document: {}\n", self.document_id);
        for sentence in self.aspect_sentences() {
            output.push_str(&sentence.to_formatted_string());
        }
        let means: Vec<String> = self
            .aspect_sentiments
            .iter()
            .filter(|(_, score)| score.is_some())
            .map(|(aspect, score)| format!("{}={}", aspect, format_score(score)))
            .collect();
        if !means.is_empty() {
            output.push_str(&format!("Aspect means: {}\n", means.join(", ")));
        }
        output
    }
}

fn format_score(score: Option<f64>) -> String {
    match score {
        Some(value) => format!("{:+.4}", value),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unannotated_sentence_view() {
        let sentence = Sentence::from_heads(&["Hello", "world", "!"], &["hello", "world", "!"], vec![1, 1, 1]).unwrap();
        let view = SentenceAnnotation::from_sentence(0, &sentence);
        assert_eq!(view.text, "Hello world!");
        assert!(!view.contains_aspect);
        assert!(view.aspects.is_none());
        assert!(view.keywords.is_none());

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["aspects"], serde_json::Value::Null);
        assert!(json.get("anonymized").is_none());
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(Some(0.5)), "+0.5000");
        assert_eq!(format_score(Some(-0.25)), "-0.2500");
        assert_eq!(format_score(None), "n/a");
    }
}
