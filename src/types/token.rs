use serde::{Deserialize, Serialize};

/// A single token of a parsed sentence, together with its pipeline annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Position in the sentence
    pub index: usize,
    pub text: String,
    pub lemma: String,
    /// Part-of-speech tag, when the parser supplied one
    pub tag: Option<String>,
    /// Named-entity label, when the parser supplied one
    pub entity: Option<String>,
    /// Aspect this keyword token signals
    pub aspect: Option<String>,
    /// Index into the owning sentence's span table
    pub parent_span: Option<usize>,
}

impl Token {
    pub fn new(index: usize, text: impl Into<String>, lemma: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            lemma: lemma.into(),
            tag: None,
            entity: None,
            aspect: None,
            parent_span: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Lower-cased lemma, the form matched against taxonomy keywords.
    pub fn normalized_lemma(&self) -> String {
        self.lemma.to_lowercase()
    }

    pub(crate) fn clear_annotations(&mut self) {
        self.aspect = None;
        self.parent_span = None;
    }
}
