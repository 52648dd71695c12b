//! Pipeline defaults and label sets

/// Default minimum token length of a parent span
pub const DEFAULT_PARENT_SPAN_MIN_LENGTH: usize = 7;

/// Replacement text for redacted proper nouns
pub const ANONYMIZED_PLACEHOLDER: &str = "***";

/// Part-of-speech tags marking proper nouns (Penn Treebank and Universal)
pub const PROPER_NOUN_TAGS: [&str; 3] = ["NNP", "NNPS", "PROPN"];

/// Entity labels marking people, with or without a `B-`/`I-` prefix
pub const PERSON_ENTITY_LABELS: [&str; 2] = ["PERSON", "PER"];
