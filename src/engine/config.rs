//! Pipeline configuration types

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::engine::constants::DEFAULT_PARENT_SPAN_MIN_LENGTH;
use crate::error::{AnnotateError, Result};

/// Knobs of one annotation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineConfig {
    /// Minimum token length of a parent span; 0 disables widening
    pub parent_span_min_length: usize,
    /// Resolve and score parent spans for every token, not only keywords
    pub include_non_keywords: bool,
    /// Also produce a rendering with proper nouns redacted
    pub anonymize: bool,
    /// Merge split multi-word keywords back into single tokens before annotating
    pub merge_multi_word_keywords: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parent_span_min_length: DEFAULT_PARENT_SPAN_MIN_LENGTH,
            include_non_keywords: false,
            anonymize: false,
            merge_multi_word_keywords: true,
        }
    }
}

/// Configuration as written in YAML, before type checking
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPipelineConfig {
    parent_span_min_length: Option<Value>,
    include_non_keywords: Option<Value>,
    anonymize: Option<Value>,
    merge_multi_word_keywords: Option<Value>,
}

impl PipelineConfig {
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.parent_span_min_length = min_length;
        self
    }

    pub fn with_non_keywords(mut self, include_non_keywords: bool) -> Self {
        self.include_non_keywords = include_non_keywords;
        self
    }

    pub fn with_anonymize(mut self, anonymize: bool) -> Self {
        self.anonymize = anonymize;
        self
    }

    pub fn with_multi_word_merging(mut self, merge: bool) -> Self {
        self.merge_multi_word_keywords = merge;
        self
    }

    /// Load from a YAML file; missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml_str = fs::read_to_string(path).map_err(|source| AnnotateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml_str).map_err(|e| match e {
            AnnotateError::Configuration(message) => AnnotateError::Format {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    pub fn from_yaml_str(yaml_str: &str) -> Result<Self> {
        let raw: RawPipelineConfig = if yaml_str.trim().is_empty() {
            RawPipelineConfig::default()
        } else {
            serde_yaml::from_str(yaml_str).map_err(|e| {
                AnnotateError::Configuration(format!("invalid pipeline config: {}", e))
            })?
        };

        let defaults = Self::default();
        Ok(Self {
            parent_span_min_length: match raw.parent_span_min_length {
                Some(value) => min_length(&value)?,
                None => defaults.parent_span_min_length,
            },
            include_non_keywords: flag("include_non_keywords", raw.include_non_keywords)?
                .unwrap_or(defaults.include_non_keywords),
            anonymize: flag("anonymize", raw.anonymize)?.unwrap_or(defaults.anonymize),
            merge_multi_word_keywords: flag(
                "merge_multi_word_keywords",
                raw.merge_multi_word_keywords,
            )?
            .unwrap_or(defaults.merge_multi_word_keywords),
        })
    }
}

/// Accept only a YAML boolean for a boolean-only parameter.
pub fn parse_flag(name: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(AnnotateError::InvalidFlag {
            name: name.to_string(),
            found: describe(other),
        }),
    }
}

fn flag(name: &str, value: Option<Value>) -> Result<Option<bool>> {
    value.map(|v| parse_flag(name, &v)).transpose()
}

fn min_length(value: &Value) -> Result<usize> {
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            AnnotateError::Configuration(format!(
                "parent_span_min_length must be a non-negative integer, found {}",
                describe(value)
            ))
        })
}

fn describe(value: &Value) -> String {
    serde_yaml::to_string(value)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| format!("{:?}", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.parent_span_min_length, 7);
        assert!(!config.include_non_keywords);
        assert!(!config.anonymize);
        assert!(config.merge_multi_word_keywords);
        assert_eq!(PipelineConfig::from_yaml_str("").unwrap(), config);
    }

    #[test]
    fn test_partial_yaml() {
        let config = PipelineConfig::from_yaml_str("parent_span_min_length: 0\nanonymize: true\n").unwrap();
        assert_eq!(config.parent_span_min_length, 0);
        assert!(config.anonymize);
        assert!(!config.include_non_keywords);
    }

    #[test]
    fn test_non_boolean_flag_is_rejected() {
        let err = PipelineConfig::from_yaml_str("include_non_keywords: \"yes\"\n").unwrap_err();
        match err {
            AnnotateError::InvalidFlag { name, found } => {
                assert_eq!(name, "include_non_keywords");
                assert!(found.contains("yes"));
            }
            other => panic!("expected InvalidFlag, got {other:?}"),
        }

        assert!(matches!(
            PipelineConfig::from_yaml_str("anonymize: 1\n"),
            Err(AnnotateError::InvalidFlag { .. })
        ));
    }

    #[test]
    fn test_negative_min_length_is_rejected() {
        assert!(matches!(
            PipelineConfig::from_yaml_str("parent_span_min_length: -3\n"),
            Err(AnnotateError::Configuration(_))
        ));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(matches!(
            PipelineConfig::from_yaml_str("min_len: 3\n"),
            Err(AnnotateError::Configuration(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipeline.yaml");
        fs::write(&path, "include_non_keywords: true\n").unwrap();
        let config = PipelineConfig::from_file(&path).unwrap();
        assert!(config.include_non_keywords);

        assert!(matches!(
            PipelineConfig::from_file(&dir.path().join("missing.yaml")),
            Err(AnnotateError::Io { .. })
        ));
    }
}
