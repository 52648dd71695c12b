use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::{info, warn};
use regex::Regex;
use serde::Serialize;

use crate::error::{AnnotateError, Result};

/// Characters that make a tokenizer split a keyword into several tokens
const SPLITTER_PATTERN: &str = r"[-\s/']";

/// A named aspect and the keyword lemmas that signal it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aspect {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Ordered mapping from aspect name to keyword lemmas.
///
/// Definition order is significant: aspects are tested in this order when a
/// lemma is classified, so a keyword listed under two aspects resolves to the
/// first one declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AspectTaxonomy {
    aspects: Vec<Aspect>,
    keywords: HashSet<String>,
}

impl AspectTaxonomy {
    pub fn new<N, K, I>(entries: impl IntoIterator<Item = (N, I)>) -> Result<Self>
    where
        N: Into<String>,
        K: AsRef<str>,
        I: IntoIterator<Item = K>,
    {
        let mut aspects: Vec<Aspect> = Vec::new();
        let mut keywords = HashSet::new();

        for (name, words) in entries {
            let name = name.into();
            if aspects.iter().any(|a| a.name == name) {
                return Err(AnnotateError::Configuration(format!(
                    "aspect '{}' is defined more than once",
                    name
                )));
            }
            let words: Vec<String> = words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect();
            for word in &words {
                if !keywords.insert(word.clone()) {
                    if let Some(owner) = aspects.iter().find(|a| a.keywords.contains(word)) {
                        warn!(
                            "Keyword '{}' is listed under both '{}' and '{}'; '{}' wins",
                            word, owner.name, name, owner.name
                        );
                    }
                }
            }
            aspects.push(Aspect { name, keywords: words });
        }

        Ok(Self { aspects, keywords })
    }

    /// Load a taxonomy from a `.toml`, `.yaml`/`.yml` or `.json` file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| AnnotateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let parsed = match extension.as_str() {
            "toml" => toml_entries(&content),
            "yaml" | "yml" => yaml_entries(&content),
            "json" => json_entries(&content),
            other => {
                return Err(AnnotateError::Configuration(format!(
                    "unsupported taxonomy format '{}' for {}",
                    other,
                    path.display()
                )))
            }
        };
        let entries = parsed.map_err(|message| AnnotateError::Format {
            path: path.to_path_buf(),
            message,
        })?;

        let taxonomy = Self::new(entries)?;
        info!(
            "Loaded {} aspects ({} keywords) from {}",
            taxonomy.len(),
            taxonomy.keywords.len(),
            path.display()
        );
        Ok(taxonomy)
    }

    /// Parse a TOML table of `aspect = ["keyword", ...]` entries.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let entries = toml_entries(content)
            .map_err(|e| AnnotateError::Configuration(format!("invalid taxonomy: {}", e)))?;
        Self::new(entries)
    }

    /// Course-evaluation taxonomy bundled with the crate.
    pub fn default_education() -> Self {
        let entries: [(&str, &[&str]); 5] = [
            ("course", &["course", "class", "lecture"]),
            ("content", &["content", "material", "reading", "syllabus", "powerpoint"]),
            ("assignments", &["assignment", "project", "paper", "homework"]),
            (
                "tests",
                &["test", "quiz", "exam", "examination", "midterm", "mid-term", "final"],
            ),
            ("instructor", &["instructor", "teacher", "professor", "prof", "dr"]),
        ];
        let aspects = entries
            .iter()
            .map(|(name, words)| Aspect {
                name: name.to_string(),
                keywords: words.iter().map(|w| w.to_string()).collect(),
            })
            .collect::<Vec<_>>();
        let keywords = aspects
            .iter()
            .flat_map(|a| a.keywords.iter().cloned())
            .collect();
        Self { aspects, keywords }
    }

    pub fn len(&self) -> usize {
        self.aspects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aspects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Aspect> {
        self.aspects.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.aspects.iter().map(|a| a.name.as_str())
    }

    /// All keywords flattened, in definition order.
    pub fn keywords(&self) -> Vec<&str> {
        self.aspects
            .iter()
            .flat_map(|a| a.keywords.iter().map(|k| k.as_str()))
            .collect()
    }

    /// Membership test against the flattened keyword set. `lemma` must already be lower-cased.
    pub fn is_keyword(&self, lemma: &str) -> bool {
        self.keywords.contains(lemma)
    }

    /// First aspect, in definition order, whose keywords contain `lemma`.
    pub fn aspect_for(&self, lemma: &str) -> Option<&str> {
        self.aspects
            .iter()
            .find(|a| a.keywords.iter().any(|k| k == lemma))
            .map(|a| a.name.as_str())
    }

    /// Keywords that a tokenizer would split: they contain a hyphen, whitespace,
    /// slash or apostrophe.
    pub fn multi_word_keywords(&self) -> Vec<&str> {
        let splitter = splitter_regex();
        self.keywords()
            .into_iter()
            .filter(|k| splitter.is_match(k))
            .collect()
    }

    /// Multi-word keywords plus their plural forms, to be kept whole by a tokenizer.
    pub fn tokenizer_exceptions(&self) -> Vec<String> {
        self.multi_word_keywords()
            .into_iter()
            .flat_map(|k| [k.to_string(), format!("{}s", k)])
            .collect()
    }
}

fn splitter_regex() -> Regex {
    Regex::new(SPLITTER_PATTERN).expect("splitter pattern is a valid regex")
}

type Entries = Vec<(String, Vec<String>)>;

/// `aspect = [keywords]` pairs of a TOML table, in file order
fn toml_entries(content: &str) -> std::result::Result<Entries, String> {
    let table: toml::Table = toml::from_str(content).map_err(|e| e.to_string())?;
    table
        .into_iter()
        .map(|(name, value)| {
            let keywords = value
                .try_into::<Vec<String>>()
                .map_err(|e| format!("aspect '{}': {}", name, e))?;
            Ok((name, keywords))
        })
        .collect()
}

fn yaml_entries(content: &str) -> std::result::Result<Entries, String> {
    let mapping: serde_yaml::Mapping = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
    mapping
        .into_iter()
        .map(|(key, value)| {
            let name = key
                .as_str()
                .ok_or_else(|| format!("aspect name must be a string, found {:?}", key))?
                .to_string();
            let keywords = serde_yaml::from_value::<Vec<String>>(value)
                .map_err(|e| format!("aspect '{}': {}", name, e))?;
            Ok((name, keywords))
        })
        .collect()
}

fn json_entries(content: &str) -> std::result::Result<Entries, String> {
    let map: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(content).map_err(|e| e.to_string())?;
    map.into_iter()
        .map(|(name, value)| {
            let keywords = serde_json::from_value::<Vec<String>>(value)
                .map_err(|e| format!("aspect '{}': {}", name, e))?;
            Ok((name, keywords))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ASPECTS_TOML: &str = r#"
course = ["course", "class", "lecture"]
content = ["content", "material", "reading", "syllabus", "powerpoint"]
assignments = ["assignment", "project", "paper", "homework"]
tests = ["test", "quiz", "exam", "examination", "midterm", "mid-term", "final"]
instructor = ["instructor", "teacher", "professor", "prof", "dr"]
"#;

    #[test]
    fn test_toml_preserves_definition_order() {
        let taxonomy = AspectTaxonomy::from_toml_str(ASPECTS_TOML).unwrap();
        assert_eq!(
            taxonomy.names().collect::<Vec<_>>(),
            vec!["course", "content", "assignments", "tests", "instructor"]
        );
        assert_eq!(taxonomy, AspectTaxonomy::default_education());
    }

    #[test]
    fn test_flattened_keywords() {
        let taxonomy = AspectTaxonomy::default_education();
        assert_eq!(
            taxonomy.keywords(),
            vec![
                "course", "class", "lecture", "content", "material", "reading", "syllabus",
                "powerpoint", "assignment", "project", "paper", "homework", "test", "quiz",
                "exam", "examination", "midterm", "mid-term", "final", "instructor", "teacher",
                "professor", "prof", "dr",
            ]
        );
        assert!(taxonomy.is_keyword("reading"));
        assert!(!taxonomy.is_keyword("readings"));
    }

    #[test]
    fn test_first_declared_aspect_wins() {
        let taxonomy = AspectTaxonomy::new([
            ("course", vec!["class"]),
            ("content", vec!["material", "class"]),
        ])
        .unwrap();
        assert_eq!(taxonomy.aspect_for("class"), Some("course"));
        assert_eq!(taxonomy.aspect_for("material"), Some("content"));
        assert_eq!(taxonomy.aspect_for("exam"), None);
    }

    #[test]
    fn test_keywords_are_lowercased() {
        let taxonomy = AspectTaxonomy::new([("instructor", vec!["Professor", " Dr "])]).unwrap();
        assert!(taxonomy.is_keyword("professor"));
        assert!(taxonomy.is_keyword("dr"));
    }

    #[test]
    fn test_duplicate_aspect_is_rejected() {
        let result = AspectTaxonomy::new([("course", vec!["class"]), ("course", vec!["lecture"])]);
        assert!(matches!(result, Err(AnnotateError::Configuration(_))));
    }

    #[test]
    fn test_tokenizer_exceptions() {
        let taxonomy = AspectTaxonomy::new([
            ("tests", vec!["mid-term", "mid term", "exam"]),
            ("content", vec!["power/point", "o'clock"]),
        ])
        .unwrap();
        assert_eq!(
            taxonomy.multi_word_keywords(),
            vec!["mid-term", "mid term", "power/point", "o'clock"]
        );
        assert_eq!(
            taxonomy.tokenizer_exceptions()[..4],
            ["mid-term", "mid-terms", "mid term", "mid terms"]
        );
    }

    #[test]
    fn test_from_yaml_and_json_files() {
        let dir = TempDir::new().unwrap();
        let yaml = dir.path().join("aspects.yaml");
        fs::write(&yaml, "tests:\n  - exam\n  - quiz\ncourse:\n  - class\n").unwrap();
        let json = dir.path().join("aspects.json");
        fs::write(&json, r#"{"tests": ["exam", "quiz"], "course": ["class"]}"#).unwrap();

        let from_yaml = AspectTaxonomy::from_file(&yaml).unwrap();
        let from_json = AspectTaxonomy::from_file(&json).unwrap();
        assert_eq!(from_yaml, from_json);
        assert_eq!(from_yaml.names().collect::<Vec<_>>(), vec!["tests", "course"]);
    }

    #[test]
    fn test_malformed_file_is_format_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("aspects.toml");
        fs::write(&path, "course = 3").unwrap();
        assert!(matches!(
            AspectTaxonomy::from_file(&path),
            Err(AnnotateError::Format { .. })
        ));
    }

    #[test]
    fn test_unknown_extension_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("aspects.ini");
        fs::write(&path, "course=class").unwrap();
        assert!(matches!(
            AspectTaxonomy::from_file(&path),
            Err(AnnotateError::Configuration(_))
        ));
    }
}
