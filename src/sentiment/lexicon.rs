//! Rule-based valence scorer in the style of VADER.
//!
//! Word valences live on a [-4, 4] scale. Each word's valence is adjusted by
//! preceding boosters and negations, a contrastive "but" reweights the clauses
//! around it, and the sum is squashed into [-1, 1].

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::info;

use super::{PolarityScorer, PolarityScores};
use crate::error::{AnnotateError, Result};

/// Normalization constant for the compound score
const ALPHA: f64 = 15.0;
/// Valence added or removed by a booster word
const BOOSTER_INCREMENT: f64 = 0.293;
/// Multiplier applied to a negated valence
const NEGATION_SCALAR: f64 = -0.74;
/// Valence added to an all-caps word in mixed-case text
const CAPS_INCREMENT: f64 = 0.733;
/// Valence added per exclamation mark, capped at four marks
const EXCLAMATION_INCREMENT: f64 = 0.292;
const QUESTION_INCREMENT: f64 = 0.18;
/// Number of preceding words checked for boosters and negations
const LOOKBACK: usize = 3;

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "nowhere", "neither", "nor",
    "cannot", "can't", "cant", "don't", "dont", "doesn't", "doesnt", "didn't", "didnt",
    "isn't", "isnt", "aren't", "arent", "wasn't", "wasnt", "weren't", "werent", "won't",
    "wont", "wouldn't", "wouldnt", "shouldn't", "shouldnt", "couldn't", "couldnt",
    "hasn't", "hasnt", "haven't", "havent", "hadn't", "hadnt", "n't", "without",
    "rarely", "seldom", "hardly", "barely",
];

const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", BOOSTER_INCREMENT),
    ("completely", BOOSTER_INCREMENT),
    ("extremely", BOOSTER_INCREMENT),
    ("incredibly", BOOSTER_INCREMENT),
    ("really", BOOSTER_INCREMENT),
    ("so", BOOSTER_INCREMENT),
    ("totally", BOOSTER_INCREMENT),
    ("very", BOOSTER_INCREMENT),
    ("most", BOOSTER_INCREMENT),
    ("more", BOOSTER_INCREMENT),
    ("highly", BOOSTER_INCREMENT),
    ("quite", BOOSTER_INCREMENT),
    ("barely", -BOOSTER_INCREMENT),
    ("hardly", -BOOSTER_INCREMENT),
    ("less", -BOOSTER_INCREMENT),
    ("little", -BOOSTER_INCREMENT),
    ("slightly", -BOOSTER_INCREMENT),
    ("somewhat", -BOOSTER_INCREMENT),
];

/// Mean valences from the VADER lexicon for common course-review vocabulary
const DEFAULT_LEXICON: &[(&str, f64)] = &[
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("bad", -2.5),
    ("best", 3.2),
    ("better", 1.9),
    ("boring", -1.3),
    ("brilliant", 2.8),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("dislike", -1.6),
    ("easy", 1.9),
    ("effective", 2.1),
    ("enjoy", 2.2),
    ("enjoyed", 2.3),
    ("excellent", 2.7),
    ("fair", 1.3),
    ("fantastic", 2.6),
    ("fun", 2.3),
    ("good", 1.9),
    ("great", 3.1),
    ("hard", -0.4),
    ("hate", -2.7),
    ("hated", -3.2),
    ("helpful", 1.8),
    ("horrible", -2.5),
    ("interesting", 1.7),
    ("kind", 2.4),
    ("like", 2.0),
    ("liked", 1.8),
    ("love", 3.2),
    ("loved", 2.9),
    ("nice", 1.8),
    ("perfect", 2.7),
    ("poor", -2.1),
    ("problem", -1.7),
    ("rude", -2.0),
    ("terrible", -2.1),
    ("unfair", -2.1),
    ("useful", 1.9),
    ("useless", -1.8),
    ("waste", -1.8),
    ("wonderful", 2.7),
    ("worse", -2.1),
    ("worst", -3.1),
];

/// Lexicon-backed polarity scorer.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    lexicon: HashMap<String, f64>,
    boosters: HashMap<String, f64>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    /// Scorer with the built-in lexicon
    pub fn new() -> Self {
        let lexicon = DEFAULT_LEXICON
            .iter()
            .map(|(word, valence)| (word.to_string(), *valence))
            .collect();
        Self::with_lexicon(lexicon)
    }

    pub fn with_lexicon(lexicon: HashMap<String, f64>) -> Self {
        let boosters = BOOSTERS
            .iter()
            .map(|(word, scalar)| (word.to_string(), *scalar))
            .collect();
        Self { lexicon, boosters }
    }

    /// Load a VADER-format lexicon: one `word<TAB>mean[<TAB>...]` entry per line.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| AnnotateError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut lexicon = HashMap::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut columns = line.split('\t');
            let word = columns.next().unwrap_or_default().trim();
            let valence = columns
                .next()
                .and_then(|v| v.trim().parse::<f64>().ok())
                .ok_or_else(|| AnnotateError::Format {
                    path: path.to_path_buf(),
                    message: format!("line {}: expected `word<TAB>valence`", line_no + 1),
                })?;
            lexicon.insert(word.to_lowercase(), valence);
        }

        info!("Loaded {} lexicon entries from {}", lexicon.len(), path.display());
        Ok(Self::with_lexicon(lexicon))
    }

    pub fn len(&self) -> usize {
        self.lexicon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexicon.is_empty()
    }

    fn valences(&self, words: &[Word], mixed_case: bool) -> Vec<f64> {
        let mut valences = Vec::with_capacity(words.len());

        for (i, word) in words.iter().enumerate() {
            let Some(&base) = self.lexicon.get(&word.lower) else {
                valences.push(0.0);
                continue;
            };
            if self.boosters.contains_key(&word.lower) {
                valences.push(0.0);
                continue;
            }

            let mut valence = base;
            if mixed_case && word.shouting {
                valence += CAPS_INCREMENT * valence.signum();
            }

            for distance in 1..=LOOKBACK.min(i) {
                let prior = &words[i - distance];
                if let Some(&scalar) = self.boosters.get(&prior.lower) {
                    let damping = 1.0 - 0.05 * (distance - 1) as f64;
                    let mut boost = scalar * damping * valence.signum();
                    if mixed_case && prior.shouting {
                        boost += CAPS_INCREMENT * valence.signum();
                    }
                    valence += boost;
                }
            }

            let negated = (1..=LOOKBACK.min(i)).any(|d| is_negation(&words[i - d].lower));
            if negated {
                valence *= NEGATION_SCALAR;
            }

            valences.push(valence);
        }

        if let Some(pivot) = words.iter().position(|w| w.lower == "but") {
            for (i, valence) in valences.iter_mut().enumerate() {
                if i < pivot {
                    *valence *= 0.5;
                } else if i > pivot {
                    *valence *= 1.5;
                }
            }
        }

        valences
    }
}

impl PolarityScorer for LexiconScorer {
    fn polarity_scores(&self, text: &str) -> PolarityScores {
        let words = split_words(text);
        if words.is_empty() {
            return PolarityScores::default();
        }

        let has_upper = words.iter().any(|w| w.shouting);
        let has_lower = words.iter().any(|w| w.raw.chars().any(char::is_lowercase));
        let valences = self.valences(&words, has_upper && has_lower);

        let mut sum: f64 = valences.iter().sum();
        let emphasis = punctuation_emphasis(text);
        if sum > 0.0 {
            sum += emphasis;
        } else if sum < 0.0 {
            sum -= emphasis;
        }

        let mut positive = 0.0;
        let mut negative = 0.0;
        let mut neutral = 0.0;
        for &valence in &valences {
            if valence > 0.0 {
                positive += valence + 1.0;
            } else if valence < 0.0 {
                negative += valence - 1.0;
            } else {
                neutral += 1.0;
            }
        }
        if positive > negative.abs() {
            positive += emphasis;
        } else if positive < negative.abs() {
            negative -= emphasis;
        }

        let total = positive + negative.abs() + neutral;
        let (positive, negative, neutral) = if total > 0.0 {
            (positive / total, negative.abs() / total, neutral / total)
        } else {
            (0.0, 0.0, 0.0)
        };

        PolarityScores {
            negative: round4(negative),
            neutral: round4(neutral),
            positive: round4(positive),
            compound: round4(normalize(sum)),
        }
    }
}

struct Word<'a> {
    raw: &'a str,
    lower: String,
    shouting: bool,
}

fn split_words(text: &str) -> Vec<Word<'_>> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| c.is_ascii_punctuation() && c != '\''))
        .filter(|w| !w.is_empty())
        .map(|raw| Word {
            raw,
            lower: raw.to_lowercase(),
            shouting: raw.chars().any(char::is_alphabetic)
                && raw.chars().filter(|c| c.is_alphabetic()).all(char::is_uppercase)
                && raw.chars().count() > 1,
        })
        .collect()
}

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}

fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.matches('!').count().min(4) as f64;
    let questions = text.matches('?').count();
    let question_emphasis = match questions {
        0 | 1 => 0.0,
        2 | 3 => questions as f64 * QUESTION_INCREMENT,
        _ => 0.96,
    };
    exclamations * EXCLAMATION_INCREMENT + question_emphasis
}

fn normalize(score: f64) -> f64 {
    (score / (score * score + ALPHA).sqrt()).clamp(-1.0, 1.0)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_neutral_text() {
        let scorer = LexiconScorer::new();
        let scores = scorer.polarity_scores("the readings were long");
        assert_eq!(scores.compound, 0.0);
        assert_eq!(scores.neutral, 1.0);
    }

    #[test]
    fn test_empty_text() {
        let scorer = LexiconScorer::new();
        assert_eq!(scorer.polarity_scores("  "), PolarityScores::default());
    }

    #[test]
    fn test_polarity_direction() {
        let scorer = LexiconScorer::new();
        assert!(scorer.compound("The class was good.") > 0.0);
        assert!(scorer.compound("the professor was rude") < 0.0);
    }

    #[test]
    fn test_words_outside_lexicon_are_neutral() {
        let scorer = LexiconScorer::new();
        assert_eq!(scorer.compound("the professor was mean"), 0.0);
        assert_eq!(scorer.compound("the readings were too long"), 0.0);
    }

    #[test]
    fn test_but_halves_first_clause() {
        let scorer = LexiconScorer::new();
        // enjoyed = 2.3, halved before "but": 1.15 / sqrt(1.15^2 + 15)
        let text = "I enjoyed the course, but the readings were too long and the professor was mean.";
        assert_eq!(scorer.compound(text), 0.2846);
    }

    #[test]
    fn test_single_word_compound_formula() {
        let scorer = LexiconScorer::new();
        // good = 1.9 -> 1.9 / sqrt(1.9^2 + 15)
        let expected = 1.9 / (1.9f64 * 1.9 + 15.0).sqrt();
        assert!((scorer.compound("good") - expected).abs() < 1e-4);
    }

    #[test]
    fn test_negation_flips_polarity() {
        let scorer = LexiconScorer::new();
        assert!(scorer.compound("the course was not good") < 0.0);
        assert!(scorer.compound("the course wasn't bad") > 0.0);
    }

    #[test]
    fn test_booster_intensifies() {
        let scorer = LexiconScorer::new();
        assert!(scorer.compound("very good") > scorer.compound("good"));
        assert!(scorer.compound("slightly good") < scorer.compound("good"));
    }

    #[test]
    fn test_but_favours_second_clause() {
        let scorer = LexiconScorer::new();
        assert!(scorer.compound("the lectures were good but the exams were horrible") < 0.0);
        assert!(scorer.compound("the exams were horrible but the lectures were great") > 0.0);
    }

    #[test]
    fn test_emphasis() {
        let scorer = LexiconScorer::new();
        assert!(scorer.compound("good!!") > scorer.compound("good"));
        assert!(scorer.compound("the class was GOOD") > scorer.compound("the class was good"));
    }

    #[test]
    fn test_compound_is_bounded() {
        let scorer = LexiconScorer::new();
        let text = "best best best best best amazing amazing wonderful love love!!!!";
        let compound = scorer.compound(text);
        assert!(compound > 0.9 && compound <= 1.0);
    }

    #[test]
    fn test_proportions_sum_to_one() {
        let scorer = LexiconScorer::new();
        let scores = scorer.polarity_scores("I enjoyed the course, but the professor was mean.");
        let total = scores.positive + scores.negative + scores.neutral;
        assert!((total - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lexicon.txt");
        fs::write(&path, "splendid\t2.5\t0.5\t[2, 3]\nawful\t-3.0\t0.4\t[-3, -3]\n").unwrap();

        let scorer = LexiconScorer::from_file(&path).unwrap();
        assert_eq!(scorer.len(), 2);
        assert!(scorer.compound("a splendid class") > 0.0);
        assert!(scorer.compound("an awful class") < 0.0);
        assert_eq!(scorer.compound("a good class"), 0.0);
    }

    #[test]
    fn test_from_file_rejects_bad_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lexicon.txt");
        fs::write(&path, "splendid\tvery\n").unwrap();
        assert!(matches!(
            LexiconScorer::from_file(&path),
            Err(AnnotateError::Format { .. })
        ));
    }
}
