//! Token estimation and difficulty levels
//!
//! Neither number is meant to match a real tokenizer. The estimate only has to
//! be deterministic and grow with the input so the user can judge whether a
//! prompt is about to blow the model's context window.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default context budget the percentage is measured against
pub const DEFAULT_TOKEN_BUDGET: usize = 128_000;

/// Approximates the token count of a piece of text
pub trait TokenEstimator: Send + Sync {
    fn estimate(&self, text: &str) -> usize;
}

/// Whitespace word count scaled by a tokens-per-word factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordHeuristic {
    pub tokens_per_word: f64,
}

impl Default for WordHeuristic {
    fn default() -> Self {
        Self { tokens_per_word: 1.2 }
    }
}

impl TokenEstimator for WordHeuristic {
    fn estimate(&self, text: &str) -> usize {
        let words = text.split_whitespace().count();
        (words as f64 * self.tokens_per_word.max(0.0)) as usize
    }
}

/// Character count divided by an average characters-per-token figure, rounded up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharHeuristic {
    pub chars_per_token: usize,
}

impl Default for CharHeuristic {
    fn default() -> Self {
        Self { chars_per_token: 4 }
    }
}

impl TokenEstimator for CharHeuristic {
    fn estimate(&self, text: &str) -> usize {
        text.chars().count().div_ceil(self.chars_per_token.max(1))
    }
}

/// Which heuristic the configuration selects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimatorKind {
    #[default]
    Words,
    Chars,
}

/// Qualitative risk that a model loses track of the supplied context
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Difficulty {
    Easy,
    Moderate,
    Hard,
}

impl Difficulty {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Moderate => "Moderate",
            Self::Hard => "Hard",
        }
    }

    /// One-line explanation shown next to the level
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Easy => "Low risk of hallucinating",
            Self::Moderate => "Slight risk of hallucinating",
            Self::Hard => "High risk of hallucinating",
        }
    }

    /// The harder of the file-count level and the token level
    pub fn assess(file_count: usize, tokens: usize, thresholds: &DifficultyThresholds) -> Self {
        let by_files = if file_count >= thresholds.hard_files {
            Self::Hard
        } else if file_count >= thresholds.moderate_files {
            Self::Moderate
        } else {
            Self::Easy
        };
        let by_tokens = if tokens >= thresholds.hard_tokens {
            Self::Hard
        } else if tokens >= thresholds.moderate_tokens {
            Self::Moderate
        } else {
            Self::Easy
        };
        debug!(file_count, tokens, ?by_files, ?by_tokens, "Difficulty::assess: called");
        by_files.max(by_tokens)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Lower bounds at which each difficulty level starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyThresholds {
    #[serde(rename = "moderate-files")]
    pub moderate_files: usize,

    #[serde(rename = "hard-files")]
    pub hard_files: usize,

    #[serde(rename = "moderate-tokens")]
    pub moderate_tokens: usize,

    #[serde(rename = "hard-tokens")]
    pub hard_tokens: usize,
}

impl Default for DifficultyThresholds {
    fn default() -> Self {
        Self {
            moderate_files: 3,
            hard_files: 6,
            moderate_tokens: 32_000,
            hard_tokens: 96_000,
        }
    }
}

/// Estimation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateConfig {
    /// Heuristic used for the token count
    pub estimator: EstimatorKind,

    #[serde(rename = "tokens-per-word")]
    pub tokens_per_word: f64,

    #[serde(rename = "chars-per-token")]
    pub chars_per_token: usize,

    /// Context window the percentage is measured against
    pub budget: usize,

    pub difficulty: DifficultyThresholds,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            estimator: EstimatorKind::Words,
            tokens_per_word: WordHeuristic::default().tokens_per_word,
            chars_per_token: CharHeuristic::default().chars_per_token,
            budget: DEFAULT_TOKEN_BUDGET,
            difficulty: DifficultyThresholds::default(),
        }
    }
}

impl EstimateConfig {
    /// Build the configured heuristic
    pub fn estimator(&self) -> Box<dyn TokenEstimator> {
        match self.estimator {
            EstimatorKind::Words => Box::new(WordHeuristic {
                tokens_per_word: self.tokens_per_word,
            }),
            EstimatorKind::Chars => Box::new(CharHeuristic {
                chars_per_token: self.chars_per_token,
            }),
        }
    }

    /// Estimate a prompt built from `file_count` files
    pub fn estimate(&self, text: &str, file_count: usize) -> Estimate {
        let tokens = self.estimator().estimate(text);
        Estimate::new(tokens, file_count, self)
    }
}

/// Token count, budget usage and difficulty for one prompt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub tokens: usize,
    pub budget: usize,
    /// Share of the budget used, capped at 100
    pub percent: f64,
    pub difficulty: Difficulty,
}

impl Estimate {
    pub fn new(tokens: usize, file_count: usize, config: &EstimateConfig) -> Self {
        let percent = if config.budget == 0 {
            0.0
        } else {
            (tokens as f64 / config.budget as f64 * 100.0).min(100.0)
        };
        Self {
            tokens,
            budget: config.budget,
            percent,
            difficulty: Difficulty::assess(file_count, tokens, &config.difficulty),
        }
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Estimated Tokens: {} / {} ({:.2}%)",
            self.tokens, self.budget, self.percent
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_word_heuristic() {
        let est = WordHeuristic::default();
        assert_eq!(est.estimate(""), 0);
        assert_eq!(est.estimate("one two three four five"), 6);
        assert_eq!(est.estimate("  spaced\n\tout  "), 1);
    }

    #[test]
    fn test_char_heuristic() {
        let est = CharHeuristic::default();
        assert_eq!(est.estimate(""), 0);
        assert_eq!(est.estimate("abcd"), 1);
        assert_eq!(est.estimate("abcde"), 2);
        assert_eq!(est.estimate("ééé"), 1);
    }

    #[test]
    fn test_char_heuristic_zero_divisor() {
        let est = CharHeuristic { chars_per_token: 0 };
        assert_eq!(est.estimate("abc"), 3);
    }

    #[test]
    fn test_difficulty_by_file_count() {
        let t = DifficultyThresholds::default();
        assert_eq!(Difficulty::assess(0, 0, &t), Difficulty::Easy);
        assert_eq!(Difficulty::assess(2, 0, &t), Difficulty::Easy);
        assert_eq!(Difficulty::assess(3, 0, &t), Difficulty::Moderate);
        assert_eq!(Difficulty::assess(5, 0, &t), Difficulty::Moderate);
        assert_eq!(Difficulty::assess(6, 0, &t), Difficulty::Hard);
    }

    #[test]
    fn test_difficulty_token_level_wins_when_harder() {
        let t = DifficultyThresholds::default();
        assert_eq!(Difficulty::assess(1, 40_000, &t), Difficulty::Moderate);
        assert_eq!(Difficulty::assess(1, 100_000, &t), Difficulty::Hard);
        assert_eq!(Difficulty::assess(7, 10, &t), Difficulty::Hard);
    }

    #[test]
    fn test_difficulty_hint() {
        assert_eq!(Difficulty::Easy.hint(), "Low risk of hallucinating");
        assert_eq!(Difficulty::Hard.to_string(), "Hard");
    }

    #[test]
    fn test_estimate_percent_capped() {
        let config = EstimateConfig {
            budget: 100,
            ..Default::default()
        };
        let estimate = Estimate::new(250, 0, &config);
        assert_eq!(estimate.percent, 100.0);
        let estimate = Estimate::new(25, 0, &config);
        assert_eq!(estimate.percent, 25.0);
        assert_eq!(estimate.to_string(), "Estimated Tokens: 25 / 100 (25.00%)");
    }

    #[test]
    fn test_estimate_zero_budget() {
        let config = EstimateConfig {
            budget: 0,
            ..Default::default()
        };
        assert_eq!(Estimate::new(10, 0, &config).percent, 0.0);
    }

    #[test]
    fn test_config_selects_estimator() {
        let config = EstimateConfig {
            estimator: EstimatorKind::Chars,
            ..Default::default()
        };
        assert_eq!(config.estimate("abcdefgh", 0).tokens, 2);
        assert_eq!(EstimateConfig::default().estimate("a b c d e", 0).tokens, 6);
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
estimator: chars
chars-per-token: 3
budget: 200000
difficulty:
  hard-files: 10
"#;
        let config: EstimateConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.estimator, EstimatorKind::Chars);
        assert_eq!(config.chars_per_token, 3);
        assert_eq!(config.budget, 200_000);
        assert_eq!(config.difficulty.hard_files, 10);
        assert_eq!(config.difficulty.moderate_files, 3);
    }

    proptest! {
        #[test]
        fn prop_doubled_input_never_estimates_lower(text in "[a-z ]{0,200}") {
            let doubled = format!("{text}{text}");
            for est in [&WordHeuristic::default() as &dyn TokenEstimator, &CharHeuristic::default()] {
                prop_assert!(est.estimate(&doubled) >= est.estimate(&text));
            }
        }
    }
}
