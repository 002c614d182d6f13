//! Indicator prediction for note text.
//!
//! The UI only depends on the [`Predictor`] trait: a pure mapping from note
//! text to a depression score, a schizophrenia score and a display message.
//! [`LexiconPredictor`] is the bundled implementation. It is a keyword
//! heuristic, not a clinical instrument, and its scores are only meant to
//! drive the indicators shown next to a note.

use std::fmt;

/// Scores at or above this value are reported as moderate.
pub const MODERATE_THRESHOLD: f64 = 0.3;
/// Scores at or above this value are reported as high.
pub const HIGH_THRESHOLD: f64 = 0.6;

/// Weight sum at which a score reaches 0.5. Larger values make the lexicon
/// less sensitive to a handful of matches.
const SATURATION: f64 = 3.0;

/// Message used when the text carries no words to score.
pub const NOT_ENOUGH_TEXT: &str = "Not enough text to assess indicators.";

const DEPRESSION_TERMS: &[(&str, f64)] = &[
    ("hopeless", 1.5),
    ("worthless", 1.5),
    ("suicid", 2.5),
    ("empty", 0.8),
    ("numb", 0.8),
    ("sad", 0.7),
    ("cry", 0.7),
    ("tired", 0.5),
    ("exhaust", 0.6),
    ("lonely", 0.9),
    ("alone", 0.6),
    ("guilt", 0.8),
    ("fail", 0.6),
    ("insomnia", 0.8),
    ("sleepless", 0.8),
    ("pointless", 1.0),
    ("miserable", 1.0),
    ("depress", 1.2),
    ("unmotivated", 0.8),
    ("burden", 1.0),
];

const SCHIZOPHRENIA_TERMS: &[(&str, f64)] = &[
    ("voices", 1.5),
    ("hallucinat", 2.0),
    ("paranoi", 1.5),
    ("watching", 0.7),
    ("followed", 0.8),
    ("conspir", 1.2),
    ("implant", 1.2),
    ("telepath", 1.5),
    ("delusion", 1.5),
    ("unreal", 0.8),
    ("spying", 1.0),
    ("whisper", 0.8),
    ("control", 0.4),
    ("signals", 0.8),
    ("transmit", 0.9),
    ("persecut", 1.2),
    ("shadows", 0.6),
    ("chosen", 0.6),
];

/// Result of scoring a piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub depression: f64,
    pub schizophrenia: f64,
    pub message: String,
}

/// Maps note text to a [`Prediction`]. Implementations must be pure: the same
/// text always yields the same prediction and nothing is persisted.
pub trait Predictor {
    fn predict(&self, text: &str) -> Prediction;
}

impl<F> Predictor for F
where
    F: Fn(&str) -> Prediction,
{
    fn predict(&self, text: &str) -> Prediction {
        self(text)
    }
}

/// Coarse bucket used by messages and the analysis reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    pub const ALL: [RiskBand; 3] = [RiskBand::Low, RiskBand::Moderate, RiskBand::High];

    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_THRESHOLD {
            RiskBand::High
        } else if score >= MODERATE_THRESHOLD {
            RiskBand::Moderate
        } else {
            RiskBand::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskBand::Low => "low",
            RiskBand::Moderate => "moderate",
            RiskBand::High => "high",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Keyword-weighted scorer. Each word of the text is compared against the stem
/// lists; every stem contributes its weight at most once per text.
#[derive(Debug, Clone)]
pub struct LexiconPredictor {
    depression: &'static [(&'static str, f64)],
    schizophrenia: &'static [(&'static str, f64)],
}

impl Default for LexiconPredictor {
    fn default() -> Self {
        Self {
            depression: DEPRESSION_TERMS,
            schizophrenia: SCHIZOPHRENIA_TERMS,
        }
    }
}

impl LexiconPredictor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Predictor for LexiconPredictor {
    fn predict(&self, text: &str) -> Prediction {
        let words = tokenize(text);
        if words.is_empty() {
            return Prediction {
                depression: 0.0,
                schizophrenia: 0.0,
                message: NOT_ENOUGH_TEXT.to_string(),
            };
        }

        let depression = saturate(matched_weight(&words, self.depression));
        let schizophrenia = saturate(matched_weight(&words, self.schizophrenia));
        Prediction {
            depression,
            schizophrenia,
            message: describe(depression, schizophrenia),
        }
    }
}

/// Build the display message for a pair of scores.
pub fn describe(depression: f64, schizophrenia: f64) -> String {
    format!(
        "Depression indicators: {} ({:.0}%). Schizophrenia indicators: {} ({:.0}%).",
        RiskBand::from_score(depression),
        depression * 100.0,
        RiskBand::from_score(schizophrenia),
        schizophrenia * 100.0,
    )
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|ch: char| !(ch.is_alphanumeric() || ch == '\''))
        .filter(|word| !word.is_empty())
        .map(|word| word.to_lowercase())
        .collect()
}

fn matched_weight(words: &[String], terms: &[(&str, f64)]) -> f64 {
    terms
        .iter()
        .filter(|(stem, _)| words.iter().any(|word| word.starts_with(stem)))
        .map(|(_, weight)| weight)
        .sum()
}

fn saturate(weight: f64) -> f64 {
    if weight <= 0.0 {
        0.0
    } else {
        weight / (weight + SATURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_yields_zero_scores() {
        let prediction = LexiconPredictor::new().predict("   \n ");
        assert_eq!(prediction.depression, 0.0);
        assert_eq!(prediction.schizophrenia, 0.0);
        assert_eq!(prediction.message, NOT_ENOUGH_TEXT);
    }

    #[test]
    fn neutral_text_scores_low_on_both() {
        let prediction = LexiconPredictor::new().predict("Went for a walk and had coffee.");
        assert_eq!(prediction.depression, 0.0);
        assert_eq!(prediction.schizophrenia, 0.0);
        assert!(prediction.message.contains("Depression indicators: low (0%)"));
    }

    #[test]
    fn matching_stems_raise_the_matching_score_only() {
        let prediction = LexiconPredictor::new()
            .predict("I feel hopeless and worthless, crying, so lonely and depressed.");
        assert!(prediction.depression >= HIGH_THRESHOLD);
        assert_eq!(prediction.schizophrenia, 0.0);
        assert!(prediction.message.starts_with("Depression indicators: high"));
    }

    #[test]
    fn repeated_words_count_once() {
        let predictor = LexiconPredictor::new();
        let once = predictor.predict("voices");
        let many = predictor.predict("voices voices voices voices");
        assert_eq!(once.schizophrenia, many.schizophrenia);
    }

    #[test]
    fn scores_stay_below_one() {
        let all_terms = DEPRESSION_TERMS
            .iter()
            .map(|(stem, _)| *stem)
            .collect::<Vec<_>>()
            .join(" ");
        let prediction = LexiconPredictor::new().predict(&all_terms);
        assert!(prediction.depression < 1.0);
        assert!(prediction.depression > 0.8);
    }

    #[test]
    fn risk_band_thresholds() {
        assert_eq!(RiskBand::from_score(0.0), RiskBand::Low);
        assert_eq!(RiskBand::from_score(0.29), RiskBand::Low);
        assert_eq!(RiskBand::from_score(0.3), RiskBand::Moderate);
        assert_eq!(RiskBand::from_score(0.6), RiskBand::High);
    }

    #[test]
    fn closures_act_as_predictors() {
        let fixed = |_: &str| Prediction {
            depression: 0.8,
            schizophrenia: 0.1,
            message: "High depression risk".to_string(),
        };
        assert_eq!(fixed.predict("anything").message, "High depression risk");
    }
}
