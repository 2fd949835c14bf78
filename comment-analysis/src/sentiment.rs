//! Comment sentiment classification
//!
//! Scores text with VADER (tuned for social media text) and buckets the
//! compound score into Positive / Neutral / Negative around a symmetric
//! threshold. A low threshold favours polarized labels over Neutral.

use common::SentimentLabel;
use serde::{Deserialize, Serialize};
use vader_sentiment::SentimentIntensityAnalyzer;

/// Compound score in [-1, 1] and the label it maps to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub compound: f64,
    pub label: SentimentLabel,
}

/// Bucket a compound score. Comparisons are strict: a score equal to the
/// threshold (or its negation) is Neutral.
pub fn label_for(compound: f64, threshold: f64) -> SentimentLabel {
    if compound > threshold {
        SentimentLabel::Positive
    } else if compound < -threshold {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

pub struct SentimentClassifier {
    analyzer: SentimentIntensityAnalyzer<'static>,
    threshold: f64,
}

impl SentimentClassifier {
    pub fn new(threshold: f64) -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// VADER compound score; 0.0 for blank text
    pub fn compound(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }

        let scores = self.analyzer.polarity_scores(text);
        scores.get("compound").copied().unwrap_or(0.0)
    }

    pub fn classify(&self, text: &str) -> SentimentScore {
        let compound = self.compound(text);
        SentimentScore {
            compound,
            label: label_for(compound, self.threshold),
        }
    }
}

/// Label counts for one cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentTally {
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
}

/// Share of each label in percent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive_pct: f64,
    pub neutral_pct: f64,
    pub negative_pct: f64,
}

impl SentimentTally {
    pub fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Negative => self.negative += 1,
        }
    }

    pub fn count(&self, label: SentimentLabel) -> u32 {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Negative => self.negative,
        }
    }

    pub fn total(&self) -> u32 {
        self.positive + self.neutral + self.negative
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn distribution(&self) -> SentimentDistribution {
        let total = self.total();
        if total == 0 {
            return SentimentDistribution::default();
        }

        let pct = |n: u32| n as f64 * 100.0 / total as f64;
        SentimentDistribution {
            positive_pct: pct(self.positive),
            neutral_pct: pct(self.neutral),
            negative_pct: pct(self.negative),
        }
    }
}
