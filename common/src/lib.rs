//! Shared types for the crypto-pulse workspace
//!
//! Holds the records that flow between the connectors in `data-ingestion`
//! and the analysis pipeline in `comment-analysis`, the error type every
//! stage reports through, and the source traits that sit at the I/O seam.

pub mod error;
pub mod sources;

pub use error::{Result, ScrapeError};
pub use sources::{MarketDataSource, ThreadSource};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One tradable asset from the market listing.
///
/// `name` is the canonical (uppercased) name used as the join key everywhere,
/// `symbol` is the uppercased ticker, unique within a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub name: String,
    pub symbol: String,
    pub price_usd: Decimal,
    pub percent_change_1h: Decimal,
    pub percent_change_24h: Decimal,
    pub percent_change_7d: Decimal,
}

/// Three-way sentiment bucket assigned to a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A retained top-level comment. Every record carries at least one mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub body: String,
    pub karma: i64,
    pub sentiment: SentimentLabel,
    pub mentions: Vec<String>,
}

impl CommentRecord {
    /// Mentions as the comma-joined column shown in the comment table
    pub fn mentions_joined(&self) -> String {
        self.mentions.join(", ")
    }
}

/// A post from the community's hot listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: String,
    pub title: String,
}

/// A top-level comment as delivered by the forum, before any cleaning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawComment {
    pub body: String,
    pub score: i64,
}

impl RawComment {
    pub fn new(body: impl Into<String>, score: i64) -> Self {
        Self {
            body: body.into(),
            score,
        }
    }
}
