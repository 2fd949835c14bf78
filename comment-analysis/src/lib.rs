//! Daily discussion analysis
//!
//! Collects the top-level comments of a community's daily discussion thread,
//! classifies each comment's sentiment, finds the crypto assets it mentions
//! and ranks assets by mention count joined with their market data.
//!
//! - `text`: media markup stripping and tokenization
//! - `sentiment`: VADER-based classifier and label tally
//! - `catalog` / `mentions`: asset lookups and token-exact mention matching
//! - `ranking`: mention tally and the ranked asset table
//! - `session`: the scrape cycle tying the sources and the analysis together

pub mod catalog;
pub mod config;
pub mod locator;
pub mod mentions;
pub mod ranking;
pub mod sentiment;
pub mod session;
pub mod snapshot;
pub mod text;

// Re-export commonly used types
pub use catalog::AssetCatalog;
pub use config::{load_config, load_or_default, ScraperConfig};
pub use mentions::MentionExtractor;
pub use ranking::{MentionTally, RankedAsset, RankedAssetTable};
pub use sentiment::{SentimentClassifier, SentimentDistribution, SentimentScore, SentimentTally};
pub use session::{CycleReport, ScrapeSession};
pub use snapshot::Snapshot;

pub use common::{AssetRecord, CommentRecord, PostSummary, SentimentLabel};
