//! JSON hand-off of a finished cycle for the dashboard

use crate::ranking::RankedAssetTable;
use crate::sentiment::{SentimentDistribution, SentimentTally};
use chrono::{DateTime, Utc};
use common::{CommentRecord, PostSummary, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub counts: SentimentTally,
    pub distribution: SentimentDistribution,
}

/// The ranked asset table, the comment table and the sentiment split of one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub generated_at: DateTime<Utc>,
    pub thread: PostSummary,
    pub ranked: RankedAssetTable,
    pub comments: Vec<CommentRecord>,
    pub sentiment: SentimentSummary,
}

impl Snapshot {
    pub fn new(
        thread: PostSummary,
        ranked: RankedAssetTable,
        comments: Vec<CommentRecord>,
        sentiment: SentimentTally,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            thread,
            ranked,
            comments,
            sentiment: SentimentSummary {
                counts: sentiment,
                distribution: sentiment.distribution(),
            },
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::asset;
    use crate::catalog::AssetCatalog;
    use crate::ranking::MentionTally;
    use common::SentimentLabel;

    fn snapshot() -> Snapshot {
        let catalog = AssetCatalog::from_records(vec![asset("BITCOIN", "BTC")]);
        let comments = vec![CommentRecord {
            body: "BTC to the moon".to_string(),
            karma: 12,
            sentiment: SentimentLabel::Positive,
            mentions: vec!["BITCOIN".to_string()],
        }];
        let ranked = RankedAssetTable::build(&catalog, &MentionTally::from_comments(&comments));

        let mut tally = SentimentTally::default();
        tally.record(SentimentLabel::Positive);
        tally.record(SentimentLabel::Neutral);

        Snapshot::new(
            PostSummary {
                id: "p2".to_string(),
                title: "Daily Discussion".to_string(),
            },
            ranked,
            comments,
            tally,
        )
    }

    #[test]
    fn test_snapshot_json_shape() {
        let json: serde_json::Value = serde_json::from_str(&snapshot().to_json().unwrap()).unwrap();

        let row = &json["ranked"]["rows"][0];
        assert_eq!(row["name"], "BITCOIN");
        assert_eq!(row["symbol"], "BTC");
        assert_eq!(row["mention_count"], 1);
        assert_eq!(json["comments"][0]["sentiment"], "Positive");
        assert_eq!(json["sentiment"]["counts"]["positive"], 1);
        assert_eq!(json["sentiment"]["distribution"]["neutral_pct"], 50.0);
    }

    #[test]
    fn test_write_to_file() {
        let dir = std::env::temp_dir().join("crypto-pulse-snapshot-test");
        let path = dir.join("snapshot.json");

        let snapshot = snapshot();
        snapshot.write_to(&path).unwrap();

        let written: Snapshot =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(written, snapshot);
    }
}
