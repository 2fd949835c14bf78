//! Mention counting and the ranked asset table

use crate::catalog::AssetCatalog;
use common::{AssetRecord, CommentRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Mention count per canonical name. Assets never mentioned are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionTally {
    counts: HashMap<String, u32>,
}

impl MentionTally {
    pub fn from_comments(comments: &[CommentRecord]) -> Self {
        let mut counts: HashMap<String, u32> = HashMap::new();

        for comment in comments {
            for name in &comment.mentions {
                *counts.entry(name.clone()).or_insert(0) += 1;
            }
        }

        Self { counts }
    }

    pub fn count(&self, name: &str) -> u32 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// Number of distinct assets mentioned
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(name, &count)| (name.as_str(), count))
    }
}

/// One row of the ranking: the asset's market data plus its mention count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAsset {
    #[serde(flatten)]
    pub asset: AssetRecord,
    pub mention_count: u32,
}

/// Assets with at least one mention, most mentioned first.
///
/// Equal counts keep catalog (listing) order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedAssetTable {
    rows: Vec<RankedAsset>,
}

impl RankedAssetTable {
    pub fn build(catalog: &AssetCatalog, tally: &MentionTally) -> Self {
        let mut entries: Vec<(usize, &str, u32)> = Vec::with_capacity(tally.len());

        for (name, count) in tally.iter().filter(|&(_, count)| count > 0) {
            match catalog.position(name) {
                Some(position) => entries.push((position, name, count)),
                None => warn!(name, count, "Mentioned asset missing from catalog"),
            }
        }

        // Catalog order first, then a stable sort on the count alone
        entries.sort_by_key(|&(position, _, _)| position);
        entries.sort_by(|a, b| b.2.cmp(&a.2));

        let rows = entries
            .into_iter()
            .filter_map(|(_, name, count)| {
                catalog.get(name).map(|asset| RankedAsset {
                    asset: asset.clone(),
                    mention_count: count,
                })
            })
            .collect();

        Self { rows }
    }

    pub fn rows(&self) -> &[RankedAsset] {
        &self.rows
    }

    /// The `n` most mentioned assets
    pub fn top(&self, n: usize) -> &[RankedAsset] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
