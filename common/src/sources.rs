//! Traits for the external sources a scrape cycle reads from
//!
//! The live implementations live in `data-ingestion`; tests substitute
//! in-memory fakes.

use crate::{AssetRecord, PostSummary, RawComment, Result};
use async_trait::async_trait;

/// Produces the full asset catalog for one cycle
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch every listed asset, numeric fields already rounded to 2 places.
    ///
    /// Either the whole listing is returned or an error; there is no
    /// partial catalog.
    async fn fetch_listing(&self) -> Result<Vec<AssetRecord>>;
}

/// Forum access: hot posts of a community and the comments of one post
#[async_trait]
pub trait ThreadSource: Send + Sync {
    /// The `limit` hottest posts of `community`, in listing order
    async fn hot_posts(&self, community: &str, limit: usize) -> Result<Vec<PostSummary>>;

    /// Top-level comments of `post_id` in thread order.
    ///
    /// At most `expand_limit` "load more comments" placeholders are expanded;
    /// any left over are dropped.
    async fn top_level_comments(
        &self,
        post_id: &str,
        expand_limit: usize,
    ) -> Result<Vec<RawComment>>;
}
