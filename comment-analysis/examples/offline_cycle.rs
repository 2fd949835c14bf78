//! Runs one scrape cycle against in-memory sources
//!
//! Shows the full pipeline without network access:
//! 1. A fixed three-asset listing stands in for the market page
//! 2. A fake forum serves one daily discussion thread
//! 3. The session classifies, extracts mentions and ranks
//!
//! Run with: cargo run -p comment-analysis --example offline_cycle

use anyhow::Result;
use async_trait::async_trait;
use comment_analysis::{ScrapeSession, ScraperConfig};
use common::{AssetRecord, MarketDataSource, PostSummary, RawComment, ThreadSource};
use rust_decimal_macros::dec;
use tracing::{info, Level};

struct StaticListing;

#[async_trait]
impl MarketDataSource for StaticListing {
    async fn fetch_listing(&self) -> common::Result<Vec<AssetRecord>> {
        Ok(vec![
            AssetRecord {
                name: "BITCOIN".to_string(),
                symbol: "BTC".to_string(),
                price_usd: dec!(64321.57),
                percent_change_1h: dec!(0.12),
                percent_change_24h: dec!(-1.04),
                percent_change_7d: dec!(3.88),
            },
            AssetRecord {
                name: "ETHEREUM".to_string(),
                symbol: "ETH".to_string(),
                price_usd: dec!(3120.40),
                percent_change_1h: dec!(-0.31),
                percent_change_24h: dec!(2.15),
                percent_change_7d: dec!(6.02),
            },
            AssetRecord {
                name: "CARDANO".to_string(),
                symbol: "ADA".to_string(),
                price_usd: dec!(0.45),
                percent_change_1h: dec!(0.02),
                percent_change_24h: dec!(0.77),
                percent_change_7d: dec!(-4.5),
            },
        ])
    }
}

struct StaticThread;

#[async_trait]
impl ThreadSource for StaticThread {
    async fn hot_posts(
        &self,
        _community: &str,
        _limit: usize,
    ) -> common::Result<Vec<PostSummary>> {
        Ok(vec![PostSummary {
            id: "demo01".to_string(),
            title: "Daily Discussion - October 17, 2026 (GMT+0)".to_string(),
        }])
    }

    async fn top_level_comments(
        &self,
        _post_id: &str,
        _expand_limit: usize,
    ) -> common::Result<Vec<RawComment>> {
        Ok(vec![
            RawComment::new("Welcome to the Daily Discussion. Read the rules first.", 1),
            RawComment::new("BTC looking great today, love it", 54),
            RawComment::new("ETH gas fees are terrible again", 21),
            RawComment::new(
                "Cardano and bitcoin both holding up ![gif](giphy|l0HlvtIPzPdt2usKs)",
                8,
            ),
            RawComment::new("one day we will all make it", 3),
        ])
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let mut session = ScrapeSession::new(
        Box::new(StaticListing),
        Box::new(StaticThread),
        ScraperConfig::default(),
    )?;

    let report = session.run_cycle().await?;
    info!("{}", report.summary());

    for row in session.ranked_table().rows() {
        info!(
            "{:<6} mentions {}  ${}",
            row.asset.symbol, row.mention_count, row.asset.price_usd
        );
    }

    for comment in session.comments() {
        info!("[{}] ({}) {}", comment.sentiment, comment.mentions_joined(), comment.body);
    }

    if let Some(snapshot) = session.snapshot() {
        println!("{}", snapshot.to_json()?);
    }

    Ok(())
}
