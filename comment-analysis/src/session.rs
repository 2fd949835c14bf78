//! Scrape session: one owner for the catalog, the comment set and the
//! sentiment tally of the latest cycle
//!
//! A cycle runs reset → market listing → thread lookup → per-comment
//! cleaning, sentiment and mention extraction. Results are committed only
//! when every step succeeds, so after a failed cycle the session is empty
//! rather than a mix of old and new data.

use crate::catalog::AssetCatalog;
use crate::config::ScraperConfig;
use crate::locator::locate_thread;
use crate::mentions::MentionExtractor;
use crate::ranking::{MentionTally, RankedAssetTable};
use crate::sentiment::{SentimentClassifier, SentimentTally};
use crate::snapshot::Snapshot;
use crate::text::clean_comment;
use chrono::{DateTime, Utc};
use common::{
    CommentRecord, MarketDataSource, PostSummary, Result, ScrapeError, ThreadSource,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// What a finished cycle did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub thread: PostSummary,
    pub catalog_size: usize,
    /// Top-level comments classified (the pinned one excluded)
    pub comments_examined: usize,
    /// Comments kept because they mention at least one asset
    pub comments_retained: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CycleReport {
    pub fn summary(&self) -> String {
        format!("Collected {} comments.", self.comments_retained)
    }
}

pub struct ScrapeSession {
    market: Box<dyn MarketDataSource>,
    forum: Box<dyn ThreadSource>,
    config: ScraperConfig,
    classifier: SentimentClassifier,

    // State of the latest successful cycle
    catalog: AssetCatalog,
    comments: Vec<CommentRecord>,
    sentiment: SentimentTally,
    thread: Option<PostSummary>,
}

impl ScrapeSession {
    pub fn new(
        market: Box<dyn MarketDataSource>,
        forum: Box<dyn ThreadSource>,
        config: ScraperConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            market,
            forum,
            classifier: SentimentClassifier::new(config.analysis.sentiment_threshold),
            config,
            catalog: AssetCatalog::default(),
            comments: Vec::new(),
            sentiment: SentimentTally::default(),
            thread: None,
        })
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Drop the catalog, comments, sentiment tally and thread of the last cycle
    pub fn reset(&mut self) {
        self.catalog = AssetCatalog::default();
        self.comments = Vec::new();
        self.sentiment = SentimentTally::default();
        self.thread = None;
    }

    /// Run one full cycle, replacing all session state on success.
    ///
    /// Any fetch failure or a missing discussion thread aborts the cycle and
    /// leaves the session reset.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        self.reset();

        let started_at = Utc::now();
        let start = Instant::now();
        info!("Starting scrape cycle");

        let listing = self.market.fetch_listing().await?;
        let catalog = AssetCatalog::from_records(listing);
        if catalog.is_empty() {
            return Err(ScrapeError::MarketData(
                "listing produced an empty catalog".to_string(),
            ));
        }
        info!(assets = catalog.len(), "Catalog ready");

        let forum = &self.config.forum;
        let posts = self.forum.hot_posts(&forum.community, forum.hot_limit).await?;
        let thread = locate_thread(&posts, &forum.title_pattern, &forum.community)?.clone();
        info!(id = %thread.id, title = %thread.title, "Discussion thread located");

        let raw_comments = self
            .forum
            .top_level_comments(&thread.id, forum.expand_limit)
            .await?;
        let skip = usize::from(forum.skip_first);

        let extractor = MentionExtractor::new(&catalog, &self.config.analysis.noise_words);
        let mut comments = Vec::new();
        let mut sentiment = SentimentTally::default();
        let mut examined = 0usize;

        for raw in raw_comments.into_iter().skip(skip) {
            examined += 1;

            let body = clean_comment(&raw.body);
            let score = self.classifier.classify(&body);
            sentiment.record(score.label);

            let mentions = extractor.extract(&body);
            if mentions.is_empty() {
                continue;
            }

            debug!(
                karma = raw.score,
                label = %score.label,
                mentions = ?mentions,
                "Comment retained"
            );
            comments.push(CommentRecord {
                body,
                karma: raw.score,
                sentiment: score.label,
                mentions,
            });
        }

        let report = CycleReport {
            thread: thread.clone(),
            catalog_size: catalog.len(),
            comments_examined: examined,
            comments_retained: comments.len(),
            started_at,
            finished_at: Utc::now(),
        };

        self.catalog = catalog;
        self.comments = comments;
        self.sentiment = sentiment;
        self.thread = Some(thread);

        info!(
            examined = report.comments_examined,
            retained = report.comments_retained,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "{}",
            report.summary()
        );

        Ok(report)
    }

    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    /// Retained comments in thread order
    pub fn comments(&self) -> &[CommentRecord] {
        &self.comments
    }

    pub fn sentiment(&self) -> &SentimentTally {
        &self.sentiment
    }

    pub fn thread(&self) -> Option<&PostSummary> {
        self.thread.as_ref()
    }

    /// Mention counts over the current comment set
    pub fn count_mentions(&self) -> MentionTally {
        MentionTally::from_comments(&self.comments)
    }

    pub fn ranked_table(&self) -> RankedAssetTable {
        RankedAssetTable::build(&self.catalog, &self.count_mentions())
    }

    /// Hand-off view of the latest cycle; `None` until a cycle has succeeded
    pub fn snapshot(&self) -> Option<Snapshot> {
        let thread = self.thread.clone()?;
        Some(Snapshot::new(
            thread,
            self.ranked_table(),
            self.comments.clone(),
            self.sentiment,
        ))
    }
}
