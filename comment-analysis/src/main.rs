use anyhow::{Context, Result};
use comment_analysis::config::{self, OutputConfig};
use comment_analysis::{ScrapeSession, SentimentLabel};
use data_ingestion::{CoinMarketCapConnector, RedditConnector, RedditCredentials};
use std::time::Duration;
use tracing::{error, info, warn, Level};

const CONFIG_ENV: &str = "CRYPTO_PULSE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "crypto-pulse.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = config::load_or_default(&path)
        .with_context(|| format!("Failed to load configuration from {}", path))?;
    config.apply_env_overrides();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(config.log_level.parse::<Level>().unwrap_or(Level::INFO))
        .init();

    info!("🚀 Starting crypto-pulse for r/{}", config.forum.community);

    let market = CoinMarketCapConnector::with_settings(
        config.market.listing_url.clone(),
        Duration::from_secs(config.market.timeout_secs),
        &config.market.user_agent,
    )?;
    let forum = RedditConnector::new(RedditCredentials {
        client_id: config.forum.client_id.clone(),
        client_secret: config.forum.client_secret.clone(),
        user_agent: config.forum.user_agent.clone(),
    })
    .context("Reddit credentials missing (set REDDIT_CLIENT_ID and REDDIT_CLIENT_SECRET)")?;

    let output = config.output.clone();
    let mut session = ScrapeSession::new(Box::new(market), Box::new(forum), config)?;

    let Some(interval_secs) = output.refresh_interval_secs else {
        session.run_cycle().await?;
        return publish(&session, &output);
    };

    info!("Refreshing every {} seconds, Ctrl-C to stop", interval_secs);

    loop {
        // One cycle at a time; the next starts only after this one finished
        let outcome = tokio::select! {
            result = session.run_cycle() => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        };

        match outcome {
            None => break,
            Some(Ok(_)) => {
                if let Err(e) = publish(&session, &output) {
                    error!("Failed to publish snapshot: {:#}", e);
                }
            }
            Some(Err(e)) => error!("Scrape cycle failed: {}", e),
        }

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(interval_secs)) => {}
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    info!("👋 Shutting down");
    Ok(())
}

/// Log the top of the ranking and write the snapshot when configured
fn publish(session: &ScrapeSession, output: &OutputConfig) -> Result<()> {
    let ranked = session.ranked_table();

    if ranked.is_empty() {
        warn!("No asset mentioned in the collected comments");
    }

    for (rank, row) in ranked.top(output.top_n).iter().enumerate() {
        info!(
            "#{:<2} {:<8} {:<24} mentions {:>4}  ${} (1h {}%, 24h {}%, 7d {}%)",
            rank + 1,
            row.asset.symbol,
            row.asset.name,
            row.mention_count,
            row.asset.price_usd,
            row.asset.percent_change_1h,
            row.asset.percent_change_24h,
            row.asset.percent_change_7d
        );
    }

    let sentiment = session.sentiment();
    let distribution = sentiment.distribution();
    info!(
        "Sentiment: {} {} ({:.1}%), {} {} ({:.1}%), {} {} ({:.1}%)",
        SentimentLabel::Positive,
        sentiment.positive,
        distribution.positive_pct,
        SentimentLabel::Neutral,
        sentiment.neutral,
        distribution.neutral_pct,
        SentimentLabel::Negative,
        sentiment.negative,
        distribution.negative_pct
    );

    if let Some(path) = &output.snapshot_path {
        let snapshot = session
            .snapshot()
            .context("No completed cycle to snapshot")?;
        snapshot
            .write_to(path)
            .with_context(|| format!("Failed to write snapshot to {}", path))?;
        info!("Snapshot written to {}", path);
    }

    Ok(())
}
