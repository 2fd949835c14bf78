use common::MarketDataSource;
use data_ingestion::CoinMarketCapConnector;
use tracing::info;
use tracing_subscriber::fmt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Smoke test against the live listing page
    // Run with: cargo run --bin fetch_listing
    let connector = CoinMarketCapConnector::new()?;
    info!("Fetching listing from {}", connector.listing_url());

    let start = std::time::Instant::now();
    let listing = connector.fetch_listing().await?;

    info!(
        "Fetched {} assets in {} ms",
        listing.len(),
        start.elapsed().as_millis()
    );

    for asset in listing.iter().take(10) {
        info!(
            "{:<6} {:<20} ${:>12} 1h {:>7}% 24h {:>7}% 7d {:>7}%",
            asset.symbol,
            asset.name,
            asset.price_usd.to_string(),
            asset.percent_change_1h.to_string(),
            asset.percent_change_24h.to_string(),
            asset.percent_change_7d.to_string()
        );
    }

    Ok(())
}
