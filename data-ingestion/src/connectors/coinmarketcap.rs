use async_trait::async_trait;
use common::{AssetRecord, MarketDataSource, Result, ScrapeError};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_LISTING_URL: &str = "https://coinmarketcap.com/all/views/all/";

lazy_static! {
    /// The page embeds its whole state as JSON in a script element
    static ref EMBEDDED_JSON: Regex = Regex::new(
        r#"(?is)<script[^>]*type\s*=\s*["']application/json["'][^>]*>(.*?)</script>"#
    )
    .unwrap();
}

/// CoinMarketCap "all cryptocurrencies" listing connector
///
/// The listing page is HTML with the full state embedded as a JSON payload;
/// the connector fetches the page and reads every entry of
/// `props.initialState.cryptocurrency.listingLatest.data`.
pub struct CoinMarketCapConnector {
    listing_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct PagePayload {
    props: PageProps,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    #[serde(rename = "initialState")]
    initial_state: InitialState,
}

#[derive(Debug, Deserialize)]
struct InitialState {
    cryptocurrency: CryptocurrencyState,
}

#[derive(Debug, Deserialize)]
struct CryptocurrencyState {
    #[serde(rename = "listingLatest")]
    listing_latest: ListingLatest,
}

#[derive(Debug, Deserialize)]
struct ListingLatest {
    data: Vec<ListingEntry>,
}

#[derive(Debug, Deserialize)]
struct ListingEntry {
    name: String,
    symbol: String,
    quotes: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    price: f64,
    #[serde(rename = "percentChange1h")]
    percent_change_1h: f64,
    #[serde(rename = "percentChange24h")]
    percent_change_24h: f64,
    #[serde(rename = "percentChange7d")]
    percent_change_7d: f64,
}

impl CoinMarketCapConnector {
    pub fn new() -> Result<Self> {
        Self::with_settings(DEFAULT_LISTING_URL, Duration::from_secs(30), "crypto-pulse/0.1")
    }

    pub fn with_settings(
        listing_url: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            listing_url: listing_url.into(),
            client,
        })
    }

    pub fn listing_url(&self) -> &str {
        &self.listing_url
    }

    async fn fetch_page(&self) -> Result<String> {
        info!("Reading market data from {}", self.listing_url);

        let response = self.client.get(&self.listing_url).send().await?;

        if !response.status().is_success() {
            return Err(ScrapeError::MarketData(format!(
                "listing page returned {}",
                response.status()
            )));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl MarketDataSource for CoinMarketCapConnector {
    async fn fetch_listing(&self) -> Result<Vec<AssetRecord>> {
        let page = self.fetch_page().await?;
        let records = parse_listing_html(&page)?;

        info!(assets = records.len(), "Market listing fetched");
        Ok(records)
    }
}

/// Extract the asset listing from the listing page HTML.
///
/// Names and symbols are uppercased, numeric fields rounded to 2 places.
/// Any deviation from the expected payload shape fails the whole listing.
pub fn parse_listing_html(html: &str) -> Result<Vec<AssetRecord>> {
    let payload = EMBEDDED_JSON
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .ok_or_else(|| ScrapeError::MarketData("embedded JSON payload not found".to_string()))?;

    let page: PagePayload = serde_json::from_str(payload)
        .map_err(|e| ScrapeError::MarketData(format!("unexpected payload shape: {}", e)))?;

    let entries = page.props.initial_state.cryptocurrency.listing_latest.data;
    if entries.is_empty() {
        return Err(ScrapeError::MarketData("listing is empty".to_string()));
    }

    debug!("Payload carries {} listing entries", entries.len());

    entries.into_iter().map(to_asset_record).collect()
}

fn to_asset_record(entry: ListingEntry) -> Result<AssetRecord> {
    let quote = entry.quotes.first().ok_or_else(|| {
        ScrapeError::MarketData(format!("no quote for {}", entry.symbol))
    })?;

    Ok(AssetRecord {
        name: entry.name.to_uppercase(),
        symbol: entry.symbol.to_uppercase(),
        price_usd: round_2dp(quote.price, &entry.symbol)?,
        percent_change_1h: round_2dp(quote.percent_change_1h, &entry.symbol)?,
        percent_change_24h: round_2dp(quote.percent_change_24h, &entry.symbol)?,
        percent_change_7d: round_2dp(quote.percent_change_7d, &entry.symbol)?,
    })
}

/// Half-even rounding of the exact binary value, so 2.675 (stored as
/// 2.67499...) becomes 2.67
fn round_2dp(value: f64, symbol: &str) -> Result<Decimal> {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp(2))
        .ok_or_else(|| ScrapeError::MarketData(format!("non-numeric quote field for {}", symbol)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn page_with(payload: &str) -> String {
        format!(
            r#"<html><head><title>All Cryptocurrencies</title></head><body>
<div id="__next"></div>
<script id="__NEXT_DATA__" type="application/json">{}</script>
</body></html>"#,
            payload
        )
    }

    const LISTING: &str = r#"{"props":{"initialState":{"cryptocurrency":{"listingLatest":{"data":[
        {"name":"Bitcoin","symbol":"btc","quotes":[{"price":64321.5678,"percentChange1h":-0.1234,"percentChange24h":1.505,"percentChange7d":4.0}]},
        {"name":"Ethereum","symbol":"ETH","quotes":[{"price":3120.004,"percentChange1h":0.5,"percentChange24h":-2.345,"percentChange7d":7.891}]}
    ]}}}}}"#;

    #[test]
    fn test_parse_listing() {
        let records = parse_listing_html(&page_with(LISTING)).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "BITCOIN");
        assert_eq!(records[0].symbol, "BTC");
        assert_eq!(records[0].price_usd, dec!(64321.57));
        assert_eq!(records[0].percent_change_1h, dec!(-0.12));
        assert_eq!(records[1].name, "ETHEREUM");
        assert_eq!(records[1].price_usd, dec!(3120.00));
        assert_eq!(records[1].percent_change_7d, dec!(7.89));
    }

    #[test]
    fn test_rounds_binary_value_half_even() {
        assert_eq!(round_2dp(2.675, "X").unwrap(), dec!(2.67));
        assert_eq!(round_2dp(2.665, "X").unwrap(), dec!(2.67));
        assert_eq!(round_2dp(1.005, "X").unwrap(), dec!(1.00));
        assert_eq!(round_2dp(0.125, "X").unwrap(), dec!(0.12));
        assert_eq!(round_2dp(-2.345, "X").unwrap(), dec!(-2.35));
    }

    #[test]
    fn test_missing_payload() {
        let err = parse_listing_html("<html><body>maintenance</body></html>").unwrap_err();
        assert!(matches!(err, ScrapeError::MarketData(_)));
    }

    #[test]
    fn test_changed_shape() {
        let html = page_with(r#"{"props":{"pageProps":{}}}"#);
        let err = parse_listing_html(&html).unwrap_err();
        assert!(matches!(err, ScrapeError::MarketData(_)));
    }

    #[test]
    fn test_entry_without_quotes() {
        let html = page_with(
            r#"{"props":{"initialState":{"cryptocurrency":{"listingLatest":{"data":[
                {"name":"Bitcoin","symbol":"BTC","quotes":[]}
            ]}}}}}"#,
        );
        let err = parse_listing_html(&html).unwrap_err();
        assert!(matches!(err, ScrapeError::MarketData(_)));
    }

    #[test]
    fn test_empty_listing() {
        let html = page_with(
            r#"{"props":{"initialState":{"cryptocurrency":{"listingLatest":{"data":[]}}}}}"#,
        );
        assert!(parse_listing_html(&html).is_err());
    }
}
