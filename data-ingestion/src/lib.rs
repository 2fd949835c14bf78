//! Connectors for the two external sources of a scrape cycle
//!
//! - `CoinMarketCapConnector`: full asset listing from the market-data page
//! - `RedditConnector`: hot posts and top-level comments of a community

pub mod connectors;

pub use connectors::{CoinMarketCapConnector, RedditConnector, RedditCredentials};
