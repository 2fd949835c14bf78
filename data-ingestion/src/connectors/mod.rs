pub mod coinmarketcap;
pub mod reddit;

pub use coinmarketcap::CoinMarketCapConnector;
pub use reddit::{RedditConnector, RedditCredentials};
