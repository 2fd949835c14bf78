//! Asset catalog built from one market listing

use common::AssetRecord;
use std::collections::HashMap;
use tracing::debug;

/// The asset universe of one cycle, with ticker and name lookups.
///
/// Tickers are unique: when a listing repeats a ticker, the first record
/// (listing order) is kept and later ones are dropped.
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    records: Vec<AssetRecord>,
    by_symbol: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl AssetCatalog {
    pub fn from_records(listing: Vec<AssetRecord>) -> Self {
        let mut catalog = Self::default();
        let mut duplicates = 0usize;

        for mut record in listing {
            record.name = record.name.to_uppercase();
            record.symbol = record.symbol.to_uppercase();

            if catalog.by_symbol.contains_key(&record.symbol) {
                debug!(symbol = %record.symbol, name = %record.name, "Dropping duplicate ticker");
                duplicates += 1;
                continue;
            }

            let index = catalog.records.len();
            catalog.by_symbol.insert(record.symbol.clone(), index);
            catalog.by_name.entry(record.name.clone()).or_insert(index);
            catalog.records.push(record);
        }

        if duplicates > 0 {
            debug!(
                duplicates,
                kept = catalog.records.len(),
                "Catalog built with duplicate tickers removed"
            );
        }

        catalog
    }

    /// Records in listing order
    pub fn records(&self) -> &[AssetRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Canonical name for a ticker or a name: ticker table first, then name table
    pub fn resolve(&self, entry: &str) -> Option<&str> {
        self.by_symbol
            .get(entry)
            .or_else(|| self.by_name.get(entry))
            .map(|&index| self.records[index].name.as_str())
    }

    /// Record for a canonical name
    pub fn get(&self, name: &str) -> Option<&AssetRecord> {
        self.by_name.get(name).map(|&index| &self.records[index])
    }

    /// Position of the record for a canonical name, used to keep listing order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_decimal::Decimal;

    pub(crate) fn asset(name: &str, symbol: &str) -> AssetRecord {
        AssetRecord {
            name: name.to_string(),
            symbol: symbol.to_string(),
            price_usd: Decimal::ONE,
            percent_change_1h: Decimal::ZERO,
            percent_change_24h: Decimal::ZERO,
            percent_change_7d: Decimal::ZERO,
        }
    }

    #[test]
    fn test_resolve_ticker_then_name() {
        let catalog = AssetCatalog::from_records(vec![
            asset("BITCOIN", "BTC"),
            asset("ETHEREUM", "ETH"),
        ]);

        assert_eq!(catalog.resolve("BTC"), Some("BITCOIN"));
        assert_eq!(catalog.resolve("BITCOIN"), Some("BITCOIN"));
        assert_eq!(catalog.resolve("ETH"), Some("ETHEREUM"));
        assert_eq!(catalog.resolve("DOGE"), None);
    }

    #[test]
    fn test_ticker_wins_over_name() {
        // "TRON" is both a ticker of one asset and the name of another
        let catalog = AssetCatalog::from_records(vec![
            asset("TRON", "TRX"),
            asset("TRONPAD", "TRON"),
        ]);

        assert_eq!(catalog.resolve("TRON"), Some("TRONPAD"));
        assert_eq!(catalog.resolve("TRX"), Some("TRON"));
    }

    #[test]
    fn test_duplicate_tickers_keep_first() {
        let catalog = AssetCatalog::from_records(vec![
            asset("BITCOIN", "BTC"),
            asset("BITCOIN TOKEN", "BTC"),
            asset("ETHEREUM", "ETH"),
        ]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.resolve("BTC"), Some("BITCOIN"));
        assert!(catalog.get("BITCOIN TOKEN").is_none());
        assert_eq!(catalog.position("ETHEREUM"), Some(1));
    }

    #[test]
    fn test_uppercases_records() {
        let catalog = AssetCatalog::from_records(vec![asset("Cardano", "ada")]);
        assert_eq!(catalog.records()[0].name, "CARDANO");
        assert_eq!(catalog.resolve("ADA"), Some("CARDANO"));
    }
}
