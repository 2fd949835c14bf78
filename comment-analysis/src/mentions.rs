//! Asset mention extraction
//!
//! The vocabulary is every ticker and every canonical name of the catalog,
//! minus configured noise words. An entry is mentioned only when it appears
//! as whole tokens of the comment: "BITCOINX" never matches "BITCOIN".
//! Names made of several words ("BITCOIN CASH") match as a contiguous run of
//! tokens. Each matched entry resolves to a canonical name through the
//! catalog, so an asset reached by both ticker and name counts once.

use crate::catalog::AssetCatalog;
use crate::text::tokenize;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone)]
struct VocabularyEntry {
    /// Uppercased ticker or name as listed
    text: String,
    tokens: Vec<String>,
}

pub struct MentionExtractor<'a> {
    catalog: &'a AssetCatalog,
    vocabulary: Vec<VocabularyEntry>,
}

impl<'a> MentionExtractor<'a> {
    pub fn new(catalog: &'a AssetCatalog, noise_words: &[String]) -> Self {
        let noise: HashSet<String> = noise_words.iter().map(|w| w.to_uppercase()).collect();

        let symbols = catalog.records().iter().map(|r| r.symbol.to_uppercase());
        let names = catalog.records().iter().map(|r| r.name.to_uppercase());

        let mut seen = HashSet::new();
        let vocabulary: Vec<VocabularyEntry> = symbols
            .chain(names)
            .filter(|text| !noise.contains(text))
            .filter(|text| seen.insert(text.clone()))
            .filter_map(|text| {
                let tokens = tokenize(&text);
                (!tokens.is_empty()).then_some(VocabularyEntry { text, tokens })
            })
            .collect();

        debug!(entries = vocabulary.len(), "Mention vocabulary built");

        Self { catalog, vocabulary }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Canonical names mentioned in `text`, deduplicated.
    ///
    /// Results follow vocabulary order (tickers, then names). An empty result
    /// means the comment mentions no asset.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Vec::new();
        }
        let token_set: HashSet<&str> = tokens.iter().map(String::as_str).collect();

        let mut mentioned: Vec<String> = Vec::new();
        for entry in &self.vocabulary {
            if !Self::appears(entry, &tokens, &token_set) {
                continue;
            }

            match self.catalog.resolve(&entry.text) {
                Some(name) => {
                    if !mentioned.iter().any(|m| m == name) {
                        mentioned.push(name.to_string());
                    }
                }
                None => debug!(entry = %entry.text, "Matched entry missing from catalog lookups"),
            }
        }

        mentioned
    }

    fn appears(entry: &VocabularyEntry, tokens: &[String], token_set: &HashSet<&str>) -> bool {
        match entry.tokens.as_slice() {
            [single] => token_set.contains(single.as_str()),
            run => tokens.windows(run.len()).any(|window| window == run),
        }
    }
}
