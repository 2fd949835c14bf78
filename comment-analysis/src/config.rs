//! Scraper configuration

use common::ScrapeError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Overall scraper configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Where the discussion thread is found and how much of it is read
    #[serde(default)]
    pub forum: ForumConfig,

    /// Market listing source
    #[serde(default)]
    pub market: MarketConfig,

    /// Sentiment and mention matching settings
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// What the binary does with a finished cycle
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            forum: ForumConfig::default(),
            market: MarketConfig::default(),
            analysis: AnalysisConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumConfig {
    #[serde(default = "default_community")]
    pub community: String,

    /// Number of hot posts scanned for the discussion thread
    #[serde(default = "default_hot_limit")]
    pub hot_limit: usize,

    /// Case-sensitive substring the thread title must contain
    #[serde(default = "default_title_pattern")]
    pub title_pattern: String,

    /// How many "load more comments" placeholders are expanded.
    /// Each one costs an extra request.
    #[serde(default = "default_expand_limit")]
    pub expand_limit: usize,

    /// Skip the first top-level comment (the pinned moderator comment)
    #[serde(default = "default_skip_first")]
    pub skip_first: bool,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Usually supplied through REDDIT_CLIENT_ID instead
    #[serde(default)]
    pub client_id: String,

    /// Usually supplied through REDDIT_CLIENT_SECRET instead
    #[serde(default)]
    pub client_secret: String,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            community: default_community(),
            hot_limit: default_hot_limit(),
            title_pattern: default_title_pattern(),
            expand_limit: default_expand_limit(),
            skip_first: default_skip_first(),
            user_agent: default_user_agent(),
            client_id: String::new(),
            client_secret: String::new(),
        }
    }
}

fn default_community() -> String {
    "CryptoCurrency".to_string()
}

fn default_hot_limit() -> usize {
    5
}

fn default_title_pattern() -> String {
    "Daily Discussion".to_string()
}

fn default_expand_limit() -> usize {
    1
}

fn default_skip_first() -> bool {
    true
}

fn default_user_agent() -> String {
    "crypto-pulse/0.1".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_listing_url")]
    pub listing_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            listing_url: default_listing_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_listing_url() -> String {
    data_ingestion::connectors::coinmarketcap::DEFAULT_LISTING_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Compound scores strictly above this are Positive, strictly below its
    /// negation Negative
    #[serde(default = "default_sentiment_threshold")]
    pub sentiment_threshold: f64,

    /// Vocabulary entries never matched, whether ticker or name
    #[serde(default = "default_noise_words")]
    pub noise_words: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sentiment_threshold: default_sentiment_threshold(),
            noise_words: default_noise_words(),
        }
    }
}

fn default_sentiment_threshold() -> f64 {
    0.03
}

fn default_noise_words() -> Vec<String> {
    vec!["ONE".to_string()]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Rows of the ranking logged after each cycle
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Write the cycle snapshot as JSON here
    #[serde(default)]
    pub snapshot_path: Option<String>,

    /// Run cycles back to back with this pause; a single cycle when unset
    #[serde(default)]
    pub refresh_interval_secs: Option<u64>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            snapshot_path: None,
            refresh_interval_secs: None,
        }
    }
}

fn default_top_n() -> usize {
    10
}

impl ScraperConfig {
    /// Reject values no cycle can run with
    pub fn validate(&self) -> Result<(), ScrapeError> {
        let threshold = self.analysis.sentiment_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ScrapeError::Config(format!(
                "sentiment_threshold must be a non-negative number, got {}",
                threshold
            )));
        }
        if self.forum.hot_limit == 0 {
            return Err(ScrapeError::Config("hot_limit must be at least 1".to_string()));
        }
        if self.forum.title_pattern.is_empty() {
            return Err(ScrapeError::Config("title_pattern must not be empty".to_string()));
        }
        if self.forum.community.is_empty() {
            return Err(ScrapeError::Config("community must not be empty".to_string()));
        }
        Ok(())
    }

    /// Take forum credentials from REDDIT_CLIENT_ID / REDDIT_CLIENT_SECRET when set
    pub fn apply_env_overrides(&mut self) {
        if let Ok(id) = std::env::var("REDDIT_CLIENT_ID") {
            self.forum.client_id = id;
        }
        if let Ok(secret) = std::env::var("REDDIT_CLIENT_SECRET") {
            self.forum.client_secret = secret;
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> anyhow::Result<ScraperConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ScraperConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Load configuration from TOML file, or the defaults when the file does not exist
pub fn load_or_default(path: &str) -> anyhow::Result<ScraperConfig> {
    if Path::new(path).exists() {
        load_config(path)
    } else {
        Ok(ScraperConfig::default())
    }
}

/// Save configuration to TOML file
pub fn save_config(config: &ScraperConfig, path: &str) -> anyhow::Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Create a default configuration file template
pub fn create_config_template(path: &str) -> anyhow::Result<()> {
    let template = "# crypto-pulse configuration
# Credentials are best supplied via REDDIT_CLIENT_ID / REDDIT_CLIENT_SECRET

log_level = \"info\"

[forum]
community = \"CryptoCurrency\"

# Hot posts scanned for the discussion thread
hot_limit = 5

# Case-sensitive substring of the thread title
title_pattern = \"Daily Discussion\"

# \"Load more comments\" placeholders expanded per cycle (each costs a request)
expand_limit = 1

# The first top-level comment is the pinned moderator comment
skip_first = true

user_agent = \"crypto-pulse/0.1\"

[market]
listing_url = \"https://coinmarketcap.com/all/views/all/\"
timeout_secs = 30

[analysis]
# Compound score above +threshold is Positive, below -threshold Negative
sentiment_threshold = 0.03

# Never matched as a mention (ONE is an everyday word)
noise_words = [\"ONE\"]

[output]
top_n = 10
# snapshot_path = \"snapshot.json\"
# refresh_interval_secs = 600
";

    std::fs::write(path, template)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScraperConfig::default();
        assert_eq!(config.analysis.sentiment_threshold, 0.03);
        assert_eq!(config.forum.hot_limit, 5);
        assert_eq!(config.forum.title_pattern, "Daily Discussion");
        assert_eq!(config.analysis.noise_words, vec!["ONE".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = ScraperConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: ScraperConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config() {
        let config: ScraperConfig = toml::from_str(
            "[analysis]\nsentiment_threshold = 0.1\nnoise_words = [\"ONE\", \"GAS\"]\n",
        )
        .unwrap();

        assert_eq!(config.analysis.sentiment_threshold, 0.1);
        assert_eq!(config.analysis.noise_words.len(), 2);
        assert_eq!(config.forum, ForumConfig::default());
        assert_eq!(config.output.top_n, 10);
    }

    #[test]
    fn test_template_parses() {
        let path = std::env::temp_dir().join("crypto-pulse-template-test.toml");
        let path = path.to_string_lossy().to_string();

        create_config_template(&path).unwrap();
        let config = load_config(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config, ScraperConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join("crypto-pulse-save-test.toml");
        let path = path.to_string_lossy().to_string();

        let mut config = ScraperConfig::default();
        config.forum.expand_limit = 8;
        config.output.snapshot_path = Some("out/snapshot.json".to_string());

        save_config(&config, &path).unwrap();
        let loaded = load_or_default(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = load_or_default("/nonexistent/crypto-pulse.toml").unwrap();
        assert_eq!(config, ScraperConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ScraperConfig::default();
        config.analysis.sentiment_threshold = -0.5;
        assert!(config.validate().is_err());

        let mut config = ScraperConfig::default();
        config.analysis.sentiment_threshold = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = ScraperConfig::default();
        config.forum.hot_limit = 0;
        assert!(config.validate().is_err());

        let mut config = ScraperConfig::default();
        config.forum.title_pattern.clear();
        assert!(config.validate().is_err());
    }
}
