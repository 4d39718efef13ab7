//! Crawl settings.
//!
//! Every knob has a built-in default. An optional YAML file can override any
//! subset of them, and command-line flags override the file:
//!
//! ```yaml
//! limits:
//!   max_per_source: 5
//! delays:
//!   article_ms: 500
//! filter:
//!   exclude: ["영화", "드라마"]
//! sources:
//!   - id: hani
//!     display_name: 한겨레
//!     feed_url: https://www.hani.co.kr/rss/culture/
//!     selector_cascade: [".article-text"]
//! ```

use crate::cleaner::CleanerRules;
use crate::cli::Cli;
use crate::filter::FilterRules;
use crate::sources::{SourceConfig, default_sources, validate_sources};
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

/// Everything a crawl run needs besides the HTTP client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub sources: Vec<SourceConfig>,
    pub filter: FilterRules,
    pub cleaner: CleanerRules,
    pub limits: Limits,
    pub http: HttpSettings,
    pub delays: Delays,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            filter: FilterRules::default(),
            cleaner: CleanerRules::default(),
            limits: Limits::default(),
            http: HttpSettings::default(),
            delays: Delays::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Articles kept per source.
    pub max_per_source: usize,
    /// Cleaned text shorter than this (in characters) is rejected.
    pub min_text_chars: usize,
    /// Characters of full text copied into the preview.
    pub preview_chars: usize,
    /// Days before today still inside the recency window.
    pub recency_days: i64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_per_source: 3,
            min_text_chars: 200,
            preview_chars: 200,
            recency_days: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub feed_timeout_secs: u64,
    pub article_timeout_secs: u64,
    pub user_agent: String,
    pub accept_language: String,
    pub referer: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            feed_timeout_secs: 15,
            article_timeout_secs: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
            accept_language: "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
            referer: "https://www.google.com/".to_string(),
        }
    }
}

impl HttpSettings {
    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }

    pub fn article_timeout(&self) -> Duration {
        Duration::from_secs(self.article_timeout_secs)
    }
}

/// Pauses between requests, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Delays {
    /// After each accepted article.
    pub article_ms: u64,
    /// After each source.
    pub source_ms: u64,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            article_ms: 1000,
            source_ms: 2000,
        }
    }
}

impl Delays {
    pub fn article(&self) -> Duration {
        Duration::from_millis(self.article_ms)
    }

    pub fn source(&self) -> Duration {
        Duration::from_millis(self.source_ms)
    }
}

impl CrawlConfig {
    /// Parse a YAML document; missing keys keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, Box<dyn Error>> {
        let config: CrawlConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML config file.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let yaml = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml(&yaml)?;
        info!(sources = config.sources.len(), "Loaded configuration");
        Ok(config)
    }

    /// Defaults, then the optional config file, then CLI flags.
    pub fn resolve(cli: &Cli) -> Result<Self, Box<dyn Error>> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(n) = cli.max_per_source {
            self.limits.max_per_source = n;
        }
        if let Some(days) = cli.recency_days {
            self.limits.recency_days = days;
        }
        if let Some(ms) = cli.article_delay_ms {
            self.delays.article_ms = ms;
        }
        if let Some(ms) = cli.source_delay_ms {
            self.delays.source_ms = ms;
        }
    }

    fn validate(&self) -> Result<(), Box<dyn Error>> {
        validate_sources(&self.sources)?;
        if self.limits.recency_days < 0 {
            return Err("recency_days must not be negative".into());
        }
        Ok(())
    }
}
