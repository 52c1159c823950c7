//! Run configuration.
//!
//! A [`Config`] is built once from the parsed [`Cli`] at process start and
//! passed by reference to everything that needs it.

use crate::cli::Cli;
use crate::error::SyncError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub const DEFAULT_ENDPOINT: &str = "https://serpapi.com/search.json";
pub const DEFAULT_LABEL: &str = "Crypto";
pub const DEFAULT_SYMBOLS: [&str; 3] = ["bitcoin", "ethereum", "solana"];

/// One tracked symbol and the file its history lives in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetFeed {
    /// Search query, e.g. `bitcoin`.
    pub symbol: String,
    /// Destination, relative to the repository root.
    pub path: PathBuf,
}

impl AssetFeed {
    /// Feed stored at the default `news/<symbol>_news.csv` location.
    pub fn with_default_path(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            path: PathBuf::from("news").join(format!("{symbol}_news.csv")),
        }
    }
}

/// Contents of a `--feeds` YAML file.
///
/// ```yaml
/// label: Crypto
/// feeds:
///   - symbol: bitcoin
///     path: news/bitcoin_news.csv
/// ```
#[derive(Debug, Deserialize)]
pub struct FeedsFile {
    #[serde(default = "default_label")]
    pub label: String,
    pub feeds: Vec<AssetFeed>,
}

fn default_label() -> String {
    DEFAULT_LABEL.to_string()
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub endpoint: String,
    pub repo_path: PathBuf,
    /// Used in the commit message: `Auto-update: <label> news ...`.
    pub label: String,
    pub feeds: Vec<AssetFeed>,
    pub remote: String,
    pub branch: String,
    pub publish: bool,
}

impl Config {
    /// Build the run configuration.
    ///
    /// # Errors
    ///
    /// [`SyncError::Config`] if the API key is missing or blank, or if the feed
    /// file cannot be read, does not parse, is empty or repeats a symbol.
    #[instrument(level = "info", skip_all)]
    pub fn from_cli(cli: &Cli) -> Result<Self, SyncError> {
        let api_key = cli
            .serpapi_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| SyncError::Config("SERPAPI_KEY not found in environment or .env".into()))?
            .to_string();

        let feeds_file = match &cli.feeds {
            Some(path) => load_feeds_file(Path::new(path))?,
            None => FeedsFile {
                label: default_label(),
                feeds: DEFAULT_SYMBOLS
                    .iter()
                    .map(|s| AssetFeed::with_default_path(s))
                    .collect(),
            },
        };
        validate_feeds(&feeds_file.feeds)?;

        info!(
            feeds = feeds_file.feeds.len(),
            label = %feeds_file.label,
            repo = %cli.repo_path,
            "Loaded configuration"
        );

        Ok(Self {
            api_key,
            endpoint: cli.endpoint.clone(),
            repo_path: PathBuf::from(&cli.repo_path),
            label: feeds_file.label,
            feeds: feeds_file.feeds,
            remote: cli.remote.clone(),
            branch: cli.branch.clone(),
            publish: !cli.no_publish,
        })
    }

    /// Absolute (or repo-relative) location of a feed's history file.
    pub fn destination(&self, feed: &AssetFeed) -> PathBuf {
        self.repo_path.join(&feed.path)
    }
}

fn load_feeds_file(path: &Path) -> Result<FeedsFile, SyncError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        SyncError::Config(format!("cannot read feeds file {}: {e}", path.display()))
    })?;
    parse_feeds(&text)
        .map_err(|e| SyncError::Config(format!("invalid feeds file {}: {e}", path.display())))
}

fn parse_feeds(text: &str) -> Result<FeedsFile, serde_yaml::Error> {
    serde_yaml::from_str(text)
}

fn validate_feeds(feeds: &[AssetFeed]) -> Result<(), SyncError> {
    if feeds.is_empty() {
        return Err(SyncError::Config("no feeds configured".into()));
    }
    let mut seen = HashSet::new();
    for feed in feeds {
        if feed.symbol.trim().is_empty() {
            return Err(SyncError::Config("feed with empty symbol".into()));
        }
        if !seen.insert(feed.symbol.as_str()) {
            return Err(SyncError::Config(format!("duplicate feed symbol {}", feed.symbol)));
        }
    }
    Ok(())
}
