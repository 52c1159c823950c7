//! Command-line interface definitions for the news sync job.
//!
//! Every option has a default or an environment variable, so the job runs
//! with no arguments at all. Flags only override the defaults.

use clap::Parser;

/// Command-line arguments for the news sync job.
///
/// # Examples
///
/// ```sh
/// # Credential from .env or the environment, default feeds
/// crypto_news_sync
///
/// # Custom feed list, write files but do not push
/// crypto_news_sync --feeds feeds.yaml --no-publish
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// SerpApi key used for the Google News search
    #[arg(long, env = "SERPAPI_KEY", hide_env_values = true)]
    pub serpapi_key: Option<String>,

    /// Root of the git working tree that holds the news files
    #[arg(long, env = "NEWS_REPO_PATH", default_value = ".")]
    pub repo_path: String,

    /// Optional YAML file listing the tracked feeds
    #[arg(long, env = "NEWS_FEEDS_FILE")]
    pub feeds: Option<String>,

    /// Search endpoint
    #[arg(long, env = "SERPAPI_ENDPOINT", default_value = crate::config::DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Git remote to push to
    #[arg(long, default_value = "origin")]
    pub remote: String,

    /// Branch to push
    #[arg(long, default_value = "main")]
    pub branch: String,

    /// Write the news files but skip commit and push
    #[arg(long)]
    pub no_publish: bool,
}
