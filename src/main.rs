//! # Crypto News Sync
//!
//! A scheduled job that pulls cryptocurrency headlines from Google News (via
//! SerpApi), merges them into one CSV history per tracked asset, and pushes
//! the updated files to a git remote.
//!
//! ## Usage
//!
//! ```sh
//! SERPAPI_KEY=... crypto_news_sync
//! ```
//!
//! ## Architecture
//!
//! One linear pipeline, run once per invocation:
//! 1. **Fetch**: one search request per tracked symbol
//! 2. **Flatten**: turn results and their sub-stories into rows, dropping rows without a link
//! 3. **Merge**: put new rows in front of the stored history and drop repeated links
//! 4. **Write**: rewrite the feed's CSV file when its content changed
//! 5. **Publish**: commit every rewritten file in one commit and push it
//!
//! A failing feed is logged and skipped; only a missing API key stops the run.

use clap::Parser;
use dotenv::dotenv;
use std::error::Error;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod history;
mod models;
mod normalize;
mod outputs;
mod pipeline;
mod publish;
mod utils;

use api::SerpApiClient;
use cli::Cli;
use config::Config;
use publish::{GitPublisher, PublishOutcome};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news sync starting up");

    if dotenv().is_ok() {
        info!("Loaded .env");
    }
    let args = Cli::parse();

    let config = match Config::from_cli(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(kind = %e.kind(), error = %e, "Cannot start sync");
            return Err(e.into());
        }
    };

    let search = SerpApiClient::from_config(&config)?;
    let publisher = GitPublisher::from_config(&config);

    let report = pipeline::run(&config, &search, &publisher).await;

    match &report.publish {
        PublishOutcome::Skipped => info!("No files updated"),
        PublishOutcome::Disabled => info!(files = report.updated.len(), "Files written; publishing disabled"),
        PublishOutcome::Published { files } => info!(files = files.len(), "Update published"),
        PublishOutcome::Failed(e) => {
            error!(kind = %e.kind(), error = %e, "Update written locally but not published")
        }
    }
    for (symbol, e) in &report.failures {
        warn!(%symbol, kind = %e.kind(), error = %e, "Feed skipped this run");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        updated = report.updated.len(),
        failed = report.failures.len(),
        "Execution complete"
    );

    Ok(())
}
