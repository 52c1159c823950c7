//! Google News search through SerpApi.
//!
//! # Architecture
//!
//! - [`NewsSearch`]: the seam the pipeline depends on
//! - [`SerpApiClient`]: the reqwest-backed implementation
//!
//! One GET per tracked symbol per run. There is no retry and no timeout
//! beyond what the transport applies by default.

use crate::config::Config;
use crate::error::SyncError;
use crate::models::SearchResponse;
use crate::utils::truncate_for_log;
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Source of search results for a symbol.
pub trait NewsSearch {
    /// Run one search for `symbol` and return the decoded response.
    async fn search(&self, symbol: &str) -> Result<SearchResponse, SyncError>;
}

/// SerpApi client for the `google_news` engine.
pub struct SerpApiClient {
    http: Client,
    endpoint: Url,
    api_key: String,
}

impl std::fmt::Debug for SerpApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerpApiClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl SerpApiClient {
    pub fn new(endpoint: &str, api_key: impl Into<String>) -> Result<Self, SyncError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| SyncError::Config(format!("invalid endpoint {endpoint}: {e}")))?;
        Ok(Self {
            http: Client::new(),
            endpoint,
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, SyncError> {
        Self::new(&config.endpoint, config.api_key.clone())
    }

    fn request_url(&self, symbol: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("engine", "google_news")
            .append_pair("q", symbol)
            .append_pair("api_key", &self.api_key);
        url
    }
}

impl NewsSearch for SerpApiClient {
    #[instrument(level = "info", skip(self))]
    async fn search(&self, symbol: &str) -> Result<SearchResponse, SyncError> {
        let t0 = Instant::now();
        // The request URL carries the API key; drop it from transport errors.
        let resp = self
            .http
            .get(self.request_url(symbol))
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.without_url()))?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                body = %truncate_for_log(&body, 300),
                "Search request rejected"
            );
            return Err(SyncError::Status {
                status: status.as_u16(),
                url: self.endpoint.to_string(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| SyncError::Transport(e.without_url()))?;
        debug!(bytes = body.len(), elapsed_ms = t0.elapsed().as_millis() as u64, "Search response received");

        let parsed: SearchResponse = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, body = %truncate_for_log(&body, 300), "Search response is not valid JSON");
            SyncError::Decode(e)
        })?;

        if let Some(message) = parsed.error {
            return Err(SyncError::Api(message));
        }

        info!(results = parsed.news_results.len(), "Search succeeded");
        Ok(parsed)
    }
}
