//! The sync run: fetch, flatten, merge and write each feed, then publish.
//!
//! Feeds are processed one after another. A failing feed is recorded in the
//! [`RunReport`] and never stops the others.

use crate::api::NewsSearch;
use crate::config::{AssetFeed, Config};
use crate::error::SyncError;
use crate::history::{load_history, merge_history};
use crate::normalize::flatten;
use crate::outputs::csv::write_history;
use crate::publish::{Publish, PublishOutcome, publish_updates};
use std::path::PathBuf;
use tracing::{error, info, instrument};

/// What happened to one feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    /// The history file was rewritten.
    Written {
        path: PathBuf,
        /// Candidates extracted from this run's response.
        fetched: usize,
        /// Rows in the merged history.
        total: usize,
    },
    /// The merged history equals the stored one; nothing was written.
    Unchanged { fetched: usize },
}

/// Summary of a whole run.
#[derive(Debug)]
pub struct RunReport {
    /// Destinations rewritten this run, in feed order.
    pub updated: Vec<PathBuf>,
    /// Feeds that failed, with the reason.
    pub failures: Vec<(String, SyncError)>,
    pub publish: PublishOutcome,
}

/// Fetch, merge and persist one feed.
#[instrument(level = "info", skip(config, search, feed), fields(symbol = %feed.symbol))]
pub async fn sync_feed<S: NewsSearch>(
    config: &Config,
    search: &S,
    feed: &AssetFeed,
) -> Result<FeedOutcome, SyncError> {
    let response = search.search(&feed.symbol).await?;
    let candidates = flatten(response);
    let fetched = candidates.len();

    let path = config.destination(feed);
    let prior = load_history(&path).await?;
    let merged = merge_history(candidates, prior.as_deref());

    if merged.as_slice() == prior.as_deref().unwrap_or_default() {
        info!(fetched, "No new items");
        return Ok(FeedOutcome::Unchanged { fetched });
    }

    write_history(&path, &merged).await?;
    Ok(FeedOutcome::Written {
        path,
        fetched,
        total: merged.len(),
    })
}

/// Run every configured feed, then publish whatever changed in one commit.
#[instrument(level = "info", skip_all, fields(feeds = config.feeds.len()))]
pub async fn run<S: NewsSearch, P: Publish>(config: &Config, search: &S, publisher: &P) -> RunReport {
    let mut updated = Vec::new();
    let mut failures = Vec::new();

    for feed in &config.feeds {
        match sync_feed(config, search, feed).await {
            Ok(FeedOutcome::Written { path, fetched, total }) => {
                info!(symbol = %feed.symbol, path = %path.display(), fetched, total, "Feed updated");
                updated.push(path);
            }
            Ok(FeedOutcome::Unchanged { fetched }) => {
                info!(symbol = %feed.symbol, fetched, "Feed unchanged");
            }
            Err(e) => {
                error!(symbol = %feed.symbol, kind = %e.kind(), error = %e, "Feed failed; continuing");
                failures.push((feed.symbol.clone(), e));
            }
        }
    }

    let publish = if !config.publish {
        info!(files = updated.len(), "Publishing disabled");
        PublishOutcome::Disabled
    } else {
        publish_updates(publisher, &config.repo_path, &updated, &config.label).await
    };

    RunReport {
        updated,
        failures,
        publish,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewsItem, SearchResponse};
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;

    /// Serves canned JSON per symbol; symbols without an entry fail.
    struct FakeSearch {
        bodies: HashMap<String, String>,
    }

    impl FakeSearch {
        fn new(bodies: &[(&str, &str)]) -> Self {
            Self {
                bodies: bodies
                    .iter()
                    .map(|(s, b)| (s.to_string(), b.to_string()))
                    .collect(),
            }
        }
    }

    impl NewsSearch for FakeSearch {
        async fn search(&self, symbol: &str) -> Result<SearchResponse, SyncError> {
            match self.bodies.get(symbol) {
                Some(body) => Ok(serde_json::from_str(body)?),
                None => Err(SyncError::Status {
                    status: 502,
                    url: "http://localhost/search.json".to_string(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct FakePublisher {
        calls: Mutex<Vec<Vec<PathBuf>>>,
    }

    impl Publish for FakePublisher {
        async fn publish(&self, files: &[PathBuf], _message: &str) -> Result<(), SyncError> {
            self.calls.lock().unwrap().push(files.to_vec());
            Ok(())
        }
    }

    fn config(repo: &Path, symbols: &[&str]) -> Config {
        Config {
            api_key: "test".to_string(),
            endpoint: "http://localhost/search.json".to_string(),
            repo_path: repo.to_path_buf(),
            label: "Crypto".to_string(),
            feeds: symbols.iter().map(|s| AssetFeed::with_default_path(s)).collect(),
            remote: "origin".to_string(),
            branch: "main".to_string(),
            publish: true,
        }
    }

    fn item(link: &str, title: &str) -> NewsItem {
        NewsItem {
            date: None,
            sources: Some("Pub".to_string()),
            title: Some(title.to_string()),
            link: link.to_string(),
        }
    }

    const TWO_SUB_STORIES: &str = r#"{"news_results": [
        {"title": "cluster", "stories": [
            {"title": "one", "link": "L1", "source": {"name": "Pub"}},
            {"title": "two", "link": "L2", "source": "Pub"}
        ]}
    ]}"#;

    #[tokio::test]
    async fn test_new_feed_written_and_published() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), &["bitcoin"]);
        let search = FakeSearch::new(&[("bitcoin", TWO_SUB_STORIES)]);
        let publisher = FakePublisher::default();

        let report = run(&config, &search, &publisher).await;

        let path = dir.path().join("news/bitcoin_news.csv");
        assert_eq!(report.updated, vec![path.clone()]);
        assert!(report.failures.is_empty());
        assert!(matches!(report.publish, PublishOutcome::Published { .. }));

        let history = load_history(&path).await.unwrap().unwrap();
        assert_eq!(history, vec![item("L1", "one"), item("L2", "two")]);
        assert_eq!(publisher.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fresh_title_replaces_stored_row() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), &["bitcoin"]);
        let path = dir.path().join("news/bitcoin_news.csv");
        write_history(&path, &[item("L1", "old")]).await.unwrap();

        let search = FakeSearch::new(&[(
            "bitcoin",
            r#"{"news_results": [{"title": "new", "link": "L1", "source": "Pub"}]}"#,
        )]);
        let outcome = sync_feed(&config, &search, &config.feeds[0]).await.unwrap();

        assert!(matches!(outcome, FeedOutcome::Written { total: 1, fetched: 1, .. }));
        let history = load_history(&path).await.unwrap().unwrap();
        assert_eq!(history, vec![item("L1", "new")]);
    }

    #[tokio::test]
    async fn test_failing_feed_does_not_stop_others() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), &["solana", "bitcoin"]);
        let search = FakeSearch::new(&[("bitcoin", TWO_SUB_STORIES)]);
        let publisher = FakePublisher::default();

        let report = run(&config, &search, &publisher).await;

        assert_eq!(report.updated, vec![dir.path().join("news/bitcoin_news.csv")]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "solana");
        assert!(!dir.path().join("news/solana_news.csv").exists());

        let calls = publisher.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains(&PathBuf::from("news/bitcoin_news.csv")));
        assert!(!calls[0].contains(&PathBuf::from("news/solana_news.csv")));
    }

    #[tokio::test]
    async fn test_nothing_new_skips_publish() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), &["bitcoin", "ethereum"]);
        write_history(&dir.path().join("news/ethereum_news.csv"), &[item("E1", "eth")])
            .await
            .unwrap();
        let search = FakeSearch::new(&[
            ("bitcoin", r#"{"news_results": []}"#),
            ("ethereum", r#"{"news_results": [{"title": "no link"}]}"#),
        ]);
        let publisher = FakePublisher::default();

        let report = run(&config, &search, &publisher).await;

        assert!(report.updated.is_empty());
        assert!(report.failures.is_empty());
        assert!(matches!(report.publish, PublishOutcome::Skipped));
        assert!(publisher.calls.lock().unwrap().is_empty());
        assert!(!dir.path().join("news/bitcoin_news.csv").exists());
        assert!(!dir.path().join(".gitignore").exists());
    }

    #[tokio::test]
    async fn test_already_known_items_leave_file_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), &["bitcoin"]);
        let search = FakeSearch::new(&[("bitcoin", TWO_SUB_STORIES)]);

        let first = sync_feed(&config, &search, &config.feeds[0]).await.unwrap();
        assert!(matches!(first, FeedOutcome::Written { total: 2, .. }));

        let second = sync_feed(&config, &search, &config.feeds[0]).await.unwrap();
        assert_eq!(second, FeedOutcome::Unchanged { fetched: 2 });
    }

    #[tokio::test]
    async fn test_blank_fields_do_not_rewrite_history() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), &["bitcoin"]);
        let search = FakeSearch::new(&[(
            "bitcoin",
            r#"{"news_results": [{"title": "t", "link": "L1", "source": "Pub", "date": ""}]}"#,
        )]);
        let publisher = FakePublisher::default();

        let first = run(&config, &search, &publisher).await;
        assert_eq!(first.updated.len(), 1);

        let second = sync_feed(&config, &search, &config.feeds[0]).await.unwrap();
        assert_eq!(second, FeedOutcome::Unchanged { fetched: 1 });

        let third = run(&config, &search, &publisher).await;
        assert!(third.updated.is_empty());
        assert!(matches!(third.publish, PublishOutcome::Skipped));
        assert_eq!(publisher.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_write_failure_excludes_feed() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), &["bitcoin", "ethereum"]);
        // A regular file where the bitcoin feed expects a directory.
        std::fs::write(dir.path().join("blocked"), "").unwrap();
        config.feeds[0].path = PathBuf::from("blocked/bitcoin_news.csv");
        let search = FakeSearch::new(&[("bitcoin", TWO_SUB_STORIES), ("ethereum", TWO_SUB_STORIES)]);
        let publisher = FakePublisher::default();

        let report = run(&config, &search, &publisher).await;

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "bitcoin");
        assert_eq!(report.updated, vec![dir.path().join("news/ethereum_news.csv")]);
    }

    #[tokio::test]
    async fn test_publish_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), &["bitcoin"]);
        config.publish = false;
        let search = FakeSearch::new(&[("bitcoin", TWO_SUB_STORIES)]);
        let publisher = FakePublisher::default();

        let report = run(&config, &search, &publisher).await;

        assert_eq!(report.updated.len(), 1);
        assert!(matches!(report.publish, PublishOutcome::Disabled));
        assert!(publisher.calls.lock().unwrap().is_empty());
    }
}
