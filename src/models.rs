//! Data models for news records and the search API's wire format.
//!
//! - [`NewsItem`]: one persisted row of a feed history
//! - [`SearchResponse`], [`RawStory`], [`Source`]: the Google News search
//!   response as returned by the API, resolved into [`NewsItem`]s by
//!   [`crate::normalize::flatten`]

use serde::{Deserialize, Serialize};

/// One news record, as stored in a feed's CSV history.
///
/// Field order is the CSV column order: `date, sources, title, link`.
/// `link` is the identity key; two items with the same link are the same story.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewsItem {
    /// Display date as given by the API. Never parsed.
    pub date: Option<String>,
    /// Publisher name.
    pub sources: Option<String>,
    /// Headline.
    pub title: Option<String>,
    /// Canonical article URL.
    pub link: String,
}

/// Top-level body of a Google News search response.
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    /// Result entries. Absent when the search found nothing.
    #[serde(default)]
    pub news_results: Vec<RawStory>,
    /// Set by the service when the request was rejected (bad key, quota...).
    #[serde(default)]
    pub error: Option<String>,
}

/// A result entry or one of its sub-stories.
#[derive(Debug, Default, Deserialize)]
pub struct RawStory {
    pub date: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub source: Option<Source>,
    /// Clustered coverage of the same event. When present, the entry itself
    /// is only a container.
    pub stories: Option<Vec<RawStory>>,
}

/// The `source` field, which the API sends either as a bare publisher name
/// or as a publisher object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Source {
    PlainName(String),
    Structured { name: Option<String> },
    Other(serde_json::Value),
}

impl Source {
    /// Resolve to the publisher name stored in the `sources` column.
    pub fn into_name(self) -> Option<String> {
        match self {
            Source::PlainName(name) => Some(name),
            Source::Structured { name } => name,
            Source::Other(serde_json::Value::Null) => None,
            Source::Other(value) => Some(value.to_string()),
        }
    }
}
