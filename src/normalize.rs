//! Flatten a search response into candidate [`NewsItem`]s.

use crate::models::{NewsItem, RawStory, SearchResponse};
use tracing::debug;

/// Turn a search response into candidate rows, in response order.
///
/// An entry with a `stories` list contributes one candidate per sub-story
/// instead of itself. Candidates without a non-empty `link` are dropped.
/// An empty result is a valid "nothing new" outcome.
pub fn flatten(response: SearchResponse) -> Vec<NewsItem> {
    let entries = response.news_results.len();
    let items: Vec<NewsItem> = response
        .news_results
        .into_iter()
        .flat_map(|mut entry| match entry.stories.take() {
            Some(stories) => stories,
            None => vec![entry],
        })
        .filter_map(to_item)
        .collect();

    debug!(entries, candidates = items.len(), "Flattened search response");
    items
}

fn to_item(story: RawStory) -> Option<NewsItem> {
    let link = non_empty(story.link)?;
    Some(NewsItem {
        date: non_empty(story.date),
        sources: non_empty(story.source.and_then(|s| s.into_name())),
        title: non_empty(story.title),
        link,
    })
}

/// Empty strings are stored as blank CSV cells, which read back as `None`.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
