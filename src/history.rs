//! Feed history loading and merging.
//!
//! A history is the full list of rows persisted for one feed. Each run loads
//! it whole, merges the new candidates in front of it and writes it back
//! whole. Ordering is fetch order, not a date sort.

use crate::error::SyncError;
use crate::models::NewsItem;
use itertools::Itertools;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};

/// Merge new candidates in front of a prior history and drop repeated links.
///
/// The first occurrence of a link wins, so a fresh row replaces the stored row
/// with the same link and, among candidates, the earliest listed one is kept.
/// Without a prior history the candidates come back in their given order.
pub fn merge_history(candidates: Vec<NewsItem>, prior: Option<&[NewsItem]>) -> Vec<NewsItem> {
    candidates
        .into_iter()
        .chain(prior.unwrap_or_default().iter().cloned())
        .unique_by(|item| item.link.clone())
        .collect()
}

/// Load a feed's CSV history. Returns `None` when the file does not exist yet.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn load_history(path: &Path) -> Result<Option<Vec<NewsItem>>, SyncError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No history yet");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    let items = reader
        .deserialize::<NewsItem>()
        .collect::<Result<Vec<_>, _>>()?;
    debug!(rows = items.len(), "Loaded history");
    Ok(Some(items))
}
