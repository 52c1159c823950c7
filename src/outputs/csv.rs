//! CSV persistence for feed histories.
//!
//! A history file is always rewritten in full: header row, then one row per
//! item in history order, UTF-8.

use crate::error::SyncError;
use crate::models::NewsItem;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Column names, in the order [`NewsItem`] serializes its fields.
pub const HEADER: [&str; 4] = ["date", "sources", "title", "link"];

/// Serialize a history to CSV bytes. The header is present even with no rows.
pub fn to_csv(items: &[NewsItem]) -> Result<Vec<u8>, SyncError> {
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for item in items {
        writer.serialize(item)?;
    }
    writer
        .into_inner()
        .map_err(|e| SyncError::Io(std::io::Error::new(e.error().kind(), e.error().to_string())))
}

/// Overwrite `path` with the given history, creating parent directories first.
#[instrument(level = "info", skip_all, fields(path = %path.display(), rows = items.len()))]
pub async fn write_history(path: &Path, items: &[NewsItem]) -> Result<(), SyncError> {
    let bytes = to_csv(items)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create history dir");
            return Err(e.into());
        }
    }

    fs::write(path, bytes).await?;
    info!("Wrote history CSV");
    Ok(())
}
