//! CSV export of collected headlines.
//!
//! The header row is `headline,fetched_at` followed by `url` and/or
//! `timestamp` when the records carry those fields. Every record becomes one
//! row in collection order.

use crate::error::{Error, Result};
use crate::models::HeadlineRecord;
use std::path::Path;
use tracing::{info, instrument, warn};

/// Column names for `records`, in export order.
pub fn columns(records: &[HeadlineRecord]) -> Vec<&'static str> {
    let mut columns = vec!["headline", "fetched_at"];
    if records.iter().any(|r| r.url.is_some()) {
        columns.push("url");
    }
    if records.iter().any(|r| r.timestamp.is_some()) {
        columns.push("timestamp");
    }
    columns
}

/// Write `records` to `path`, creating parent directories as needed.
///
/// Returns the number of rows written. An empty slice writes nothing and
/// returns `Ok(0)`.
///
/// # Errors
///
/// [`Error::Export`] when the directory or file cannot be created or written.
#[instrument(level = "info", skip(records), fields(path = %path.display(), count = records.len()))]
pub fn export(records: &[HeadlineRecord], path: &Path) -> Result<usize> {
    if records.is_empty() {
        warn!("No headlines to export; not creating file");
        return Ok(0);
    }

    let export_err = |source: ::csv::Error| Error::Export {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| export_err(e.into()))?;
    }

    let columns = columns(records);
    let with_url = columns.contains(&"url");
    let with_timestamp = columns.contains(&"timestamp");

    let mut writer = ::csv::Writer::from_path(path).map_err(export_err)?;
    writer.write_record(&columns).map_err(export_err)?;
    for record in records {
        let mut row = vec![record.headline.as_str(), record.fetched_at.as_str()];
        if with_url {
            row.push(record.url.as_deref().unwrap_or_default());
        }
        if with_timestamp {
            row.push(record.timestamp.as_deref().unwrap_or_default());
        }
        writer.write_record(&row).map_err(export_err)?;
    }
    writer.flush().map_err(|e| export_err(e.into()))?;

    info!(rows = records.len(), "Wrote CSV export");
    Ok(records.len())
}
