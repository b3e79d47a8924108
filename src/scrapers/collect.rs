//! Turns extracted headlines into timestamped records.

use crate::models::{HeadlineRecord, RawHeadline};
use chrono::{DateTime, FixedOffset, Local, SecondsFormat};

/// Stamp each headline with the current local time, keeping extraction order.
pub fn collect(raw: Vec<RawHeadline>) -> Vec<HeadlineRecord> {
    collect_with(raw, || Local::now().fixed_offset())
}

/// [`collect`] with an explicit clock, called once per record.
pub fn collect_with<F>(raw: Vec<RawHeadline>, mut clock: F) -> Vec<HeadlineRecord>
where
    F: FnMut() -> DateTime<FixedOffset>,
{
    raw.into_iter()
        .map(|item| HeadlineRecord {
            headline: item.headline,
            fetched_at: clock().to_rfc3339_opts(SecondsFormat::Micros, false),
            url: item.url,
            timestamp: item.timestamp,
        })
        .collect()
}
