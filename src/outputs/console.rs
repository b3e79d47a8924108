//! Human-readable run log.
//!
//! This is the program's user-facing output, separate from `tracing`
//! diagnostics. All functions write to any [`Write`] so tests can capture it.

use crate::models::{HeadlineRecord, Sentiment};
use crate::utils::headline_preview;
use std::io::{self, Write};

pub const PREVIEW_COUNT: usize = 5;
pub const HEADLINE_PREVIEW_CHARS: usize = 60;

pub fn fetching<W: Write>(out: &mut W, source: &str) -> io::Result<()> {
    writeln!(out, "Fetching {source} news headlines with metadata...")
}

pub fn rule<W: Write>(out: &mut W, ch: char, width: usize) -> io::Result<()> {
    writeln!(out, "{}", ch.to_string().repeat(width))
}

/// Total count followed by the first [`PREVIEW_COUNT`] records.
///
/// `Timestamp:` lines appear only when the source has a timestamp field;
/// `URL:` shows `N/A` for sources without links.
pub fn preview<W: Write>(
    out: &mut W,
    source: &str,
    records: &[HeadlineRecord],
    show_timestamp: bool,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "[{source}] Total headlines: {}", records.len())?;
    if records.is_empty() {
        return Ok(());
    }
    writeln!(out, "First {PREVIEW_COUNT} headlines...")?;
    for record in records.iter().take(PREVIEW_COUNT) {
        writeln!(out, "Headline: {}", record.headline)?;
        if show_timestamp {
            writeln!(out, "Timestamp: {}", record.timestamp.as_deref().unwrap_or("N/A"))?;
        }
        writeln!(out, "URL: {}", record.url.as_deref().unwrap_or("N/A"))?;
        rule(out, '-', 40)?;
    }
    Ok(())
}

pub fn saved<W: Write>(out: &mut W, count: usize, path: &std::path::Path) -> io::Result<()> {
    writeln!(out, "Saved {count} headlines to {}", path.display())
}

pub fn sentiment_header<W: Write>(out: &mut W, model: &str) -> io::Result<()> {
    writeln!(out)?;
    rule(out, '=', 80)?;
    writeln!(out, "Running sentiment analysis with {model}...")
}

pub fn sentiment<W: Write>(out: &mut W, headline: &str, sentiment: &Sentiment) -> io::Result<()> {
    writeln!(out, "Headline: {}...", headline_preview(headline, HEADLINE_PREVIEW_CHARS))?;
    writeln!(out, "Sentiment: {} ({:.3})", sentiment.label, sentiment.score)?;
    rule(out, '-', 60)
}
