//! Data models for scraped headlines and their sentiment.
//!
//! This module defines the data structures that flow through the pipeline:
//! - [`RawHeadline`]: What the extractor pulls out of one item on the page
//! - [`HeadlineRecord`]: A raw headline stamped with its capture time
//! - [`Sentiment`]: The classifier's verdict for a single headline
//!
//! Optional fields use `Option<String>` to separate "this source has no such
//! field" (`None`) from "the source has the field but this item left it
//! blank" (`Some("")`). The exporter and the console preview rely on that
//! distinction to decide which columns exist.

use serde::{Deserialize, Serialize};

/// A headline as extracted from one item node, before it is collected.
///
/// The `headline` is always non-empty and trimmed; the extractor drops items
/// that would produce anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHeadline {
    /// The trimmed headline text.
    pub headline: String,
    /// The article link, when the source schema defines one.
    pub url: Option<String>,
    /// The site-reported publication time, when the source schema defines one.
    pub timestamp: Option<String>,
}

/// A collected headline, immutable once created.
///
/// Field order matches the exported column order:
/// `headline, fetched_at[, url, timestamp]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadlineRecord {
    /// The headline text (never empty).
    pub headline: String,
    /// ISO-8601 capture time set by the collector.
    pub fetched_at: String,
    /// The article link; empty string if the item had no link node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Free-form publication time as shown on the site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// The verdict returned by a sentiment classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// Categorical label, e.g. `positive`, `negative` or `neutral`.
    pub label: String,
    /// Confidence in `[0, 1]`.
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_omits_absent_fields() {
        let record = HeadlineRecord {
            headline: "Stocks rally".to_string(),
            fetched_at: "2025-05-06T14:30:00+00:00".to_string(),
            url: None,
            timestamp: None,
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("Stocks rally"));
        assert!(!json.contains("url"));
        assert!(!json.contains("timestamp"));
    }

    #[test]
    fn test_record_json_keeps_blank_fields() {
        let record = HeadlineRecord {
            headline: "Fed holds rates".to_string(),
            fetched_at: "2025-05-06T14:30:00+00:00".to_string(),
            url: Some(String::new()),
            timestamp: Some("Oct-17".to_string()),
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: HeadlineRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_sentiment_deserializes_classifier_shape() {
        let json = r#"{"label": "positive", "score": 0.93}"#;
        let sentiment: Sentiment = serde_json::from_str(json).unwrap();
        assert_eq!(sentiment.label, "positive");
        assert!((sentiment.score - 0.93).abs() < f64::EPSILON);
    }
}
