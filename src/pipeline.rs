//! One source, end to end: fetch → extract → collect → preview/export → annotate.
//!
//! A [`Pipeline`] is built from an explicit [`PipelineConfig`]; nothing is
//! read from globals, so several sources (or tests) can run in one process.
//! [`Pipeline::run`] never fails: every error is reduced to a `tracing`
//! diagnostic and the run continues with whatever it has.

use crate::api::Classify;
use crate::error::Error;
use crate::models::HeadlineRecord;
use crate::outputs::{console, csv};
use crate::scrapers::collect::collect;
use crate::scrapers::extract::{CompiledSchema, extract};
use crate::scrapers::fetch::fetch_page;
use crate::scrapers::SiteSchema;
use reqwest::Client;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{error, info, instrument, warn};

pub const DEFAULT_SENTIMENT_CAP: usize = 20;

/// Everything one source run needs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub schema: SiteSchema,
    /// Extraction cap; `0` keeps every headline on the page.
    pub max_headlines: usize,
    /// Number of headlines sent to the classifier.
    pub sentiment_cap: usize,
    /// Export into `<dir>/<schema.export_file>` when set.
    pub export_dir: Option<PathBuf>,
    /// Upper bound for classifying one headline, retries included.
    pub headline_timeout: Duration,
    /// Model name shown in the run log.
    pub model: String,
}

impl PipelineConfig {
    pub fn new(schema: SiteSchema) -> Self {
        Self {
            schema,
            max_headlines: 0,
            sentiment_cap: DEFAULT_SENTIMENT_CAP,
            export_dir: None,
            headline_timeout: Duration::from_secs(30),
            model: crate::api::DEFAULT_MODEL.to_string(),
        }
    }

    pub fn export_path(&self) -> Option<PathBuf> {
        self.export_dir
            .as_ref()
            .map(|dir| dir.join(&self.schema.export_file))
    }
}

/// Outcome of annotating a batch of headlines.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationSummary {
    pub classified: usize,
    pub failed: usize,
}

/// What a run produced.
#[derive(Debug, Default)]
pub struct RunReport {
    pub records: Vec<HeadlineRecord>,
    pub exported: Option<PathBuf>,
    pub annotation: Option<AnnotationSummary>,
}

#[derive(Debug)]
pub struct Pipeline<'a, C> {
    config: PipelineConfig,
    client: &'a Client,
    classifier: Option<&'a C>,
}

impl<'a, C> Pipeline<'a, C>
where
    C: Classify,
{
    /// `classifier: None` skips the sentiment stage.
    pub fn new(config: PipelineConfig, client: &'a Client, classifier: Option<&'a C>) -> Self {
        Self {
            config,
            client,
            classifier,
        }
    }

    /// Run the source once, writing the run log to `out`.
    #[instrument(level = "info", skip_all, fields(source = %self.config.schema.name))]
    pub async fn run<W: Write>(&self, out: &mut W) -> RunReport {
        let start = Instant::now();
        emit(console::fetching(out, &self.config.schema.name));
        let records = self.headlines().await;

        emit(console::preview(
            out,
            &self.config.schema.name,
            &records,
            self.config.schema.has_timestamp(),
        ));

        let exported = self.export(&records, out);

        let annotation = match self.classifier {
            Some(classifier) => {
                emit(console::sentiment_header(out, &self.config.model));
                let texts = headline_texts(&records, self.config.sentiment_cap);
                Some(annotate(classifier, &texts, self.config.headline_timeout, out).await)
            }
            None => None,
        };

        info!(
            headlines = records.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Source run complete"
        );
        RunReport {
            records,
            exported,
            annotation,
        }
    }

    /// Fetch, extract and collect; any failure yields an empty sequence.
    async fn headlines(&self) -> Vec<HeadlineRecord> {
        let schema = match CompiledSchema::compile(&self.config.schema) {
            Ok(schema) => schema,
            Err(e) => {
                error!(error = %e, "Error parsing data: schema is unusable");
                return Vec::new();
            }
        };

        let page = match fetch_page(self.client, &self.config.schema.url).await {
            Ok(page) => page,
            Err(e) => {
                error!(url = %self.config.schema.url, error = %e, "Error fetching data");
                return Vec::new();
            }
        };

        collect(extract(&page, &schema, self.config.max_headlines))
    }

    fn export<W: Write>(&self, records: &[HeadlineRecord], out: &mut W) -> Option<PathBuf> {
        let path = self.config.export_path()?;
        match csv::export(records, &path) {
            Ok(0) => None,
            Ok(count) => {
                emit(console::saved(out, count, &path));
                Some(path)
            }
            Err(e) => {
                error!(error = %e, "Export failed");
                None
            }
        }
    }
}

/// Non-empty headline texts, at most `cap` of them.
pub fn headline_texts(records: &[HeadlineRecord], cap: usize) -> Vec<&str> {
    records
        .iter()
        .map(|r| r.headline.as_str())
        .filter(|h| !h.is_empty())
        .take(cap)
        .collect()
}

/// Classify each text in order, printing a result block per success.
///
/// `per_headline` bounds each `classify` call as a whole; a retrying
/// classifier bounds its own attempts inside it. A failure or timeout on one
/// headline is logged and the loop moves on.
pub async fn annotate<C, W>(
    classifier: &C,
    texts: &[&str],
    per_headline: Duration,
    out: &mut W,
) -> AnnotationSummary
where
    C: Classify,
    W: Write,
{
    let mut summary = AnnotationSummary::default();
    for (index, text) in texts.iter().enumerate() {
        let result = match timeout(per_headline, classifier.classify(text)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Annotation(format!(
                "classifier did not answer within {per_headline:?}"
            ))),
        };
        match result {
            Ok(sentiment) => {
                summary.classified += 1;
                emit(console::sentiment(out, text, &sentiment));
            }
            Err(e) => {
                summary.failed += 1;
                error!(index, error = %e, "Error in sentiment analysis");
            }
        }
    }
    if summary.failed > 0 {
        warn!(failed = summary.failed, classified = summary.classified, "Some headlines were not classified");
    }
    summary
}

fn emit(result: io::Result<()>) {
    if let Err(e) = result {
        warn!(error = %e, "Failed to write run log");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::{FakeClassifier, HangsOnce};
    use crate::api::{RetryClassify, retry_budget};
    use std::cell::Cell;
    use crate::models::Sentiment;
    use crate::scrapers::fetch::tests::{http_response, serve};
    use crate::scrapers::fetch::{DEFAULT_TIMEOUT, build_client};
    use crate::scrapers::{FieldSpec, finviz};

    const PAGE: &str = r#"
        <table class="styled-table-new">
          <tr><td class="news_date-cell">08:15AM</td><td class="news_link-cell"><a href="/n/1">Nvidia beats estimates</a></td></tr>
          <tr><td class="news_date-cell">08:10AM</td><td class="news_link-cell"><a href="/n/2">Oil slides on supply glut</a></td></tr>
          <tr><td class="news_date-cell">08:05AM</td><td class="news_link-cell"><a href="/n/3">Fed holds rates</a></td></tr>
        </table>
    "#;

    fn config_for(url: String) -> PipelineConfig {
        let mut schema = finviz::schema();
        schema.url = url;
        PipelineConfig::new(schema)
    }

    fn record(headline: &str) -> HeadlineRecord {
        HeadlineRecord {
            headline: headline.to_string(),
            fetched_at: "2025-05-06T14:30:00+00:00".to_string(),
            url: None,
            timestamp: None,
        }
    }

    #[test]
    fn test_headline_texts_caps_and_filters() {
        let records = vec![record("A"), record(""), record("B"), record("C")];
        assert_eq!(headline_texts(&records, 2), vec!["A", "B"]);
        assert_eq!(headline_texts(&records, 20), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_export_path_uses_schema_file_name() {
        let mut config = PipelineConfig::new(finviz::schema());
        assert!(config.export_path().is_none());
        config.export_dir = Some(PathBuf::from("out"));
        assert_eq!(
            config.export_path(),
            Some(PathBuf::from("out/finviz_financial_news.csv"))
        );
    }

    #[tokio::test]
    async fn test_annotation_failure_does_not_stop_loop() {
        let classifier = FakeClassifier {
            fail_on: vec!["Oil slides".to_string()],
            ..FakeClassifier::default()
        };
        let texts = ["Stocks rally", "", "Oil slides", "Fed holds"];
        let mut out = Vec::new();

        let summary = annotate(&classifier, &texts, Duration::from_secs(1), &mut out).await;

        assert_eq!(summary, AnnotationSummary { classified: 2, failed: 2 });
        assert_eq!(classifier.calls.get(), 4);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Headline: Stocks rally..."));
        assert!(text.contains("Headline: Fed holds..."));
        assert!(text.contains("Sentiment: positive (0.875)"));
    }

    struct Stalled;

    impl Classify for Stalled {
        async fn classify(&self, _text: &str) -> crate::error::Result<Sentiment> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            unreachable!("timeout fires first")
        }
    }

    #[tokio::test]
    async fn test_annotation_timeout_counts_as_failure() {
        let mut out = Vec::new();
        let summary = annotate(&Stalled, &["Dow slips"], Duration::from_millis(20), &mut out).await;
        assert_eq!(summary, AnnotationSummary { classified: 0, failed: 1 });
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_annotation_budget_leaves_room_for_retries() {
        let attempt = Duration::from_millis(50);
        let classifier = RetryClassify::new(
            HangsOnce {
                calls: Cell::new(0),
            },
            2,
            Duration::from_millis(1),
        )
        .with_attempt_timeout(attempt);
        let budget = retry_budget(attempt, 2, Duration::from_millis(1));

        let mut out = Vec::new();
        let summary = annotate(&classifier, &["Dow slips"], budget, &mut out).await;

        assert_eq!(summary, AnnotationSummary { classified: 1, failed: 0 });
        assert!(String::from_utf8(out).unwrap().contains("Sentiment: neutral (0.600)"));
    }

    #[tokio::test]
    async fn test_run_end_to_end() {
        let url = serve(http_response("200 OK", PAGE)).await;
        let client = build_client(DEFAULT_TIMEOUT).unwrap();
        let classifier = FakeClassifier::default();
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(url.clone());
        config.export_dir = Some(dir.path().to_path_buf());
        config.sentiment_cap = 2;

        let mut out = Vec::new();
        let report = Pipeline::new(config, &client, Some(&classifier)).run(&mut out).await;

        assert_eq!(report.records.len(), 3);
        assert_eq!(report.records[0].headline, "Nvidia beats estimates");
        assert_eq!(report.records[0].url.as_deref(), Some(format!("{url}n/1").as_str()));
        assert_eq!(report.annotation, Some(AnnotationSummary { classified: 2, failed: 0 }));
        let exported = report.exported.unwrap();
        assert!(exported.ends_with("finviz_financial_news.csv"));

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Total headlines: 3"));
        assert!(text.contains("Timestamp: 08:15AM"));
        assert!(text.contains("Saved 3 headlines to"));
        assert!(text.contains("Sentiment: negative (0.875)"));
        assert!(!text.contains("Headline: Fed holds rates..."));
    }

    #[tokio::test]
    async fn test_non_success_status_yields_empty_run() {
        let url = serve(http_response("404 Not Found", "gone")).await;
        let client = build_client(DEFAULT_TIMEOUT).unwrap();
        let classifier = FakeClassifier::default();
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(url);
        config.export_dir = Some(dir.path().to_path_buf());

        let mut out = Vec::new();
        let report = Pipeline::new(config, &client, Some(&classifier)).run(&mut out).await;

        assert!(report.records.is_empty());
        assert!(report.exported.is_none());
        assert_eq!(report.annotation, Some(AnnotationSummary::default()));
        assert_eq!(classifier.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_connection_failure_yields_empty_run() {
        let client = build_client(Duration::from_millis(500)).unwrap();
        let config = config_for("http://127.0.0.1:9/".to_string());

        let mut out = Vec::new();
        let report = Pipeline::<FakeClassifier>::new(config, &client, None).run(&mut out).await;

        assert!(report.records.is_empty());
        assert!(report.annotation.is_none());
    }

    #[tokio::test]
    async fn test_bad_selector_yields_empty_run() {
        let url = serve(http_response("200 OK", PAGE)).await;
        let client = build_client(DEFAULT_TIMEOUT).unwrap();
        let mut config = config_for(url);
        config.schema.headline = FieldSpec::text("a[");

        let mut out = Vec::new();
        let report = Pipeline::<FakeClassifier>::new(config, &client, None).run(&mut out).await;
        assert!(report.records.is_empty());
    }
}
