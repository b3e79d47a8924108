//! # Headline Sentiment
//!
//! Scrapes financial-news headlines from Finviz and Benzinga and runs each
//! one through a FinBERT sentiment classifier.
//!
//! ## Usage
//!
//! ```sh
//! headline_sentiment --source finviz --source benzinga -e ./out
//! ```
//!
//! ## Architecture
//!
//! Each source runs as an independent, sequential pipeline:
//! 1. **Fetching**: One GET with browser-like headers and a timeout
//! 2. **Extraction**: Schema-driven DOM walk producing headlines in page order
//! 3. **Collection**: Headlines stamped with their capture time
//! 4. **Output**: Console preview and optional CSV export
//! 5. **Annotation**: Sentiment label and score for the first N headlines
//!
//! Failures at any stage are logged; the process always exits 0.

use clap::Parser;
use std::error::Error;
use std::io::{self, Write};
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod error;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use api::{DEFAULT_RETRY_BASE_DELAY, HuggingFaceClassifier, RetryClassify};
use cli::Cli;
use pipeline::Pipeline;
use scrapers::fetch::build_client;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("headline_sentiment starting up");

    let args = Cli::parse();
    debug!(sources = ?args.sources, schema_file = ?args.schema_file, "Parsed CLI arguments");

    let schemas = match &args.schema_file {
        Some(path) => match scrapers::load_schemas(path).await {
            Ok(schemas) => schemas,
            Err(e) => {
                error!(error = %e, "Could not load site schemas; nothing to do");
                Vec::new()
            }
        },
        None => args.builtin_schemas(),
    };

    let client = match build_client(args.fetch_timeout()) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Could not build HTTP client; nothing to do");
            return Ok(());
        }
    };

    let classifier = if args.skip_sentiment {
        info!("Sentiment stage disabled");
        None
    } else {
        let config = args.classifier_config();
        if config.token.is_none() {
            warn!("HF_TOKEN not set; the inference API may reject anonymous requests");
        }
        match HuggingFaceClassifier::new(&config) {
            Ok(classifier) => {
                info!(endpoint = classifier.endpoint(), "Sentiment classifier ready");
                Some(
                    RetryClassify::new(classifier, args.classify_retries, DEFAULT_RETRY_BASE_DELAY)
                        .with_attempt_timeout(args.attempt_timeout()),
                )
            }
            Err(e) => {
                error!(error = %e, "Error in sentiment analysis: classifier unavailable");
                None
            }
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut total_headlines = 0usize;
    let mut exported_files = 0usize;
    let mut classified = 0usize;
    let mut unclassified = 0usize;
    for schema in schemas {
        let config = args.pipeline_config(schema);
        let report = Pipeline::new(config, &client, classifier.as_ref())
            .run(&mut out)
            .await;
        total_headlines += report.records.len();
        if let Some(path) = &report.exported {
            debug!(path = %path.display(), "Export written");
            exported_files += 1;
        }
        if let Some(summary) = report.annotation {
            classified += summary.classified;
            unclassified += summary.failed;
        }
    }
    if let Err(e) = out.flush() {
        warn!(error = %e, "Failed to flush stdout");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        headlines = total_headlines,
        exported_files,
        classified,
        unclassified,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
