//! Command-line interface definitions.
//!
//! Every option has a default reproducing the stock behaviour: Finviz news,
//! all headlines, a 10 second fetch timeout, sentiment for the first 20
//! headlines and no export. Secrets can come from the environment.

use crate::api::{
    ClassifierConfig, DEFAULT_INFERENCE_URL, DEFAULT_MODEL, DEFAULT_RETRY_BASE_DELAY, retry_budget,
};
use crate::pipeline::{DEFAULT_SENTIMENT_CAP, PipelineConfig};
use crate::scrapers::fetch::DEFAULT_TIMEOUT;
use crate::scrapers::{SiteSchema, Source};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Finviz headlines with sentiment for the first 20
/// headline_sentiment
///
/// # Both sites, export CSVs, no sentiment
/// headline_sentiment --source finviz --source benzinga --export-dir ./out --skip-sentiment
///
/// # Custom sites from a schema file
/// headline_sentiment --schema-file sites.yaml --max-headlines 50
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// News source to scrape (repeatable)
    #[arg(long = "source", value_enum, default_values_t = [Source::Finviz])]
    pub sources: Vec<Source>,

    /// YAML file with site schemas; replaces --source
    #[arg(long)]
    pub schema_file: Option<PathBuf>,

    /// Maximum headlines to extract per source (0 = all)
    #[arg(long, default_value_t = 0)]
    pub max_headlines: usize,

    /// Maximum headlines sent to the sentiment classifier per source
    #[arg(long, default_value_t = DEFAULT_SENTIMENT_CAP)]
    pub sentiment_cap: usize,

    /// Fetch timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs(), value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Directory to export one CSV per source into
    #[arg(short, long)]
    pub export_dir: Option<PathBuf>,

    /// Skip the sentiment stage
    #[arg(long)]
    pub skip_sentiment: bool,

    /// Hugging Face API token
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    pub hf_token: Option<String>,

    /// Text-classification model id
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the inference API
    #[arg(long, env = "HF_INFERENCE_URL", default_value = DEFAULT_INFERENCE_URL)]
    pub inference_url: String,

    /// Timeout in seconds for one classifier attempt
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub classify_timeout: u64,

    /// Retries for a failed or timed-out classifier attempt
    #[arg(long, default_value_t = 2)]
    pub classify_retries: usize,
}

impl Cli {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.classify_timeout)
    }

    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            inference_url: self.inference_url.clone(),
            model: self.model.clone(),
            token: self.hf_token.clone(),
            timeout: self.attempt_timeout(),
        }
    }

    pub fn pipeline_config(&self, schema: SiteSchema) -> PipelineConfig {
        PipelineConfig {
            max_headlines: self.max_headlines,
            sentiment_cap: self.sentiment_cap,
            export_dir: self.export_dir.clone(),
            headline_timeout: retry_budget(
                self.attempt_timeout(),
                self.classify_retries,
                DEFAULT_RETRY_BASE_DELAY,
            ),
            model: self.model.clone(),
            ..PipelineConfig::new(schema)
        }
    }

    /// Built-in schemas for `--source`, deduplicated in order.
    pub fn builtin_schemas(&self) -> Vec<SiteSchema> {
        let mut seen = Vec::new();
        for source in &self.sources {
            if !seen.contains(source) {
                seen.push(*source);
            }
        }
        seen.into_iter().map(Source::schema).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_match_stock_behaviour() {
        let cli = Cli::parse_from(["headline_sentiment"]);

        assert_eq!(cli.sources, vec![Source::Finviz]);
        assert_eq!(cli.max_headlines, 0);
        assert_eq!(cli.sentiment_cap, 20);
        assert_eq!(cli.fetch_timeout(), Duration::from_secs(10));
        assert!(cli.export_dir.is_none());
        assert_eq!(cli.model, "ProsusAI/finbert");
    }

    #[test]
    fn test_cli_multiple_sources() {
        let cli = Cli::parse_from([
            "headline_sentiment",
            "--source",
            "benzinga",
            "--source",
            "finviz",
            "--source",
            "benzinga",
        ]);

        let names: Vec<_> = cli.builtin_schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Benzinga", "Finviz"]);
    }

    #[test]
    fn test_cli_rejects_zero_timeout() {
        assert!(Cli::try_parse_from(["headline_sentiment", "--timeout", "0"]).is_err());
    }

    #[test]
    fn test_pipeline_config_from_flags() {
        let cli = Cli::parse_from([
            "headline_sentiment",
            "--max-headlines",
            "15",
            "--sentiment-cap",
            "5",
            "-e",
            "/tmp/news",
        ]);

        let config = cli.pipeline_config(Source::Benzinga.schema());
        assert_eq!(config.max_headlines, 15);
        assert_eq!(config.sentiment_cap, 5);
        // Three 30 s attempts plus two backoffs of at most 1.25 s and 2.25 s.
        assert_eq!(config.headline_timeout, Duration::from_millis(93_500));
        assert_eq!(
            config.export_path(),
            Some(PathBuf::from("/tmp/news/benzinga_financial_news.csv"))
        );
    }
}
