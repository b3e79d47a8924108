//! Sentiment classification through a hosted FinBERT model.
//!
//! The pipeline only needs `classify(text) -> { label, score }`. This module
//! provides that capability and keeps the model itself behind an HTTP API.
//!
//! # Architecture
//!
//! - [`Classify`]: Core trait the pipeline is generic over
//! - [`HuggingFaceClassifier`]: Calls a Hugging Face text-classification endpoint
//! - [`RetryClassify`]: Decorator that adds retry logic to any `Classify` implementation
//!
//! # Retry Strategy
//!
//! - Configurable number of retries (a cold model answers 503 while loading)
//! - Optional per-attempt timeout; an attempt that times out is retried
//! - Exponential backoff starting at 1 second
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to each delay

use crate::error::{Error, Result};
use crate::models::Sentiment;
use crate::utils::truncate_for_log;
use rand::{Rng, rng};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, instrument, warn};

pub const DEFAULT_MODEL: &str = "ProsusAI/finbert";
pub const DEFAULT_INFERENCE_URL: &str = "https://router.huggingface.co/hf-inference/models";
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_secs(1);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);
const MAX_JITTER_MS: u64 = 250;

/// Trait for async sentiment classification.
///
/// Implementations must reject blank input with [`Error::Annotation`].
pub trait Classify {
    /// Classify `text`, returning the most likely label and its confidence.
    async fn classify(&self, text: &str) -> Result<Sentiment>;
}

/// Settings for [`HuggingFaceClassifier`].
#[derive(Clone)]
pub struct ClassifierConfig {
    /// Base URL; the model id is appended as a path.
    pub inference_url: String,
    pub model: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("inference_url", &self.inference_url)
            .field("model", &self.model)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            inference_url: DEFAULT_INFERENCE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Classifier backed by the Hugging Face inference API.
#[derive(Debug)]
pub struct HuggingFaceClassifier {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

/// The API answers `[[{label, score}, ...]]` for one input; some deployments
/// drop the outer list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<Sentiment>>),
    Flat(Vec<Sentiment>),
}

#[derive(Debug, Deserialize)]
struct InferenceError {
    error: String,
}

impl HuggingFaceClassifier {
    /// # Errors
    ///
    /// [`Error::Annotation`] if the HTTP client cannot be built.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Annotation(format!("cannot build inference client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/{}",
                config.inference_url.trim_end_matches('/'),
                config.model.trim_start_matches('/')
            ),
            token: config.token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Classify for HuggingFaceClassifier {
    #[instrument(level = "debug", skip_all, fields(endpoint = %self.endpoint))]
    async fn classify(&self, text: &str) -> Result<Sentiment> {
        if text.trim().is_empty() {
            return Err(Error::Annotation("cannot classify empty text".to_string()));
        }

        let t0 = Instant::now();
        let mut request = self.client.post(&self.endpoint).json(&json!({ "inputs": text }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| Error::Annotation(format!("inference request failed: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Annotation(format!("inference response unreadable: {e}")))?;
        debug!(status = status.as_u16(), elapsed_ms = t0.elapsed().as_millis() as u64, "Inference call returned");

        if !status.is_success() {
            let reason = serde_json::from_str::<InferenceError>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| truncate_for_log(&body, 200));
            return Err(Error::Annotation(format!("inference API returned {status}: {reason}")));
        }
        top_sentiment(&body)
    }
}

/// Pick the highest-scoring label from an inference response body.
fn top_sentiment(body: &str) -> Result<Sentiment> {
    let parsed: InferenceResponse = serde_json::from_str(body).map_err(|e| {
        Error::Annotation(format!(
            "unexpected inference response ({e}): {}",
            truncate_for_log(body, 200)
        ))
    })?;
    let candidates = match parsed {
        InferenceResponse::Nested(mut outer) if !outer.is_empty() => outer.swap_remove(0),
        InferenceResponse::Nested(_) => Vec::new(),
        InferenceResponse::Flat(list) => list,
    };

    let best = candidates
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or_else(|| Error::Annotation("inference response had no labels".to_string()))?;
    if !(0.0..=1.0).contains(&best.score) {
        return Err(Error::Annotation(format!("score {} outside [0, 1]", best.score)));
    }
    Ok(best)
}

/// Wrapper that adds exponential backoff retry logic to any [`Classify`] implementation.
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
/// Blank input is passed straight through; retrying it cannot succeed.
pub struct RetryClassify<T> {
    inner: T,
    max_retries: usize,
    base_delay: Duration,
    max_delay: Duration,
    attempt_timeout: Option<Duration>,
}

/// Backoff before retry number `attempt` (1-based), jitter excluded.
fn backoff(base_delay: Duration, max_delay: Duration, attempt: usize) -> Duration {
    base_delay
        .saturating_mul(1 << (attempt.saturating_sub(1)).min(16))
        .min(max_delay)
}

/// Longest a [`RetryClassify`] with these settings can spend on one text:
/// every attempt running into `per_attempt`, plus the worst-case backoff
/// and jitter between them.
pub fn retry_budget(per_attempt: Duration, max_retries: usize, base_delay: Duration) -> Duration {
    let attempts = u32::try_from(max_retries.saturating_add(1)).unwrap_or(u32::MAX);
    (1..=max_retries).fold(per_attempt.saturating_mul(attempts), |total, attempt| {
        total
            .saturating_add(backoff(base_delay, MAX_RETRY_DELAY, attempt))
            .saturating_add(Duration::from_millis(MAX_JITTER_MS))
    })
}

impl<T> RetryClassify<T>
where
    T: Classify,
{
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: MAX_RETRY_DELAY,
            attempt_timeout: None,
        }
    }

    /// Bound each attempt; one that runs past `limit` counts as a failure.
    pub fn with_attempt_timeout(mut self, limit: Duration) -> Self {
        self.attempt_timeout = Some(limit);
        self
    }

    async fn attempt(&self, text: &str) -> Result<Sentiment> {
        match self.attempt_timeout {
            Some(limit) => timeout(limit, self.inner.classify(text))
                .await
                .unwrap_or_else(|_| {
                    Err(Error::Annotation(format!(
                        "classifier did not answer within {limit:?}"
                    )))
                }),
            None => self.inner.classify(text).await,
        }
    }
}

impl<T> fmt::Debug for RetryClassify<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryClassify")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .field("attempt_timeout", &self.attempt_timeout)
            .finish()
    }
}

impl<T> Classify for RetryClassify<T>
where
    T: Classify,
{
    async fn classify(&self, text: &str) -> Result<Sentiment> {
        if text.trim().is_empty() {
            return self.inner.classify(text).await;
        }

        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.attempt(text).await {
                Ok(sentiment) => return Ok(sentiment),
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "classify() exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = backoff(self.base_delay, self.max_delay, attempt);
                    let jitter_ms: u64 = rng().random_range(0..=MAX_JITTER_MS);
                    let delay = delay + Duration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "classify() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
