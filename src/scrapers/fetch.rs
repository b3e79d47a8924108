//! Page fetching with browser-like request headers.
//!
//! Both news sites reject obvious bot traffic, so every request carries the
//! header set of a desktop Chrome. Requests are never retried: one failure
//! ends the run for that source.

use crate::error::{Error, Result};
use reqwest::Client;
use reqwest::header::{
    ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderName, HeaderValue,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const BROWSER_HEADERS: [(HeaderName, &str); 6] = [
    (
        USER_AGENT,
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    ),
    (
        ACCEPT,
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
    ),
    (ACCEPT_LANGUAGE, "en-US,en;q=0.5"),
    (ACCEPT_ENCODING, "gzip, deflate"),
    (CONNECTION, "keep-alive"),
    (UPGRADE_INSECURE_REQUESTS, "1"),
];

fn browser_headers() -> HeaderMap {
    BROWSER_HEADERS
        .into_iter()
        .map(|(name, value)| (name, HeaderValue::from_static(value)))
        .collect()
}

/// Build the HTTP client shared by all sources of one run.
///
/// # Errors
///
/// [`Error::Config`] for a zero timeout, [`Error::Fetch`] if the TLS backend
/// cannot be initialised.
pub fn build_client(timeout: Duration) -> Result<Client> {
    if timeout.is_zero() {
        return Err(Error::Config("fetch timeout must be greater than zero".to_string()));
    }
    Ok(Client::builder()
        .default_headers(browser_headers())
        .timeout(timeout)
        .build()?)
}

/// GET `url` once and return the body.
///
/// # Errors
///
/// [`Error::Fetch`] on timeout, DNS/connection/TLS failure or any
/// non-success status.
#[instrument(level = "info", skip(client))]
pub async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    let t0 = Instant::now();
    let response = client.get(url).send().await?.error_for_status()?;
    let status = response.status();
    let body = response.text().await?;

    info!(
        status = status.as_u16(),
        bytes = body.len(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Fetched page"
    );
    debug!(preview = %crate::utils::truncate_for_log(&body, 200), "Page body");
    Ok(body)
}
