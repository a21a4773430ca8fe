//! HTTP request maker with retries.
//!
//! Status-code checks are centralized in [`check_response`] (429 with
//! `Retry-After` parsing, non-success → [`SefariaError::Api`]). Transient
//! failures are retried with exponential backoff.

use std::time::Duration;

use serde_json::Value;

use crate::error::SefariaError;
use crate::request_maker::RequestMaker;

/// Configuration for retry behavior on transient failures.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

/// Check an HTTP response for common error conditions.
///
/// Returns the response unchanged on success. Handles:
/// - **429 Too Many Requests** → [`SefariaError::RateLimited`] with
///   `Retry-After` header parsing (falls back to 60 s if absent or
///   unparseable).
/// - **Non-success status** → [`SefariaError::Api`] with status code and
///   response body.
///
/// # Errors
///
/// See above.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, SefariaError> {
    if resp.status() == 429 {
        let retry_after = parse_retry_after(&resp);
        return Err(SefariaError::RateLimited { retry_after_secs: retry_after });
    }
    if !resp.status().is_success() {
        return Err(SefariaError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}

/// Fetches endpoints from the live API.
#[derive(Debug, Clone)]
pub struct HttpRequestMaker {
    http: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl HttpRequestMaker {
    /// # Errors
    ///
    /// Returns [`SefariaError::Http`] if the client cannot be built.
    pub fn new(
        base_url: &str,
        user_agent: &str,
        timeout: Duration,
        retry: RetryConfig,
    ) -> Result<Self, SefariaError> {
        let http = reqwest::Client::builder().user_agent(user_agent).timeout(timeout).build()?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string(), retry })
    }

    async fn attempt(&self, url: &str) -> Result<Value, SefariaError> {
        let resp = check_response(self.http.get(url).send().await?).await?;
        Ok(resp.json::<Value>().await?)
    }
}

impl RequestMaker for HttpRequestMaker {
    async fn make_request(&self, endpoint: &str) -> Result<Value, SefariaError> {
        let url = format!("{}{endpoint}", self.base_url);
        let max_attempts = self.retry.max_attempts.max(1);
        let mut delay = self.retry.base_delay;
        let mut attempt = 1;
        loop {
            match self.attempt(&url).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    tracing::warn!(%endpoint, attempt, max_attempts, ?delay, %e, "retrying request");
                    tokio::time::sleep(delay).await;
                    delay = std::cmp::min(delay * 2, self.retry.max_delay);
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(%endpoint, attempt, %e, "request failed");
                    return Err(e);
                }
            }
        }
    }
}
