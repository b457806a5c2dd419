//! Retry policy: which responses to retry and how long to wait.

use crate::config::RetryConfig;
use httpline_core::Response;
use reqwest::header::RETRY_AFTER;
use std::time::Duration;
use tracing::debug;

/// Decides whether a response warrants another attempt and how long to wait
/// before it.
///
/// Implementations must be pure: the same response and attempt number always
/// yield the same decision, and nothing is recorded between calls.
pub trait RetryPolicy: Send + Sync {
    /// Check if the response should be retried.
    fn should_retry(&self, response: &Response) -> bool;

    /// Delay before retry number `attempt` (1-based).
    fn compute_delay(&self, response: &Response, attempt: u32) -> Duration;

    /// Maximum number of retries after the first send.
    fn max_retries(&self) -> u32;
}

/// Status-driven policy honouring `Retry-After`.
///
/// Retries 429 and 503 (configurable) as long as the request body can be
/// replayed. Waits for the number of seconds in `Retry-After` when the
/// header holds a plain integer, and otherwise falls back to the configured
/// wait strategy.
#[derive(Debug, Clone, Default)]
pub struct DefaultRetryPolicy {
    config: RetryConfig,
}

impl DefaultRetryPolicy {
    /// Create a policy from a config.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// The config in use.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

impl RetryPolicy for DefaultRetryPolicy {
    fn should_retry(&self, response: &Response) -> bool {
        self.config
            .retry_statuses
            .contains(&response.status().as_u16())
            && response.request().is_replayable()
    }

    fn compute_delay(&self, response: &Response, attempt: u32) -> Duration {
        retry_after(response).unwrap_or_else(|| self.config.wait.calculate(attempt))
    }

    fn max_retries(&self) -> u32 {
        self.config.max_retries
    }
}

/// Parse the `Retry-After` header as whole seconds.
///
/// Only the first value is considered. HTTP dates, negative numbers and
/// fractions are treated as absent.
pub fn retry_after(response: &Response) -> Option<Duration> {
    let value = response.headers().get(RETRY_AFTER)?;
    let parsed = value
        .to_str()
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs);

    if parsed.is_none() {
        debug!(value = ?value, "Ignoring unusable Retry-After header");
    }
    parsed
}
