//! Retry configuration.

use crate::backoff::ExponentialBackoff;
use crate::MAX_RETRY;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the default retry policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retries after the first send.
    pub max_retries: u32,
    /// Delay used when the server sends no usable `Retry-After`.
    pub wait: WaitStrategy,
    /// Status codes that trigger a retry.
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRY,
            wait: WaitStrategy::Exponential(ExponentialBackoff::default()),
            retry_statuses: vec![429, 503],
        }
    }
}

impl RetryConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max retries.
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Set the fallback wait strategy.
    pub fn wait(mut self, strategy: WaitStrategy) -> Self {
        self.wait = strategy;
        self
    }

    /// Use exponential back-off without jitter.
    pub fn exponential(mut self, initial: Duration, max: Duration) -> Self {
        self.wait = WaitStrategy::Exponential(
            ExponentialBackoff::builder()
                .initial_delay(initial)
                .max_delay(max)
                .build(),
        );
        self
    }

    /// Use exponential back-off with jitter.
    pub fn exponential_jitter(mut self, initial: Duration, max: Duration, jitter: f64) -> Self {
        self.wait = WaitStrategy::Exponential(
            ExponentialBackoff::builder()
                .initial_delay(initial)
                .max_delay(max)
                .jitter(jitter)
                .build(),
        );
        self
    }

    /// Use a fixed delay.
    pub fn fixed(mut self, delay: Duration) -> Self {
        self.wait = WaitStrategy::Fixed { delay };
        self
    }

    /// Replace the set of retryable status codes.
    pub fn retry_statuses(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.retry_statuses = codes.into_iter().collect();
        self
    }

    /// Create config that never retries.
    pub fn no_retry() -> Self {
        Self::new().max_retries(0)
    }
}

/// Fallback delay between retries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WaitStrategy {
    /// Retry immediately.
    None,
    /// Constant delay.
    Fixed {
        /// Delay before every retry.
        #[serde(with = "millis")]
        delay: Duration,
    },
    /// Exponential back-off.
    Exponential(ExponentialBackoff),
}

impl WaitStrategy {
    /// Delay before retry number `attempt` (1-based).
    pub fn calculate(&self, attempt: u32) -> Duration {
        match self {
            WaitStrategy::None => Duration::ZERO,
            WaitStrategy::Fixed { delay } => *delay,
            WaitStrategy::Exponential(backoff) => backoff.calculate_delay(attempt),
        }
    }
}

/// Serialize a `Duration` as whole milliseconds.
pub(crate) mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis().min(u64::MAX as u128) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
