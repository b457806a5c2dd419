//! Exponential back-off.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exponential back-off with an upper bound and optional jitter.
///
/// The delay before retry `n` (1-based) is
/// `initial_delay * multiplier^(n - 1)`, capped at `max_delay`. With the
/// defaults that is 1s, 2s, 4s, and so on up to 30s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExponentialBackoff {
    /// Delay before the first retry.
    #[serde(with = "crate::config::millis")]
    pub initial_delay: Duration,
    /// Upper bound for any single delay.
    #[serde(with = "crate::config::millis")]
    pub max_delay: Duration,
    /// Growth factor per retry.
    pub multiplier: f64,
    /// Jitter factor (0.0 to 1.0). Zero keeps delays deterministic.
    pub jitter: f64,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: 0.0,
        }
    }
}

impl ExponentialBackoff {
    /// Create a back-off with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder.
    #[must_use]
    pub fn builder() -> ExponentialBackoffBuilder {
        ExponentialBackoffBuilder::default()
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let base = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let jitter = if self.jitter > 0.0 {
            base * self.jitter * rand_jitter()
        } else {
            0.0
        };
        let delay = (base + jitter).min(self.max_delay.as_secs_f64()).max(0.0);
        if delay.is_finite() {
            Duration::from_secs_f64(delay)
        } else {
            self.max_delay
        }
    }
}

/// Builder for [`ExponentialBackoff`].
#[derive(Debug, Default)]
pub struct ExponentialBackoffBuilder {
    initial_delay: Option<Duration>,
    max_delay: Option<Duration>,
    multiplier: Option<f64>,
    jitter: Option<f64>,
}

impl ExponentialBackoffBuilder {
    /// Set initial delay.
    #[must_use]
    pub fn initial_delay(mut self, d: Duration) -> Self {
        self.initial_delay = Some(d);
        self
    }

    /// Set max delay.
    #[must_use]
    pub fn max_delay(mut self, d: Duration) -> Self {
        self.max_delay = Some(d);
        self
    }

    /// Set multiplier.
    #[must_use]
    pub fn multiplier(mut self, m: f64) -> Self {
        self.multiplier = Some(m);
        self
    }

    /// Set jitter factor, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn jitter(mut self, j: f64) -> Self {
        self.jitter = Some(j.clamp(0.0, 1.0));
        self
    }

    /// Build the back-off.
    #[must_use]
    pub fn build(self) -> ExponentialBackoff {
        let mut backoff = ExponentialBackoff::default();
        if let Some(v) = self.initial_delay {
            backoff.initial_delay = v;
        }
        if let Some(v) = self.max_delay {
            backoff.max_delay = v;
        }
        if let Some(v) = self.multiplier {
            backoff.multiplier = v;
        }
        if let Some(v) = self.jitter {
            backoff.jitter = v;
        }
        backoff
    }
}

/// Random factor between -1.0 and 1.0.
fn rand_jitter() -> f64 {
    use rand::Rng;
    rand::thread_rng().gen_range(-1.0..1.0)
}
