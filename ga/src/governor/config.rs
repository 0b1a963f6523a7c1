//! Governor configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Governor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernorConfig {
    /// Minimum spacing between the starts of two completion calls
    #[serde(rename = "min-interval-ms")]
    pub min_interval_ms: u64,

    /// Attempts per submission, including the first
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Backoff base in milliseconds
    #[serde(rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,

    /// Backoff growth factor per failed attempt
    #[serde(rename = "backoff-factor")]
    pub backoff_factor: f64,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 2_000,
            max_attempts: 5,
            backoff_base_ms: 5_000,
            backoff_factor: 1.7,
        }
    }
}

impl GovernorConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            backoff_base: Duration::from_millis(self.backoff_base_ms),
            backoff_factor: if self.backoff_factor.is_finite() && self.backoff_factor >= 1.0 {
                self.backoff_factor
            } else {
                1.0
            },
        }
    }
}

/// Retry schedule for retryable upstream failures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        GovernorConfig::default().retry_policy()
    }
}

impl RetryPolicy {
    /// Wait after the `failures`-th consecutive retryable failure (1-based)
    pub fn backoff(&self, failures: u32) -> Duration {
        let exponent = i32::try_from(failures).unwrap_or(i32::MAX);
        let secs = (self.backoff_base.as_secs_f64() * self.backoff_factor.powi(exponent)).max(0.0);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}
