//! Retry utilities with exponential backoff for upstream API calls.

use std::time::Duration;
use tokio::time::sleep;

use crate::sources::SourceError;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Set the number of attempts (at least one)
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the initial delay
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Backoff delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self.initial_delay.as_secs_f64()
            * self.backoff_multiplier.powf(attempt.saturating_sub(1) as f64);
        Duration::from_secs_f64(exp.min(self.max_delay.as_secs_f64()))
    }
}

/// Transient errors that should trigger a retry
#[derive(Debug, Clone, PartialEq)]
pub enum TransientError {
    /// Network connectivity issues or timeouts
    Network,
    /// Rate limit exceeded (with optional retry-after seconds)
    RateLimit(Option<u64>),
    /// Server error (5xx)
    ServerError,
}

impl TransientError {
    /// Check if a SourceError represents a transient error
    pub fn from_source_error(err: &SourceError) -> Option<Self> {
        match err {
            SourceError::RateLimit(after) => Some(TransientError::RateLimit(*after)),
            SourceError::Network(_) => Some(TransientError::Network),
            SourceError::Api { status, .. } if *status >= 500 => Some(TransientError::ServerError),
            _ => None,
        }
    }

    /// Minimum delay the error itself asks for
    pub fn minimum_delay(&self) -> Duration {
        match self {
            TransientError::RateLimit(Some(seconds)) => Duration::from_secs(*seconds),
            _ => Duration::ZERO,
        }
    }
}

/// Execute an async operation, retrying transient failures with backoff.
///
/// Permanent errors are returned immediately; the last transient error is
/// returned once `max_attempts` is reached.
pub async fn with_retry<T, F, Fut>(config: RetryConfig, mut operation: F) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, SourceError>>,
{
    let mut attempts = 0;

    loop {
        attempts += 1;

        match operation().await {
            Ok(result) => {
                if attempts > 1 {
                    tracing::info!("Request succeeded on attempt {}", attempts);
                }
                return Ok(result);
            }
            Err(error) => {
                let Some(transient) = TransientError::from_source_error(&error) else {
                    return Err(error);
                };

                if attempts >= config.max_attempts {
                    tracing::warn!("Request failed after {} attempts: {}", attempts, error);
                    return Err(error);
                }

                let delay = std::cmp::max(config.delay_for(attempts), transient.minimum_delay());
                tracing::debug!(
                    "Transient error on attempt {}: {:?}, retrying in {:?}",
                    attempts,
                    transient,
                    delay
                );
                sleep(delay).await;
            }
        }
    }
}
