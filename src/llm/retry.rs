//! Retry with exponential backoff and jitter.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::core::{Result, ScribeError};

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Reject policies that could never send a request or never back off.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(ScribeError::config("backend.max_attempts must be at least 1"));
        }
        if self.multiplier < 1.0 {
            return Err(ScribeError::config("retry multiplier must be at least 1.0"));
        }
        if self.initial_backoff > self.max_backoff {
            return Err(ScribeError::config(
                "backend.initial_backoff_ms must not exceed backend.max_backoff_ms",
            ));
        }
        Ok(())
    }

    /// Nominal wait after failed attempt `attempt` (1-based), before jitter.
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial_backoff.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::try_from_secs_f64(secs)
            .unwrap_or(Duration::MAX)
            .min(self.max_backoff)
    }

    /// Send a backend request, repeating it while the failure is transient.
    ///
    /// Runs at least once. Events are emitted inside the caller's span, so
    /// retries show up under the agent that issued the request.
    pub async fn execute<F, Fut, T>(&self, mut request: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let error = match request().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            if !error.is_retryable() {
                return Err(error);
            }
            if attempt >= attempts {
                tracing::warn!(attempts, error = %error, "Backend still failing, giving up");
                return Err(error);
            }

            // 75% to 125% of the nominal backoff
            let delay = self
                .backoff_after(attempt)
                .mul_f64(rand::rng().random_range(0.75..1.25));
            tracing::warn!(
                attempt,
                attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Backend request failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
