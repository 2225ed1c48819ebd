//! Caller-side retry for pipeline invocations.
//!
//! The pipeline is single-attempt; this wraps it one layer up. Only backend
//! failures are retried, each attempt being a fresh invocation.

use crate::error::GenerationOutcome;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry (doubles each retry).
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn with_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub async fn run<T, F, Fut>(&self, mut operation: F) -> GenerationOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = GenerationOutcome<T>>,
    {
        let mut attempt = 0;
        let mut backoff = self.initial_backoff;
        loop {
            match operation().await {
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        attempt,
                        max_retries = self.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Retrying after backend failure"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(self.max_backoff);
                }
                outcome => return outcome,
            }
        }
    }
}
