//! Bounded retry with linear backoff
//!
//! One policy object shared by the three retrying call sites (balance fetch,
//! transaction submission, confirmation), parameterized with a retryable-error
//! predicate and an attempt-failure hook per site.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

/// Attempt budget plus backoff step. The delay after failed attempt `n`
/// (1-based) is `n * step`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    step: Duration,
}

impl RetryPolicy {
    pub const fn linear(max_attempts: u32, step: Duration) -> Self {
        Self { max_attempts, step }
    }

    /// The default policy used across the bot: 3 attempts, 2s linear backoff.
    pub const fn standard() -> Self {
        Self::linear(3, Duration::from_secs(2))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self, attempt: u32) -> Duration {
        self.step * attempt
    }

    /// Run `op` until it succeeds, the error is not retryable, or the attempt
    /// budget is exhausted. `on_error` fires for every failed attempt so call
    /// sites can surface per-attempt status lines.
    pub async fn retry<T, E, Fut, F, P, H>(
        &self,
        mut op: F,
        retryable: P,
        mut on_error: H,
    ) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        H: FnMut(u32, &E),
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    on_error(attempt, &err);
                    if attempt >= self.max_attempts || !retryable(&err) {
                        return Err(err);
                    }
                    sleep(self.backoff(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}
