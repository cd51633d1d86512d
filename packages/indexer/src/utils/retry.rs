use std::time::Duration;
use tracing::{error, warn};

/// Backoff settings for operations retried at startup (e.g. the first database connection).
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Base delay in milliseconds, doubled on every attempt
    pub base_delay: u64,
    /// Retries after the first attempt
    pub max_retries: u32,
}

impl RetryPolicy {
    pub fn new(base_delay: u64, max_retries: u32) -> Self {
        Self {
            base_delay,
            max_retries,
        }
    }

    /// Delay before retry number `attempt` (1-based), capped at 60 seconds with ±20% jitter.
    fn backoff(&self, attempt: u32) -> Duration {
        let exponential = self
            .base_delay
            .saturating_mul(2_u64.saturating_pow(attempt.saturating_sub(1)));
        let capped = exponential.min(60_000);

        let jitter = (rand::random::<f64>() * 0.4 - 0.2) * capped as f64;
        Duration::from_millis((capped as f64 + jitter).max(0.0) as u64)
    }
}

pub async fn with_retry<F, Fut, T, E>(
    mut operation: F,
    policy: RetryPolicy,
    operation_name: &str,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(result) => return Ok(result),
            Err(err) => {
                if attempt > policy.max_retries {
                    error!(
                        "Operation '{}' failed after {} attempts: {}",
                        operation_name, attempt, err
                    );
                    return Err(err);
                }

                let backoff = policy.backoff(attempt);
                warn!(
                    "Operation '{}' failed (attempt {}/{}): {}. Retrying in {}ms",
                    operation_name,
                    attempt,
                    policy.max_retries + 1,
                    err,
                    backoff.as_millis()
                );

                tokio::time::sleep(backoff).await;
            }
        }
    }
}
