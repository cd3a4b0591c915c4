//! Optional retry wrapper keyed on [`OcrError::is_retryable`].
//!
//! The core client is deliberately policy-free: nothing in submission,
//! polling, or batching retries on its own. Callers who want retries wrap
//! individual operations with [`retry`], which re-runs an operation only
//! when the error kind says a repeat might succeed, backing off
//! exponentially between attempts (`base_delay * 2^attempt`, capped at
//! `max_delay`).
//!
//! # Example
//! ```rust,no_run
//! use leapocr::{retry, ClientConfig, OcrClient, ProcessOptions, RetryPolicy};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), leapocr::OcrError> {
//! let client = OcrClient::from_config(ClientConfig::new("sk-key")?)?;
//! let options = ProcessOptions::default();
//! let job = retry(&RetryPolicy::default(), || {
//!     client.process_url("https://example.com/doc.pdf", &options)
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::error::OcrError;

/// Backoff parameters for [`retry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first. Default: 3.
    pub max_retries: u32,
    /// Delay before the first retry. Default: 1 s.
    pub base_delay: Duration,
    /// Upper bound on any single delay. Default: 60 s.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based).
    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Run `op`, retrying while it fails with a retryable error.
///
/// `op` produces a fresh future per attempt. Non-retryable errors return
/// immediately; retryable errors return once `max_retries` additional
/// attempts are exhausted.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, OcrError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, OcrError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_retryable() && attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                warn!(
                    attempt = attempt + 1,
                    max = policy.max_retries,
                    ?delay,
                    %error,
                    "retrying after retryable error"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_retries: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
        };
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn non_retryable_error_returns_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry(&fast_policy(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(OcrError::from_status(Some(401), None, "")) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retryable_error_exhausts_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry(&fast_policy(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(OcrError::from_status(Some(503), None, "")) }
        })
        .await;
        assert!(result.is_err());
        // Initial attempt plus three retries.
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = retry(&fast_policy(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(OcrError::from_status(Some(429), None, ""))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
