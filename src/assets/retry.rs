use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::assets::loader::{AssetError, AssetLoader};

/// Retry and timeout policy shared by the preload pipeline, warm-ahead and scene mounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure.
    pub retry_count: u32,
    /// Hard deadline for one attempt, measured from the attempt start.
    pub timeout: Duration,
    /// Backoff unit; the wait after attempt `n` is `base_delay * n`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_count: 2,
            timeout: Duration::from_millis(8000),
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Total attempts allowed (first try plus retries).
    pub fn max_attempts(&self) -> u32 {
        self.retry_count.saturating_add(1)
    }

    /// Backoff before the attempt following `attempt` (1-based).
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// Settled result of readying one asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreloadTask {
    /// Asset URL.
    pub url: String,
    /// Attempts started, including the successful one.
    pub attempts_used: u32,
    /// `Ok` when ready; otherwise the last error (or [`AssetError::Cancelled`]).
    pub outcome: Result<(), AssetError>,
}

impl PreloadTask {
    /// Return `true` when the asset became ready.
    pub fn is_ready(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Return `true` when the task was abandoned because of cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.outcome, Err(AssetError::Cancelled { .. }))
    }
}

/// Ready `url` with per-attempt timeout and linear backoff. Never panics, never returns early
/// on failure: the task always settles with an outcome.
///
/// `cancel` is raced against every attempt and every backoff sleep, and checked before each
/// attempt starts.
pub async fn load_with_retry(
    loader: &dyn AssetLoader,
    url: &str,
    policy: RetryPolicy,
    cancel: &CancellationToken,
) -> PreloadTask {
    let cancelled = |attempts_used| PreloadTask {
        url: url.to_string(),
        attempts_used,
        outcome: Err(AssetError::Cancelled {
            url: url.to_string(),
        }),
    };

    let max_attempts = policy.max_attempts();
    let mut last_err = None;
    for attempt in 1..=max_attempts {
        if cancel.is_cancelled() {
            return cancelled(attempt - 1);
        }

        let res = tokio::select! {
            biased;
            _ = cancel.cancelled() => return cancelled(attempt),
            r = tokio::time::timeout(policy.timeout, loader.load(url)) => r,
        };

        let err = match res {
            Ok(Ok(())) => {
                return PreloadTask {
                    url: url.to_string(),
                    attempts_used: attempt,
                    outcome: Ok(()),
                };
            }
            Ok(Err(e)) => e,
            Err(_) => AssetError::Timeout {
                url: url.to_string(),
                timeout: policy.timeout,
            },
        };
        tracing::debug!(url, attempt, max_attempts, error = %err, "asset attempt failed");
        last_err = Some(err);

        if attempt < max_attempts {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return cancelled(attempt),
                _ = tokio::time::sleep(policy.backoff_after(attempt)) => {}
            }
        }
    }

    PreloadTask {
        url: url.to_string(),
        attempts_used: max_attempts,
        outcome: Err(last_err.unwrap_or_else(|| AssetError::source(url, "no attempts made"))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/retry.rs"]
mod tests;
