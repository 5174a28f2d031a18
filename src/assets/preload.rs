use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::assets::loader::AssetLoader;
use crate::assets::retry::{PreloadTask, RetryPolicy, load_with_retry};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Preload pipeline configuration.
pub struct PreloadOpts {
    /// Maximum outstanding readiness checks. Values below 1 are treated as 1.
    pub concurrency: usize,
    /// Extra attempts per URL after the first failure.
    pub retry_count: u32,
    /// Per-attempt hard timeout in milliseconds.
    pub timeout_ms: u64,
    /// Linear backoff unit in milliseconds.
    pub base_delay_ms: u64,
}

impl Default for PreloadOpts {
    fn default() -> Self {
        Self {
            concurrency: 4,
            retry_count: 2,
            timeout_ms: 8000,
            base_delay_ms: 250,
        }
    }
}

impl PreloadOpts {
    /// Retry policy derived from these options.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            retry_count: self.retry_count,
            timeout: Duration::from_millis(self.timeout_ms),
            base_delay: Duration::from_millis(self.base_delay_ms),
        }
    }
}

/// Progress notifications emitted while the pipeline runs.
#[derive(Debug)]
pub enum PreloadEvent<'a> {
    /// One URL settled (ready, exhausted or cancelled).
    Settled(&'a PreloadTask),
    /// Every URL settled. Emitted exactly once, last.
    Complete(&'a PreloadReport),
}

/// Aggregate result of a preload run. Failures are data, not errors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreloadReport {
    /// Settled tasks in settle order.
    pub tasks: Vec<PreloadTask>,
    /// Worker tasks that panicked instead of settling.
    pub panicked: usize,
}

impl PreloadReport {
    /// URLs that became ready.
    pub fn ready(&self) -> impl Iterator<Item = &PreloadTask> {
        self.tasks.iter().filter(|t| t.is_ready())
    }

    /// URLs that exhausted their retries (or were cancelled).
    pub fn failed(&self) -> impl Iterator<Item = &PreloadTask> {
        self.tasks.iter().filter(|t| !t.is_ready())
    }

    /// Count of ready URLs.
    pub fn ready_count(&self) -> usize {
        self.ready().count()
    }

    /// Count of failed URLs, including panicked workers.
    pub fn failed_count(&self) -> usize {
        self.failed().count() + self.panicked
    }
}

/// Bounded-concurrency asset readiness pipeline.
///
/// Pending URLs wait in a FIFO queue; at most `concurrency` of them are in flight. Whenever one
/// settles the next queued URL is dispatched, and completion is checked after every settle. The
/// run as a whole never fails: a missing preview image must not block playback.
#[derive(Clone)]
pub struct PreloadPipeline {
    loader: Arc<dyn AssetLoader>,
    opts: PreloadOpts,
}

impl PreloadPipeline {
    /// Create a pipeline over `loader`.
    pub fn new(loader: Arc<dyn AssetLoader>, opts: PreloadOpts) -> Self {
        Self { loader, opts }
    }

    /// Options in effect.
    pub fn opts(&self) -> &PreloadOpts {
        &self.opts
    }

    /// Ready every URL; see [`PreloadPipeline::run_with`].
    pub async fn run(
        &self,
        urls: impl IntoIterator<Item = String>,
        cancel: &CancellationToken,
    ) -> PreloadReport {
        self.run_with(urls, cancel, |_| {}).await
    }

    /// Ready every URL, reporting each settle and the final completion to `observer`.
    ///
    /// Empty URLs are skipped. Cancelling `cancel` settles outstanding and queued URLs as
    /// cancelled.
    #[tracing::instrument(skip_all, fields(concurrency = self.opts.concurrency))]
    pub async fn run_with(
        &self,
        urls: impl IntoIterator<Item = String>,
        cancel: &CancellationToken,
        mut observer: impl FnMut(PreloadEvent<'_>),
    ) -> PreloadReport {
        let mut queue: VecDeque<String> = urls.into_iter().filter(|u| !u.is_empty()).collect();
        let concurrency = self.opts.concurrency.max(1);
        let policy = self.opts.policy();
        let mut report = PreloadReport {
            tasks: Vec::with_capacity(queue.len()),
            panicked: 0,
        };

        let mut workers = JoinSet::new();
        let mut active = 0usize;
        loop {
            while active < concurrency {
                let Some(url) = queue.pop_front() else {
                    break;
                };
                let loader = Arc::clone(&self.loader);
                let cancel = cancel.clone();
                workers.spawn(async move { load_with_retry(&*loader, &url, policy, &cancel).await });
                active += 1;
            }

            if queue.is_empty() && active == 0 {
                break;
            }

            let Some(joined) = workers.join_next().await else {
                break;
            };
            active -= 1;
            match joined {
                Ok(task) => {
                    if !task.is_ready() && !task.is_cancelled() {
                        if let Err(e) = &task.outcome {
                            tracing::warn!(
                                url = %task.url,
                                attempts = task.attempts_used,
                                error = %e,
                                "preload exhausted retries"
                            );
                        }
                    }
                    observer(PreloadEvent::Settled(&task));
                    report.tasks.push(task);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "preload worker panicked");
                    report.panicked += 1;
                }
            }
        }

        tracing::debug!(
            ready = report.ready_count(),
            failed = report.failed_count(),
            "preload complete"
        );
        observer(PreloadEvent::Complete(&report));
        report
    }
}

/// One-shot form of [`PreloadPipeline::run_with`].
pub async fn preload_all(
    loader: Arc<dyn AssetLoader>,
    urls: impl IntoIterator<Item = String>,
    opts: PreloadOpts,
    cancel: &CancellationToken,
    observer: impl FnMut(PreloadEvent<'_>),
) -> PreloadReport {
    PreloadPipeline::new(loader, opts)
        .run_with(urls, cancel, observer)
        .await
}

#[cfg(test)]
#[path = "../../tests/unit/assets/preload.rs"]
mod tests;
