use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::assets::loader::AssetLoader;
use crate::assets::retry::{PreloadTask, RetryPolicy, load_with_retry};

/// Readiness of one URL as seen by the warmer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WarmState {
    /// A readiness task is outstanding.
    Pending,
    /// The asset is loaded (empty URLs are always ready).
    Ready,
    /// Retries were exhausted. Consumers proceed without the asset.
    Failed,
}

impl WarmState {
    /// Return `true` once the URL no longer has outstanding work.
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Ahead-of-time asset warmer with a readiness channel.
///
/// Requests spawn one background task per URL, using the retry primitive without a queue. Results
/// come back over an unbounded channel and are applied by [`AssetWarmer::drain`], so the caller's
/// control loop never awaits asset work. Settled URLs are cached: a later request for a ready URL
/// completes immediately.
pub struct AssetWarmer {
    loader: Arc<dyn AssetLoader>,
    policy: RetryPolicy,
    states: HashMap<String, WarmState>,
    generation: u64,
    tx: mpsc::UnboundedSender<(u64, PreloadTask)>,
    rx: mpsc::UnboundedReceiver<(u64, PreloadTask)>,
}

impl std::fmt::Debug for AssetWarmer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetWarmer")
            .field("policy", &self.policy)
            .field("states", &self.states)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl AssetWarmer {
    pub fn new(loader: Arc<dyn AssetLoader>, policy: RetryPolicy) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            loader,
            policy,
            states: HashMap::new(),
            generation: 0,
            tx,
            rx,
        }
    }

    pub fn state(&self, url: &str) -> Option<WarmState> {
        if url.is_empty() {
            return Some(WarmState::Ready);
        }
        self.states.get(url).copied()
    }

    /// Ensure a readiness task exists for `url` and return its current state.
    ///
    /// Failed URLs are not retried; the failure already consumed the retry budget.
    pub fn request(&mut self, url: &str, cancel: &CancellationToken) -> WarmState {
        if let Some(state) = self.state(url) {
            return state;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(url, "no async runtime available, skipping asset warm");
            self.states.insert(url.to_string(), WarmState::Failed);
            return WarmState::Failed;
        };

        let loader = Arc::clone(&self.loader);
        let policy = self.policy;
        let cancel = cancel.clone();
        let tx = self.tx.clone();
        let generation = self.generation;
        let owned = url.to_string();
        handle.spawn(async move {
            let task = load_with_retry(&*loader, &owned, policy, &cancel).await;
            // The receiver only goes away with the warmer itself.
            let _ = tx.send((generation, task));
        });

        self.states.insert(url.to_string(), WarmState::Pending);
        WarmState::Pending
    }

    /// Request every URL in `urls`; returns how many new tasks were spawned.
    pub fn warm_ahead<'a>(
        &mut self,
        urls: impl IntoIterator<Item = &'a str>,
        cancel: &CancellationToken,
    ) -> usize {
        let mut spawned = 0;
        for url in urls {
            if self.state(url).is_none() {
                self.request(url, cancel);
                spawned += 1;
            }
        }
        spawned
    }

    /// Ready `urls` and wait until each settles.
    ///
    /// Used before the playback clock starts; settled URLs are skipped.
    pub async fn prime<'a>(
        &mut self,
        urls: impl IntoIterator<Item = &'a str>,
        cancel: &CancellationToken,
    ) {
        let mut workers = JoinSet::new();
        for url in urls {
            if self.state(url).is_some_and(WarmState::is_settled) {
                continue;
            }
            let loader = Arc::clone(&self.loader);
            let policy = self.policy;
            let cancel = cancel.clone();
            let url = url.to_string();
            workers.spawn(async move { load_with_retry(&*loader, &url, policy, &cancel).await });
        }
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(task) => {
                    self.record(task);
                }
                Err(e) => tracing::warn!(error = %e, "asset warm worker panicked"),
            }
        }
    }

    /// Apply every readiness result received since the last drain.
    ///
    /// Returns the URLs that settled, with their new state. Results from before the last
    /// [`AssetWarmer::reset`] are discarded.
    pub fn drain(&mut self) -> Vec<(String, WarmState)> {
        let mut settled = Vec::new();
        while let Ok((generation, task)) = self.rx.try_recv() {
            if generation != self.generation {
                continue;
            }
            if let Some(entry) = self.record(task) {
                settled.push(entry);
            }
        }
        settled
    }

    fn record(&mut self, task: PreloadTask) -> Option<(String, WarmState)> {
        if task.is_cancelled() {
            return None;
        }
        let state = match &task.outcome {
            Ok(()) => WarmState::Ready,
            Err(e) => {
                tracing::warn!(url = %task.url, attempts = task.attempts_used, error = %e, "asset warm failed");
                WarmState::Failed
            }
        };
        self.states.insert(task.url.clone(), state);
        Some((task.url, state))
    }

    /// Forget outstanding requests; keep settled results for the next run.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.states.retain(|_, s| s.is_settled());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/warm.rs"]
mod tests;
