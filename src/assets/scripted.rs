use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::assets::loader::{AssetError, AssetLoader};

/// Scripted behavior for one URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Script {
    /// Succeed immediately.
    Ready,
    /// Succeed after sleeping on the tokio clock.
    ReadyAfter(Duration),
    /// Fail the first `n` attempts with a source error, then succeed.
    FailTimes(u32),
    /// Fail every attempt with a source error.
    AlwaysFail,
    /// Never resolve; only a timeout or cancellation ends the attempt.
    Hang,
}

/// Deterministic [`AssetLoader`] test double.
///
/// Behavior is scripted per URL, with a default for unlisted URLs. The loader records attempt
/// counts, request order and peak concurrency so tests can assert on scheduling.
#[derive(Debug)]
pub struct ScriptedLoader {
    scripts: HashMap<String, Script>,
    default: Script,
    attempts: Mutex<HashMap<String, u32>>,
    order: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl Default for ScriptedLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedLoader {
    /// Loader where every URL is immediately ready.
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            default: Script::Ready,
            attempts: Mutex::new(HashMap::new()),
            order: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Script the behavior of one URL.
    pub fn with(mut self, url: impl Into<String>, script: Script) -> Self {
        self.scripts.insert(url.into(), script);
        self
    }

    /// Behavior for URLs without their own script.
    pub fn with_default(mut self, script: Script) -> Self {
        self.default = script;
        self
    }

    /// Attempts made so far for `url`.
    pub fn attempts(&self, url: &str) -> u32 {
        self.attempts
            .lock()
            .map(|m| m.get(url).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Attempts made so far across all URLs.
    pub fn total_attempts(&self) -> u32 {
        self.attempts
            .lock()
            .map(|m| m.values().sum())
            .unwrap_or(0)
    }

    /// URLs in the order their first attempt started.
    pub fn request_order(&self) -> Vec<String> {
        self.order.lock().map(|o| o.clone()).unwrap_or_default()
    }

    /// Highest number of simultaneously outstanding attempts observed.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn begin(&self, url: &str) -> u32 {
        let attempt = match self.attempts.lock() {
            Ok(mut m) => {
                let n = m.entry(url.to_string()).or_insert(0);
                *n += 1;
                *n
            }
            Err(_) => 1,
        };
        if attempt == 1 {
            if let Ok(mut o) = self.order.lock() {
                o.push(url.to_string());
            }
        }
        attempt
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl AssetLoader for ScriptedLoader {
    async fn load(&self, url: &str) -> Result<(), AssetError> {
        let attempt = self.begin(url);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let script = self.scripts.get(url).unwrap_or(&self.default).clone();
        match script {
            Script::Ready => Ok(()),
            Script::ReadyAfter(d) => {
                tokio::time::sleep(d).await;
                Ok(())
            }
            Script::FailTimes(n) if attempt <= n => {
                Err(AssetError::source(url, format!("scripted failure {attempt}/{n}")))
            }
            Script::FailTimes(_) => Ok(()),
            Script::AlwaysFail => Err(AssetError::source(url, "scripted failure")),
            Script::Hang => std::future::pending().await,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/scripted.rs"]
mod tests;
