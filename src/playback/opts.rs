use std::time::Duration;

use crate::{
    assets::preload::PreloadOpts,
    foundation::error::{ReelError, ReelResult},
};

/// Host-tunable playback settings.
///
/// Every field has a default, so a JSON object naming only the fields to change is a valid
/// configuration.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlayerOpts {
    /// Period of the driver's tick interval, in milliseconds.
    pub tick_ms: u64,
    /// How long past the end of the last scene playback keeps ticking before it finalizes.
    pub end_grace_ms: u64,
    /// Number of upcoming scenes whose media is warmed when a scene enters.
    pub warm_ahead: usize,
    /// Build the next scene's structure as soon as the current one enters.
    pub prerender_next: bool,
    /// Fixed exit grace. `None` uses each transition's nominal duration.
    pub exit_grace_ms: Option<u64>,
    /// Preload pipeline and retry settings; the retry part also applies to warm-ahead.
    pub preload: PreloadOpts,
}

impl Default for PlayerOpts {
    fn default() -> Self {
        Self {
            tick_ms: 16,
            end_grace_ms: 250,
            warm_ahead: 2,
            prerender_next: true,
            exit_grace_ms: None,
            preload: PreloadOpts::default(),
        }
    }
}

impl PlayerOpts {
    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        serde_json::from_str(s).map_err(|e| ReelError::serde(format!("invalid player options: {e}")))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn end_grace(&self) -> Duration {
        Duration::from_millis(self.end_grace_ms)
    }

    pub fn exit_grace_override(&self) -> Option<Duration> {
        self.exit_grace_ms.map(Duration::from_millis)
    }

    /// Options with zero exit grace, so exits are removed on the tick they start.
    pub fn with_instant_exits(mut self) -> Self {
        self.exit_grace_ms = Some(0);
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/opts.rs"]
mod tests;
