use std::sync::Arc;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{
    assets::loader::AssetLoader,
    foundation::error::{ReelError, ReelResult},
    playback::lifecycle::LifecycleManager,
    playback::opts::PlayerOpts,
    render::surface::RenderSurface,
    timeline::model::Schedule,
};

/// Scenes whose media is readied before the clock starts.
const PRIMED_SCENES: usize = 2;

/// Result of one scheduler tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The scheduler is not running; the tick had no effect.
    Idle,
    /// Playback continues with this active scene (`None` in a gap or before the first scene).
    Playing { active: Option<usize> },
    /// This tick passed the end of the timeline and finalized playback.
    Finished,
}

/// Snapshot returned by [`Scheduler::stop`] and available from [`Scheduler::summary`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PlaybackSummary {
    pub active_index: Option<usize>,
    pub elapsed: f64,
    pub fired_events: usize,
    pub running: bool,
}

/// Timeline clock that maps elapsed time to the active scene and drives the lifecycle.
#[derive(Debug)]
pub struct Scheduler {
    schedule: Arc<Schedule>,
    lifecycle: LifecycleManager,
    end_grace: f64,
    running: bool,
    clock_origin: Option<Instant>,
    elapsed: f64,
    active_index: Option<usize>,
    cancel: CancellationToken,
}

impl Scheduler {
    pub fn new(schedule: Arc<Schedule>, loader: Arc<dyn AssetLoader>, opts: &PlayerOpts) -> Self {
        Self {
            lifecycle: LifecycleManager::new(Arc::clone(&schedule), loader, opts),
            schedule,
            end_grace: opts.end_grace().as_secs_f64(),
            running: false,
            clock_origin: None,
            elapsed: 0.0,
            active_index: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn schedule(&self) -> &Arc<Schedule> {
        &self.schedule
    }

    pub fn lifecycle(&self) -> &LifecycleManager {
        &self.lifecycle
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    /// Seconds since the clock origin, as of the last tick.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Token cancelled when the current run stops.
    pub fn run_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn summary(&self) -> PlaybackSummary {
        PlaybackSummary {
            active_index: self.active_index,
            elapsed: self.elapsed,
            fired_events: self.lifecycle.triggers().fired_count(),
            running: self.running,
        }
    }

    /// Begin a run: clear previous state, ready the first scenes' media, then start the clock.
    ///
    /// Returns the clock origin. Fails if a run is already in progress or the surface has no
    /// root to mount scenes under.
    pub async fn start(&mut self, surface: &mut dyn RenderSurface) -> ReelResult<Instant> {
        if self.running {
            return Err(ReelError::playback("playback is already running"));
        }
        if surface.root().is_none() {
            return Err(ReelError::mount(
                "cannot start playback: render surface has no root",
            ));
        }

        self.cancel = CancellationToken::new();
        self.lifecycle.reset(surface, self.cancel.clone());
        self.active_index = None;
        self.elapsed = 0.0;
        self.clock_origin = None;

        self.lifecycle.prime(PRIMED_SCENES).await;

        let origin = Instant::now();
        self.clock_origin = Some(origin);
        self.running = true;
        tracing::info!(scenes = self.schedule.len(), "playback started");
        Ok(origin)
    }

    /// Advance playback to `now`.
    ///
    /// Mount failures are fatal: the run is stopped and its background work cancelled before
    /// the error is returned.
    pub fn tick(
        &mut self,
        surface: &mut dyn RenderSurface,
        now: Instant,
    ) -> ReelResult<TickOutcome> {
        if !self.running {
            return Ok(TickOutcome::Idle);
        }
        match self.advance(surface, now) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::warn!(error = %e, "playback aborted");
                self.halt();
                Err(e)
            }
        }
    }

    /// Stop the run. With `finalize`, the terminal scene is forced into its fully revealed state.
    ///
    /// Stopping a stopped scheduler only re-reports its state.
    pub fn stop(
        &mut self,
        surface: &mut dyn RenderSurface,
        finalize: bool,
    ) -> ReelResult<PlaybackSummary> {
        if !self.running {
            return Ok(self.summary());
        }
        self.halt();

        if finalize {
            if let Some(last) = self.schedule.terminal_index() {
                self.lifecycle.finalize(surface, last)?;
                self.active_index = Some(last);
            }
        }
        let summary = self.summary();
        tracing::info!(
            finalize,
            active = ?summary.active_index,
            fired = summary.fired_events,
            "playback stopped"
        );
        Ok(summary)
    }

    fn halt(&mut self) {
        self.running = false;
        self.cancel.cancel();
    }

    fn advance(
        &mut self,
        surface: &mut dyn RenderSurface,
        now: Instant,
    ) -> ReelResult<TickOutcome> {
        let origin = self.clock_origin.unwrap_or(now);
        self.elapsed = now.saturating_duration_since(origin).as_secs_f64();

        self.lifecycle.poll(surface, now)?;

        let next = self.schedule.active_scene_index_at(self.elapsed);
        if next != self.active_index {
            if let Some(prev) = self.active_index {
                self.lifecycle.exit(surface, prev, now);
            }
            if let Some(idx) = next {
                self.lifecycle.enter(surface, idx)?;
            }
            tracing::debug!(from = ?self.active_index, to = ?next, elapsed = self.elapsed, "scene change");
            self.active_index = next;
        }

        if let Some(idx) = self.active_index {
            if let Some(scene) = self.schedule.scene(idx) {
                let local = scene.span.local(self.elapsed);
                self.lifecycle.tick_events(surface, idx, local);
            }
        }

        if self.elapsed > self.schedule.timeline_end() + self.end_grace {
            self.stop(surface, true)?;
            return Ok(TickOutcome::Finished);
        }
        Ok(TickOutcome::Playing {
            active: self.active_index,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/scheduler.rs"]
mod tests;
