use std::sync::Arc;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    assets::loader::AssetLoader,
    foundation::error::ReelResult,
    playback::lifecycle::LifecycleManager,
    playback::opts::PlayerOpts,
    playback::scheduler::{PlaybackSummary, Scheduler, TickOutcome},
    render::memory::MemorySurface,
    render::surface::RenderSurface,
    timeline::model::Schedule,
};

/// Public playback handle: one schedule, one render surface, one asset loader.
///
/// Instances share nothing, so several players can run side by side. Hosts either call
/// [`Player::tick`] from their own frame loop or hand control to [`Player::run`].
///
/// ```no_run
/// # async fn demo(schedule: storyreel::Schedule) -> storyreel::ReelResult<()> {
/// use std::sync::Arc;
/// use storyreel::{FsAssetLoader, MemorySurface, Player, PlayerOpts};
/// use tokio_util::sync::CancellationToken;
///
/// let loader = Arc::new(FsAssetLoader::new("."));
/// let mut player = Player::new(schedule, loader, MemorySurface::new(), PlayerOpts::default());
/// let summary = player.run(&CancellationToken::new()).await?;
/// println!("ended on scene {:?}", summary.active_index);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Player<S: RenderSurface = MemorySurface> {
    scheduler: Scheduler,
    surface: S,
    opts: PlayerOpts,
}

impl<S: RenderSurface> Player<S> {
    pub fn new(
        schedule: impl Into<Arc<Schedule>>,
        loader: Arc<dyn AssetLoader>,
        surface: S,
        opts: PlayerOpts,
    ) -> Self {
        Self {
            scheduler: Scheduler::new(schedule.into(), loader, &opts),
            surface,
            opts,
        }
    }

    /// Start playback; see [`Scheduler::start`]. Returns the clock origin.
    pub async fn start(&mut self) -> ReelResult<Instant> {
        self.scheduler.start(&mut self.surface).await
    }

    pub fn tick(&mut self, now: Instant) -> ReelResult<TickOutcome> {
        self.scheduler.tick(&mut self.surface, now)
    }

    pub fn stop(&mut self, finalize: bool) -> ReelResult<PlaybackSummary> {
        self.scheduler.stop(&mut self.surface, finalize)
    }

    /// Drive playback from a tokio interval until the timeline ends or `cancel` fires.
    ///
    /// Starts the player first if needed. Cancellation stops without finalizing.
    pub async fn run(&mut self, cancel: &CancellationToken) -> ReelResult<PlaybackSummary> {
        if !self.scheduler.is_running() {
            self.start().await?;
        }

        let mut interval = tokio::time::interval(self.opts.tick_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("playback cancelled by host");
                    return self.stop(false);
                }
                at = interval.tick() => {
                    match self.tick(at)? {
                        TickOutcome::Playing { .. } => {}
                        TickOutcome::Finished | TickOutcome::Idle => break,
                    }
                }
            }
        }
        Ok(self.scheduler.summary())
    }

    pub fn active_index(&self) -> Option<usize> {
        self.scheduler.active_index()
    }

    pub fn elapsed(&self) -> f64 {
        self.scheduler.elapsed()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn summary(&self) -> PlaybackSummary {
        self.scheduler.summary()
    }

    pub fn schedule(&self) -> &Arc<Schedule> {
        self.scheduler.schedule()
    }

    pub fn lifecycle(&self) -> &LifecycleManager {
        self.scheduler.lifecycle()
    }

    pub fn opts(&self) -> &PlayerOpts {
        &self.opts
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable surface access for hosts. Scene nodes belong to the player; editing them while
    /// playback runs is at the host's own risk.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/player.rs"]
mod tests;
