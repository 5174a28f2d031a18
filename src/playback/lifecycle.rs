use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{
    assets::loader::AssetLoader,
    assets::warm::{AssetWarmer, WarmState},
    effects::transitions::{Transition, TransitionEdge},
    foundation::error::{ReelError, ReelResult},
    playback::opts::PlayerOpts,
    playback::triggers::{EventKind, TriggerKey, TriggerTracker},
    render::surface::{NodeId, NodeKind, RenderSurface},
    timeline::model::{Schedule, Scene},
};

/// Class marking the scene that currently owns the viewport.
pub const ACTIVE_CLASS: &str = "is-active";
/// Class marking a revealed text or callout node.
pub const VISIBLE_CLASS: &str = "is-visible";

/// Where a mounted scene is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScenePhase {
    /// Structure built, media still loading.
    Loading,
    /// Media settled (loaded or failed); not yet entered.
    Ready,
    /// Entered and owning the viewport.
    Active,
    /// Exit transition playing; the nodes go away at `remove_at`.
    Exiting { remove_at: Instant },
}

/// Render nodes and state of one scene that exists on the surface.
#[derive(Clone, Debug, PartialEq)]
pub struct MountedScene {
    pub index: usize,
    pub root: NodeId,
    pub media: NodeId,
    pub credit: Option<NodeId>,
    pub text: Vec<NodeId>,
    pub callouts: Vec<NodeId>,
    pub phase: ScenePhase,
    src: String,
    media_settled: bool,
    enter_pending: bool,
    transition_class: Option<String>,
}

impl MountedScene {
    /// Return `true` while an `enter` waits for the media to settle.
    pub fn is_enter_pending(&self) -> bool {
        self.enter_pending
    }

    fn event_node(&self, kind: EventKind, index: usize) -> Option<NodeId> {
        match kind {
            EventKind::Text => self.text.get(index).copied(),
            EventKind::Callout => self.callouts.get(index).copied(),
        }
    }
}

/// Owner of every scene node on the render surface.
///
/// The scheduler only asks for transitions (`enter`, `exit`, `finalize`); this type decides when
/// they can happen. Media readiness arrives asynchronously through the [`AssetWarmer`] and is
/// applied in [`LifecycleManager::poll`], so none of these calls wait on IO.
#[derive(Debug)]
pub struct LifecycleManager {
    schedule: Arc<Schedule>,
    mounted: BTreeMap<usize, MountedScene>,
    warmer: AssetWarmer,
    triggers: TriggerTracker,
    exit_grace: Option<Duration>,
    warm_ahead: usize,
    prerender_next: bool,
    cancel: CancellationToken,
}

impl LifecycleManager {
    pub fn new(schedule: Arc<Schedule>, loader: Arc<dyn AssetLoader>, opts: &PlayerOpts) -> Self {
        Self {
            schedule,
            mounted: BTreeMap::new(),
            warmer: AssetWarmer::new(loader, opts.preload.policy()),
            triggers: TriggerTracker::new(),
            exit_grace: opts.exit_grace_override(),
            warm_ahead: opts.warm_ahead,
            prerender_next: opts.prerender_next,
            cancel: CancellationToken::new(),
        }
    }

    pub fn schedule(&self) -> &Arc<Schedule> {
        &self.schedule
    }

    pub fn mounted(&self, index: usize) -> Option<&MountedScene> {
        self.mounted.get(&index)
    }

    /// Indices of scenes currently on the surface, ascending.
    pub fn mounted_indices(&self) -> Vec<usize> {
        self.mounted.keys().copied().collect()
    }

    pub fn triggers(&self) -> &TriggerTracker {
        &self.triggers
    }

    pub fn warmer(&self) -> &AssetWarmer {
        &self.warmer
    }

    /// Prepare for a new run: drop every mounted scene and fired trigger, forget outstanding
    /// warm requests, and adopt `cancel` for the run's background work.
    pub fn reset(&mut self, surface: &mut dyn RenderSurface, cancel: CancellationToken) {
        for (_, m) in std::mem::take(&mut self.mounted) {
            surface.remove_node(m.root);
        }
        self.triggers.reset();
        self.warmer.reset();
        self.cancel = cancel;
    }

    /// Ready the media of the first `count` scenes, waiting for each to settle.
    pub async fn prime(&mut self, count: usize) {
        let schedule = Arc::clone(&self.schedule);
        let urls = schedule.scenes.iter().take(count).map(|s| s.media.src.as_str());
        let cancel = self.cancel.clone();
        self.warmer.prime(urls, &cancel).await;
    }

    /// Build the scene's structure on the surface and start waiting for its media.
    ///
    /// Idempotent: an already mounted scene is returned unchanged.
    pub fn mount(
        &mut self,
        surface: &mut dyn RenderSurface,
        index: usize,
    ) -> ReelResult<&MountedScene> {
        if !self.mounted.contains_key(&index) {
            let mut m = self.build(surface, index)?;
            let state = self.warmer.request(&m.src, &self.cancel);
            if state.is_settled() {
                self.settle_media(surface, &mut m, state);
            }
            tracing::debug!(scene = index, phase = ?m.phase, "scene mounted");
            self.mounted.insert(index, m);
        }
        self.mounted
            .get(&index)
            .ok_or_else(|| ReelError::mount(format!("scene {index} vanished while mounting")))
    }

    /// Make `index` the visible scene. The enter completes once the media has settled; until
    /// then the scene's sub-events are deferred.
    pub fn enter(&mut self, surface: &mut dyn RenderSurface, index: usize) -> ReelResult<()> {
        self.mount(surface, index)?;
        if let Some(m) = self.mounted.get_mut(&index) {
            if let ScenePhase::Exiting { .. } = m.phase {
                if let Some(class) = m.transition_class.take() {
                    surface.set_class(m.root, &class, false);
                }
                m.phase = if m.media_settled {
                    ScenePhase::Ready
                } else {
                    ScenePhase::Loading
                };
            }
            m.enter_pending = true;
        }
        self.complete_enter(surface, index)
    }

    /// Start the exit transition of `index` and schedule its removal after the grace period.
    ///
    /// A scene still exiting from an earlier change is removed immediately, so at most one scene
    /// is ever exiting.
    pub fn exit(&mut self, surface: &mut dyn RenderSurface, index: usize, now: Instant) {
        let stale: Vec<usize> = self
            .mounted
            .iter()
            .filter(|(i, m)| **i != index && matches!(m.phase, ScenePhase::Exiting { .. }))
            .map(|(i, _)| *i)
            .collect();
        for i in stale {
            self.remove(surface, i);
        }

        let Some(scene) = self.schedule.scene(index) else {
            return;
        };
        let transition = Transition::new(scene.transition_out, TransitionEdge::Out, self.exit_grace);
        let Some(m) = self.mounted.get_mut(&index) else {
            return;
        };

        if let Some(class) = m.transition_class.take() {
            surface.set_class(m.root, &class, false);
        }
        surface.set_class(m.root, ACTIVE_CLASS, false);
        let class = transition.class_name();
        surface.set_class(m.root, &class, true);
        surface.set_style(m.root, "animation-duration", &transition.duration_style());
        m.transition_class = Some(class);
        m.enter_pending = false;
        m.phase = ScenePhase::Exiting {
            remove_at: now + transition.duration,
        };
        tracing::debug!(scene = index, grace = ?transition.duration, "scene exiting");

        if transition.duration.is_zero() {
            self.remove(surface, index);
        }
    }

    /// Take the scene's nodes off the surface. Removing an unmounted scene is a no-op.
    pub fn remove(&mut self, surface: &mut dyn RenderSurface, index: usize) {
        if let Some(m) = self.mounted.remove(&index) {
            surface.remove_node(m.root);
            tracing::debug!(scene = index, "scene removed");
        }
    }

    /// Apply readiness results, complete pending enters and reap expired exits.
    pub fn poll(&mut self, surface: &mut dyn RenderSurface, now: Instant) -> ReelResult<()> {
        for (url, state) in self.warmer.drain() {
            let waiting: Vec<usize> = self
                .mounted
                .iter()
                .filter(|(_, m)| !m.media_settled && m.src == url)
                .map(|(i, _)| *i)
                .collect();
            for i in waiting {
                if let Some(mut m) = self.mounted.remove(&i) {
                    self.settle_media(surface, &mut m, state);
                    self.mounted.insert(i, m);
                }
            }
        }

        let pending: Vec<usize> = self
            .mounted
            .iter()
            .filter(|(_, m)| m.enter_pending && m.media_settled)
            .map(|(i, _)| *i)
            .collect();
        for i in pending {
            self.complete_enter(surface, i)?;
        }

        let expired: Vec<usize> = self
            .mounted
            .iter()
            .filter(|(_, m)| matches!(m.phase, ScenePhase::Exiting { remove_at } if remove_at <= now))
            .map(|(i, _)| *i)
            .collect();
        for i in expired {
            self.remove(surface, i);
        }
        Ok(())
    }

    /// Reveal the due sub-events of the active scene. Returns the newly fired keys.
    ///
    /// Nothing fires while the scene's enter is still pending.
    pub fn tick_events(
        &mut self,
        surface: &mut dyn RenderSurface,
        index: usize,
        local_offset: f64,
    ) -> Vec<TriggerKey> {
        let Some(m) = self.mounted.get(&index) else {
            return Vec::new();
        };
        if m.phase != ScenePhase::Active {
            return Vec::new();
        }
        let Some(scene) = self.schedule.scene(index) else {
            return Vec::new();
        };
        let fired = self.triggers.fire_due(index, scene, local_offset);
        for key in &fired {
            reveal(surface, m, scene, *key);
            tracing::debug!(scene = index, kind = ?key.kind, event = key.index, local_offset, "event fired");
        }
        fired
    }

    /// Force the terminal state of `index`: structure present, every other scene removed, every
    /// sub-event visible, no transitions and no readiness wait.
    pub fn finalize(&mut self, surface: &mut dyn RenderSurface, index: usize) -> ReelResult<()> {
        let others: Vec<usize> = self.mounted.keys().copied().filter(|i| *i != index).collect();
        for i in others {
            self.remove(surface, i);
        }

        if !self.mounted.contains_key(&index) {
            let mut m = self.build(surface, index)?;
            if let Some(state) = self.warmer.state(&m.src).filter(|s| s.is_settled()) {
                self.settle_media(surface, &mut m, state);
            }
            self.mounted.insert(index, m);
        }
        let Some(scene) = self.schedule.scene(index) else {
            return Ok(());
        };
        let Some(m) = self.mounted.get_mut(&index) else {
            return Ok(());
        };

        if let Some(class) = m.transition_class.take() {
            surface.set_class(m.root, &class, false);
        }
        surface.set_class(m.root, ACTIVE_CLASS, true);
        m.enter_pending = false;
        m.phase = ScenePhase::Active;

        self.triggers.mark_all(index, scene);
        for key in self.triggers.fired().filter(|k| k.scene == index) {
            reveal(surface, m, scene, key);
        }
        tracing::debug!(scene = index, "scene finalized");
        Ok(())
    }

    fn build(&self, surface: &mut dyn RenderSurface, index: usize) -> ReelResult<MountedScene> {
        let Some(parent) = surface.root() else {
            return Err(ReelError::mount(format!(
                "cannot mount scene {index}: render surface has no root"
            )));
        };
        let scene = self
            .schedule
            .scene(index)
            .ok_or_else(|| ReelError::mount(format!("scene {index} is out of range")))?;

        let root = surface.create_node(NodeKind::Scene);
        surface.set_class(root, "scene", true);
        surface.set_attr(root, "data-scene", &index.to_string());

        let media = surface.create_node(NodeKind::Media);
        surface.set_attr(media, "src", &scene.media.src);
        surface.set_class(media, &format!("kb-{}", scene.media.kenburns.name()), true);
        attach(surface, root, media)?;

        let credit = match &scene.media.credit {
            Some(text) => {
                let n = surface.create_node(NodeKind::Credit);
                surface.set_content(n, text);
                attach(surface, root, n)?;
                Some(n)
            }
            None => None,
        };

        let mut text = Vec::with_capacity(scene.text_events.len());
        for ev in &scene.text_events {
            let n = surface.create_node(NodeKind::Text);
            surface.set_class(n, &format!("role-{}", ev.role), true);
            surface.set_content(n, &ev.html);
            attach(surface, root, n)?;
            text.push(n);
        }

        let mut callouts = Vec::with_capacity(scene.callout_events.len());
        for ev in &scene.callout_events {
            let n = surface.create_node(NodeKind::Callout);
            let (left, top) = ev.pos.to_percent();
            surface.set_style(n, "left", &left);
            surface.set_style(n, "top", &top);
            surface.set_content(n, &ev.html);
            attach(surface, root, n)?;
            callouts.push(n);
        }

        if !surface.append_child(parent, root) {
            surface.remove_node(root);
            return Err(ReelError::mount(format!(
                "cannot mount scene {index}: render root is gone"
            )));
        }

        Ok(MountedScene {
            index,
            root,
            media,
            credit,
            text,
            callouts,
            phase: ScenePhase::Loading,
            src: scene.media.src.clone(),
            media_settled: false,
            enter_pending: false,
            transition_class: None,
        })
    }

    fn settle_media(&self, surface: &mut dyn RenderSurface, m: &mut MountedScene, state: WarmState) {
        m.media_settled = true;
        if m.phase == ScenePhase::Loading {
            m.phase = ScenePhase::Ready;
        }
        if state == WarmState::Failed {
            surface.set_class(m.media, "media-failed", true);
            tracing::warn!(scene = m.index, url = %m.src, "media failed to load, showing scene without it");
        }
    }

    fn complete_enter(&mut self, surface: &mut dyn RenderSurface, index: usize) -> ReelResult<()> {
        let Some(scene) = self.schedule.scene(index) else {
            return Ok(());
        };
        let Some(m) = self.mounted.get_mut(&index) else {
            return Ok(());
        };
        if !m.enter_pending || !m.media_settled {
            return Ok(());
        }

        self.triggers.clear_scene(index);

        let transition = Transition::new(scene.transition_in, TransitionEdge::In, None);
        let class = transition.class_name();
        surface.set_class(m.root, &class, true);
        surface.set_style(m.root, "animation-duration", &transition.duration_style());
        surface.set_class(m.root, ACTIVE_CLASS, true);
        for (prop, value) in scene.media.kenburns.motion(scene.duration()).style_props() {
            surface.set_style(m.media, prop, &value);
        }
        m.transition_class = Some(class);
        m.enter_pending = false;
        m.phase = ScenePhase::Active;
        tracing::debug!(scene = index, "scene entered");

        self.after_enter(surface, index)
    }

    fn after_enter(&mut self, surface: &mut dyn RenderSurface, index: usize) -> ReelResult<()> {
        let schedule = Arc::clone(&self.schedule);
        let upcoming = schedule
            .scenes
            .iter()
            .skip(index + 1)
            .take(self.warm_ahead)
            .map(|s: &Scene| s.media.src.as_str());
        let cancel = self.cancel.clone();
        self.warmer.warm_ahead(upcoming, &cancel);

        if self.prerender_next && index + 1 < schedule.len() {
            self.mount(surface, index + 1)?;
        }
        Ok(())
    }
}

fn attach(surface: &mut dyn RenderSurface, parent: NodeId, child: NodeId) -> ReelResult<()> {
    if surface.append_child(parent, child) {
        Ok(())
    } else {
        Err(ReelError::mount("scene node vanished while building"))
    }
}

fn reveal(surface: &mut dyn RenderSurface, m: &MountedScene, scene: &Scene, key: TriggerKey) {
    let Some(node) = m.event_node(key.kind, key.index) else {
        return;
    };
    surface.set_class(node, VISIBLE_CLASS, true);
    if key.kind == EventKind::Text {
        if let Some(ev) = scene.text_events.get(key.index) {
            for fx in &ev.effects {
                surface.set_class(node, &format!("fx-{fx}"), true);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/lifecycle.rs"]
mod tests;
