use std::collections::BTreeSet;

use crate::timeline::model::Scene;

/// Which event list of a scene a trigger refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Text,
    Callout,
}

/// Identity of one timed sub-event: scene index, event list, position in that list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct TriggerKey {
    pub scene: usize,
    pub kind: EventKind,
    pub index: usize,
}

impl TriggerKey {
    pub fn text(scene: usize, index: usize) -> Self {
        Self {
            scene,
            kind: EventKind::Text,
            index,
        }
    }

    pub fn callout(scene: usize, index: usize) -> Self {
        Self {
            scene,
            kind: EventKind::Callout,
            index,
        }
    }
}

/// Fired-set of sub-events for the current run.
///
/// A key fires at most once until its scene is cleared; there is no other way to un-fire.
#[derive(Clone, Debug, Default)]
pub struct TriggerTracker {
    fired: BTreeSet<TriggerKey>,
}

impl TriggerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fired(&self, key: TriggerKey) -> bool {
        self.fired.contains(&key)
    }

    pub fn fired_count(&self) -> usize {
        self.fired.len()
    }

    /// Fired keys in key order.
    pub fn fired(&self) -> impl Iterator<Item = TriggerKey> + '_ {
        self.fired.iter().copied()
    }

    /// Forget every key of `scene`, leaving other scenes untouched.
    pub fn clear_scene(&mut self, scene: usize) {
        self.fired.retain(|k| k.scene != scene);
    }

    /// Forget everything.
    pub fn reset(&mut self) {
        self.fired.clear();
    }

    /// Fire every not-yet-fired event of `scene` whose offset is at or before `local_offset`.
    ///
    /// Text events are walked before callouts, each list in declared order; the returned keys
    /// follow that order.
    pub fn fire_due(&mut self, index: usize, scene: &Scene, local_offset: f64) -> Vec<TriggerKey> {
        let text = scene
            .text_events
            .iter()
            .enumerate()
            .filter(|(_, e)| local_offset >= e.at)
            .map(|(i, _)| TriggerKey::text(index, i));
        let callouts = scene
            .callout_events
            .iter()
            .enumerate()
            .filter(|(_, e)| local_offset >= e.at)
            .map(|(i, _)| TriggerKey::callout(index, i));

        text.chain(callouts)
            .filter(|k| self.fired.insert(*k))
            .collect()
    }

    /// Fire every event of `scene` regardless of time. Returns the keys that were not yet fired.
    pub fn mark_all(&mut self, index: usize, scene: &Scene) -> Vec<TriggerKey> {
        self.fire_due(index, scene, f64::INFINITY)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/triggers.rs"]
mod tests;
