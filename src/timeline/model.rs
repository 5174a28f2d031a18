use std::collections::BTreeSet;

use crate::{
    effects::kenburns::KenBurnsPreset,
    effects::transitions::TransitionKind,
    foundation::core::{NormPoint, TimeSpan},
};

/// Color theme requested by the manifest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme (default).
    #[default]
    Light,
    /// Dark theme.
    Dark,
}

/// Normalized, immutable playback schedule.
///
/// Produced by [`crate::normalize`]; scenes are index-addressed and never reordered.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Schedule {
    /// Requested theme.
    pub theme: Theme,
    /// Advisory total duration in seconds. The stop condition uses the last scene instead.
    pub total_duration: f64,
    /// Ordered scenes.
    pub scenes: Vec<Scene>,
}

impl Schedule {
    /// Index of the scene whose span contains `t`, or `None` before the first scene or in a gap.
    ///
    /// Spans may overlap when the manifest sets explicit start times; the lowest matching index
    /// wins.
    pub fn active_scene_index_at(&self, t: f64) -> Option<usize> {
        self.scenes.iter().position(|s| s.span.contains(t))
    }

    /// Number of scenes.
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Return `true` when the schedule has no scenes.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Scene by index.
    pub fn scene(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    /// Index of the terminal scene (the last one).
    pub fn terminal_index(&self) -> Option<usize> {
        self.scenes.len().checked_sub(1)
    }

    /// End of the last scene's span. Zero for an empty schedule.
    pub fn timeline_end(&self) -> f64 {
        self.scenes.last().map(|s| s.span.end()).unwrap_or(0.0)
    }

    /// Non-empty media sources of all scenes, in scene order.
    pub fn media_urls(&self) -> Vec<String> {
        self.scenes
            .iter()
            .filter(|s| !s.media.src.is_empty())
            .map(|s| s.media.src.clone())
            .collect()
    }
}

/// One time-boxed unit of playback content.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Scene {
    /// Absolute timeline span `[start_time, start_time + duration)`.
    pub span: TimeSpan,
    /// Photo shown for the whole scene.
    pub media: MediaSpec,
    /// Timed text reveals, in declared order.
    pub text_events: Vec<TextEvent>,
    /// Timed callout reveals, in declared order.
    pub callout_events: Vec<CalloutEvent>,
    /// Transition played when the scene becomes active.
    pub transition_in: TransitionKind,
    /// Transition played when the scene goes away.
    pub transition_out: TransitionKind,
}

impl Scene {
    /// Absolute start time in seconds.
    pub fn start_time(&self) -> f64 {
        self.span.start
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.span.duration
    }

    /// Number of text plus callout events.
    pub fn event_count(&self) -> usize {
        self.text_events.len() + self.callout_events.len()
    }
}

/// Scene photo.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct MediaSpec {
    /// Resolved absolute URL or path; empty when the scene has no photo.
    pub src: String,
    /// Optional credit line.
    pub credit: Option<String>,
    /// Pan/zoom preset.
    pub kenburns: KenBurnsPreset,
}

/// Text reveal scheduled inside a scene.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextEvent {
    /// Presentation role (`title`, `body`, `caption`, ...).
    pub role: String,
    /// Markup content.
    pub html: String,
    /// Offset in seconds from the scene start.
    pub at: f64,
    /// Effect tags applied on reveal.
    pub effects: BTreeSet<String>,
}

/// Positioned callout reveal scheduled inside a scene.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CalloutEvent {
    /// Markup content.
    pub html: String,
    /// Offset in seconds from the scene start.
    pub at: f64,
    /// Position in normalized viewport coordinates.
    pub pos: NormPoint,
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/model.rs"]
mod tests;
