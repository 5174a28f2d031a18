use std::time::Duration;

use crate::foundation::error::{ReelError, ReelResult};

/// Scene transition styles understood by the render layer.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    /// Opacity crossfade between outgoing and incoming scenes.
    #[default]
    Crossfade,
    /// Horizontal swipe.
    Swipe,
    /// Scale-in / scale-out.
    Zoom,
    /// Bright sweep across the viewport.
    LightWipe,
}

impl TransitionKind {
    /// Canonical kebab-case name, also used as the CSS class suffix.
    pub fn name(self) -> &'static str {
        match self {
            Self::Crossfade => "crossfade",
            Self::Swipe => "swipe",
            Self::Zoom => "zoom",
            Self::LightWipe => "light-wipe",
        }
    }

    /// Nominal animation length of this transition.
    pub fn nominal_duration(self) -> Duration {
        match self {
            Self::Crossfade => Duration::from_millis(600),
            Self::Swipe => Duration::from_millis(700),
            Self::Zoom => Duration::from_millis(800),
            Self::LightWipe => Duration::from_millis(900),
        }
    }
}

/// Parse a transition name. Matching is case-insensitive and accepts `_`/no separator for
/// `light-wipe`.
pub fn parse_transition(kind: &str) -> ReelResult<TransitionKind> {
    let kind = kind.trim().to_ascii_lowercase();
    if kind.is_empty() {
        return Err(ReelError::validation("transition kind must be non-empty"));
    }

    match kind.as_str() {
        "crossfade" | "fade" => Ok(TransitionKind::Crossfade),
        "swipe" => Ok(TransitionKind::Swipe),
        "zoom" => Ok(TransitionKind::Zoom),
        "light-wipe" | "light_wipe" | "lightwipe" => Ok(TransitionKind::LightWipe),
        _ => Err(ReelError::validation(format!(
            "unknown transition kind '{kind}'"
        ))),
    }
}

/// Which side of a scene change a transition is applied to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionEdge {
    /// Scene becoming visible.
    In,
    /// Scene going away.
    Out,
}

/// A transition as an explicit operation: what to play and for how long.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    /// Transition style.
    pub kind: TransitionKind,
    /// Enter or exit.
    pub edge: TransitionEdge,
    /// Time the transition is allowed to occupy before the scene is considered settled.
    pub duration: Duration,
}

impl Transition {
    /// Build a transition using the kind's nominal duration, or `duration_override` when set.
    pub fn new(
        kind: TransitionKind,
        edge: TransitionEdge,
        duration_override: Option<Duration>,
    ) -> Self {
        Self {
            kind,
            edge,
            duration: duration_override.unwrap_or_else(|| kind.nominal_duration()),
        }
    }

    /// Class applied to the scene root while the transition plays.
    pub fn class_name(&self) -> String {
        let prefix = match self.edge {
            TransitionEdge::In => "enter",
            TransitionEdge::Out => "exit",
        };
        format!("{prefix}-{}", self.kind.name())
    }

    /// Style value for the animation length, in milliseconds.
    pub fn duration_style(&self) -> String {
        format!("{}ms", self.duration.as_millis())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/transitions.rs"]
mod tests;
