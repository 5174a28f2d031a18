use crate::foundation::error::{ReelError, ReelResult};

/// Continuous pan/zoom style applied to a scene photo while it is on screen.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum KenBurnsPreset {
    /// Slow push-in around the center.
    #[default]
    Center,
    /// Drift towards the left edge.
    Left,
    /// Drift towards the right edge.
    Right,
    /// Drift towards the top edge.
    Up,
    /// Drift towards the bottom edge.
    Down,
    /// Stronger push-in.
    ZoomIn,
    /// Pull-out from a cropped start.
    ZoomOut,
}

impl KenBurnsPreset {
    /// Canonical kebab-case name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
            Self::ZoomIn => "zoom-in",
            Self::ZoomOut => "zoom-out",
        }
    }

    /// Resolve the motion for a scene lasting `duration_s` seconds.
    pub fn motion(self, duration_s: f64) -> KenBurnsMotion {
        let (from_scale, to_scale, from, to) = match self {
            Self::Center => (1.0, 1.08, (0.0, 0.0), (0.0, 0.0)),
            Self::Left => (1.1, 1.1, (2.5, 0.0), (-2.5, 0.0)),
            Self::Right => (1.1, 1.1, (-2.5, 0.0), (2.5, 0.0)),
            Self::Up => (1.1, 1.1, (0.0, 2.5), (0.0, -2.5)),
            Self::Down => (1.1, 1.1, (0.0, -2.5), (0.0, 2.5)),
            Self::ZoomIn => (1.0, 1.18, (0.0, 0.0), (0.0, 0.0)),
            Self::ZoomOut => (1.18, 1.0, (0.0, 0.0), (0.0, 0.0)),
        };
        KenBurnsMotion {
            from_scale,
            to_scale,
            from_offset_pct: from,
            to_offset_pct: to,
            duration_s: duration_s.max(0.0),
        }
    }
}

/// Parse a Ken-Burns preset name (case-insensitive, `_` accepted for `-`).
pub fn parse_kenburns(name: &str) -> ReelResult<KenBurnsPreset> {
    let name = name.trim().to_ascii_lowercase().replace('_', "-");
    match name.as_str() {
        "" | "center" => Ok(KenBurnsPreset::Center),
        "left" => Ok(KenBurnsPreset::Left),
        "right" => Ok(KenBurnsPreset::Right),
        "up" | "top" => Ok(KenBurnsPreset::Up),
        "down" | "bottom" => Ok(KenBurnsPreset::Down),
        "zoom-in" | "zoomin" | "in" => Ok(KenBurnsPreset::ZoomIn),
        "zoom-out" | "zoomout" | "out" => Ok(KenBurnsPreset::ZoomOut),
        other => Err(ReelError::validation(format!(
            "unknown kenburns preset '{other}'"
        ))),
    }
}

/// Fully parameterized pan/zoom animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KenBurnsMotion {
    /// Scale at scene start.
    pub from_scale: f64,
    /// Scale at scene end.
    pub to_scale: f64,
    /// Translation at scene start, percent of the viewport.
    pub from_offset_pct: (f64, f64),
    /// Translation at scene end, percent of the viewport.
    pub to_offset_pct: (f64, f64),
    /// Animation length in seconds (the scene duration).
    pub duration_s: f64,
}

impl KenBurnsMotion {
    /// Style custom properties consumed by the media node's animation.
    pub fn style_props(&self) -> Vec<(&'static str, String)> {
        vec![
            ("--kb-from-scale", format!("{:.3}", self.from_scale)),
            ("--kb-to-scale", format!("{:.3}", self.to_scale)),
            ("--kb-from-x", format!("{:.2}%", self.from_offset_pct.0)),
            ("--kb-from-y", format!("{:.2}%", self.from_offset_pct.1)),
            ("--kb-to-x", format!("{:.2}%", self.to_offset_pct.0)),
            ("--kb-to-y", format!("{:.2}%", self.to_offset_pct.1)),
            ("animation-duration", format!("{:.3}s", self.duration_s)),
        ]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/kenburns.rs"]
mod tests;
