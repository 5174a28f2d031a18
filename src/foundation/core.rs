use std::time::Duration;

use crate::foundation::error::{ReelError, ReelResult};

/// Half-open time span `[start, start + duration)` in timeline seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimeSpan {
    /// Inclusive span start in seconds.
    pub start: f64,
    /// Span length in seconds (> 0).
    pub duration: f64,
}

impl TimeSpan {
    /// Create a validated span with finite `start >= 0` and finite `duration > 0`.
    pub fn new(start: f64, duration: f64) -> ReelResult<Self> {
        if !start.is_finite() || start < 0.0 {
            return Err(ReelError::validation(
                "TimeSpan start must be finite and >= 0",
            ));
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ReelError::validation(
                "TimeSpan duration must be finite and > 0",
            ));
        }
        Ok(Self { start, duration })
    }

    /// Exclusive span end.
    pub fn end(self) -> f64 {
        self.start + self.duration
    }

    /// Return `true` when `t` is inside `[start, end)`.
    pub fn contains(self, t: f64) -> bool {
        self.start <= t && t < self.end()
    }

    /// Offset of `t` from the span start. May be negative before the span.
    pub fn local(self, t: f64) -> f64 {
        t - self.start
    }
}

/// Position in normalized viewport coordinates, both axes in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NormPoint {
    /// Horizontal position, `0` is the left edge.
    pub x: f64,
    /// Vertical position, `0` is the top edge.
    pub y: f64,
}

impl NormPoint {
    /// Build a point, clamping each axis to `[0, 1]`. Non-finite axes fall back to the center.
    pub fn clamped(x: f64, y: f64) -> Self {
        fn axis(v: f64) -> f64 {
            if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.5 }
        }
        Self {
            x: axis(x),
            y: axis(y),
        }
    }

    /// CSS-style percentage strings for `left` and `top`.
    pub fn to_percent(self) -> (String, String) {
        (
            format!("{:.3}%", self.x * 100.0),
            format!("{:.3}%", self.y * 100.0),
        )
    }
}

/// Convert non-negative seconds into a [`Duration`], saturating invalid input to zero.
pub fn secs_to_duration(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::from_secs_f64(secs)
    } else {
        Duration::ZERO
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
