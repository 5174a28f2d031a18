use std::collections::BTreeSet;

use crate::effects::kenburns::{KenBurnsPreset, parse_kenburns};
use crate::effects::transitions::{TransitionKind, parse_transition};
use crate::foundation::core::{NormPoint, TimeSpan};
use crate::foundation::error::{ReelError, ReelResult};
use crate::manifest::model::{CalloutDef, ManifestDef, MediaDef, SceneDef, TextDef};
use crate::manifest::resolve::resolve_media_src;
use crate::timeline::model::{CalloutEvent, MediaSpec, Scene, Schedule, TextEvent, Theme};

/// Shortest scene the engine will schedule, in seconds.
pub const MIN_SCENE_DURATION: f64 = 0.1;

const DEFAULT_TEXT_ROLE: &str = "body";

/// Validate and canonicalize a raw manifest into a [`Schedule`].
///
/// Media sources are resolved against `base`. The definition is only borrowed; the returned
/// schedule owns all of its data.
#[tracing::instrument(skip(def), fields(scenes = def.scenes.as_ref().map(Vec::len)))]
pub fn normalize(def: &ManifestDef, base: &str) -> ReelResult<Schedule> {
    let scene_defs = def
        .scenes
        .as_ref()
        .ok_or_else(|| ReelError::validation("manifest is missing 'scenes'"))?;

    let mut scenes = Vec::with_capacity(scene_defs.len());
    let mut cursor = 0.0_f64;
    for (i, sd) in scene_defs.iter().enumerate() {
        let scene = normalize_scene(i, sd, cursor, base)?;
        cursor = scene.span.end();
        scenes.push(scene);
    }

    let summed: f64 = scenes.iter().map(Scene::duration).sum();
    let total_duration = match def.total_duration {
        Some(hint) if hint.is_finite() && hint > 0.0 => hint,
        _ => summed,
    };

    let theme = match def.theme.as_deref() {
        Some("dark") => Theme::Dark,
        _ => Theme::Light,
    };

    tracing::debug!(
        scenes = scenes.len(),
        total_duration,
        "normalized manifest"
    );

    Ok(Schedule {
        theme,
        total_duration,
        scenes,
    })
}

fn normalize_scene(i: usize, sd: &SceneDef, chained_start: f64, base: &str) -> ReelResult<Scene> {
    let duration = match sd.duration {
        Some(d) if d.is_finite() && d > 0.0 => d.max(MIN_SCENE_DURATION),
        Some(d) => {
            return Err(ReelError::validation(format!(
                "scene {i}: duration must be finite and > 0 (got {d})"
            )));
        }
        None => {
            return Err(ReelError::validation(format!(
                "scene {i}: duration is required"
            )));
        }
    };

    let start = match sd.t {
        Some(t) if t.is_finite() && t >= 0.0 => t,
        Some(t) => {
            return Err(ReelError::validation(format!(
                "scene {i}: start 't' must be finite and >= 0 (got {t})"
            )));
        }
        None => chained_start,
    };

    let transition_in = match sd.transition.as_deref() {
        Some(name) => parse_transition(name).map_err(|e| scene_err(i, e))?,
        None => TransitionKind::Crossfade,
    };
    let transition_out = match sd.transition_out.as_deref() {
        Some(name) => parse_transition(name).map_err(|e| scene_err(i, e))?,
        None => transition_in,
    };

    let text_events = sd
        .text
        .iter()
        .enumerate()
        .map(|(j, t)| normalize_text(i, j, t))
        .collect::<ReelResult<Vec<_>>>()?;
    let callout_events = sd
        .callouts
        .iter()
        .enumerate()
        .map(|(j, c)| normalize_callout(i, j, c))
        .collect::<ReelResult<Vec<_>>>()?;

    Ok(Scene {
        span: TimeSpan::new(start, duration)?,
        media: normalize_media(i, sd.media.as_ref(), base)?,
        text_events,
        callout_events,
        transition_in,
        transition_out,
    })
}

fn normalize_media(i: usize, media: Option<&MediaDef>, base: &str) -> ReelResult<MediaSpec> {
    let Some(m) = media else {
        return Ok(MediaSpec {
            src: String::new(),
            credit: None,
            kenburns: KenBurnsPreset::Center,
        });
    };

    let kenburns = match m.kenburns.as_deref() {
        Some(name) => parse_kenburns(name).map_err(|e| scene_err(i, e))?,
        None => KenBurnsPreset::Center,
    };

    Ok(MediaSpec {
        src: resolve_media_src(base, m.src.as_deref().unwrap_or_default())
            .map_err(|e| scene_err(i, e))?,
        credit: m
            .credit
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
        kenburns,
    })
}

fn normalize_text(i: usize, j: usize, t: &TextDef) -> ReelResult<TextEvent> {
    let role = t
        .role
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_TEXT_ROLE)
        .to_ascii_lowercase();
    let effects: BTreeSet<String> = t
        .effects
        .iter()
        .map(|e| e.trim().to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    Ok(TextEvent {
        role,
        html: t.html.clone(),
        at: event_offset(i, "text", j, t.at)?,
        effects,
    })
}

fn normalize_callout(i: usize, j: usize, c: &CalloutDef) -> ReelResult<CalloutEvent> {
    Ok(CalloutEvent {
        html: c.html.clone(),
        at: event_offset(i, "callout", j, c.at)?,
        pos: NormPoint::clamped(c.x.unwrap_or(0.5), c.y.unwrap_or(0.5)),
    })
}

fn event_offset(i: usize, kind: &str, j: usize, at: Option<f64>) -> ReelResult<f64> {
    match at {
        None => Ok(0.0),
        Some(a) if a.is_finite() && a >= 0.0 => Ok(a),
        Some(a) => Err(ReelError::validation(format!(
            "scene {i}: {kind} event {j} 'at' must be finite and >= 0 (got {a})"
        ))),
    }
}

fn scene_err(i: usize, e: ReelError) -> ReelError {
    match e {
        ReelError::Validation(msg) => ReelError::validation(format!("scene {i}: {msg}")),
        other => other,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/manifest/normalize.rs"]
mod tests;
