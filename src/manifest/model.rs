use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::foundation::error::{ReelError, ReelResult};
use crate::manifest::normalize::normalize;
use crate::timeline::model::Schedule;

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Raw, human-edited manifest as found in JSON.
///
/// Every field is optional at this level; [`normalize`] decides what is required.
pub struct ManifestDef {
    /// `"dark"` selects the dark theme; anything else is light.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// Optional explicit total duration hint in seconds.
    #[serde(
        default,
        alias = "total_duration",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_duration: Option<f64>,
    /// Scene list. Missing scenes fail normalization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenes: Option<Vec<SceneDef>>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Raw scene entry.
pub struct SceneDef {
    /// Explicit absolute start in seconds. Omitted starts chain after the previous scene.
    #[serde(default, alias = "start", skip_serializing_if = "Option::is_none")]
    pub t: Option<f64>,
    /// Scene length in seconds; required and > 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Scene photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaDef>,
    /// Enter transition name.
    #[serde(
        default,
        alias = "transitionIn",
        skip_serializing_if = "Option::is_none"
    )]
    pub transition: Option<String>,
    /// Exit transition name; defaults to the enter transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_out: Option<String>,
    /// Timed text reveals.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text: Vec<TextDef>,
    /// Timed callout reveals.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub callouts: Vec<CalloutDef>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Raw scene photo.
pub struct MediaDef {
    /// Path or URL, relative paths resolve against the manifest base.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Credit line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit: Option<String>,
    /// Ken-Burns preset name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kenburns: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Raw text reveal.
pub struct TextDef {
    /// Presentation role, `"body"` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Markup content.
    #[serde(default)]
    pub html: String,
    /// Offset from the scene start in seconds, 0 when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<f64>,
    /// Effect tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Raw callout reveal.
pub struct CalloutDef {
    /// Markup content.
    #[serde(default)]
    pub html: String,
    /// Offset from the scene start in seconds, 0 when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<f64>,
    /// Normalized horizontal position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Normalized vertical position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

/// Manifest boundary object.
///
/// Wraps the JSON-facing [`ManifestDef`]. Normalizing borrows the definition and produces an
/// independent [`Schedule`], so one manifest can serve as a template for several schedules.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    def: ManifestDef,
}

impl Manifest {
    /// Parse a manifest from an already-decoded JSON value.
    pub fn from_value(value: &serde_json::Value) -> ReelResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ReelError::validation("manifest must be a JSON object"))?;
        match obj.get("scenes") {
            None | Some(serde_json::Value::Null) => {
                return Err(ReelError::validation("manifest is missing 'scenes'"));
            }
            Some(v) if !v.is_array() => {
                return Err(ReelError::validation("manifest 'scenes' must be an array"));
            }
            Some(_) => {}
        }
        let def = ManifestDef::deserialize(value)
            .map_err(|e| ReelError::validation(format!("parse manifest JSON: {e}")))?;
        Ok(Self { def })
    }

    /// Parse a manifest from a JSON string.
    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        let value: serde_json::Value = serde_json::from_str(s)
            .map_err(|e| ReelError::validation(format!("parse manifest JSON: {e}")))?;
        Self::from_value(&value)
    }

    /// Parse a manifest from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelResult<Self> {
        let value: serde_json::Value = serde_json::from_reader(r)
            .map_err(|e| ReelError::validation(format!("parse manifest JSON: {e}")))?;
        Self::from_value(&value)
    }

    /// Parse a manifest from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::validation(format!("open manifest JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Wrap an in-memory definition.
    pub fn from_def(def: ManifestDef) -> Self {
        Self { def }
    }

    /// Access the raw definition.
    pub fn def(&self) -> &ManifestDef {
        &self.def
    }

    /// Number of declared scenes (0 when `scenes` is absent).
    pub fn scene_count(&self) -> usize {
        self.def.scenes.as_ref().map_or(0, Vec::len)
    }

    /// Normalize into a [`Schedule`], resolving media paths against `base`.
    pub fn normalize(&self, base: &str) -> ReelResult<Schedule> {
        normalize(&self.def, base)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/manifest/model.rs"]
mod tests;
