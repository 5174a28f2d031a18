use crate::assets::loader::AssetError;

/// Convenience result type used across storyreel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid or malformed manifest data. Fatal: playback never starts.
    #[error("validation error: {0}")]
    Validation(String),

    /// A scene could not be mounted (for example the render surface has no root).
    #[error("mount error: {0}")]
    Mount(String),

    /// Playback control misuse, such as starting a player that is already running.
    #[error("playback error: {0}")]
    Playback(String),

    /// Asset readiness failure surfaced outside the preload pipeline.
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Mount`] value.
    pub fn mount(msg: impl Into<String>) -> Self {
        Self::Mount(msg.into())
    }

    /// Build a [`ReelError::Playback`] value.
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    /// Build a [`ReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for errors that must abort playback setup.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Asset(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
