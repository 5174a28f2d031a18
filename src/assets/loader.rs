use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;

/// Per-asset readiness failure.
///
/// `Timeout` and `Source` are retried identically by [`crate::load_with_retry`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// Readiness was not reached within the per-attempt deadline.
    #[error("timed out after {timeout:?} waiting for '{url}'")]
    Timeout {
        /// Asset URL.
        url: String,
        /// Deadline that expired.
        timeout: Duration,
    },

    /// The asset itself failed (missing file, undecodable bytes, unsupported scheme).
    #[error("asset '{url}' failed: {reason}")]
    Source {
        /// Asset URL.
        url: String,
        /// Human-readable cause.
        reason: String,
    },

    /// Work was abandoned because playback stopped.
    #[error("loading '{url}' was cancelled")]
    Cancelled {
        /// Asset URL.
        url: String,
    },
}

impl AssetError {
    /// Build an [`AssetError::Source`] value.
    pub fn source(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Source {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// URL the error refers to.
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url, .. } | Self::Source { url, .. } | Self::Cancelled { url } => url,
        }
    }
}

/// Asynchronous asset readiness capability.
///
/// Implementations resolve once the asset at `url` is usable (fetched and decoded) or fail.
/// Callers abort an attempt by dropping the returned future, which is how timeouts and
/// cancellation are applied.
#[async_trait::async_trait]
pub trait AssetLoader: Send + Sync {
    /// Bring `url` to a ready state.
    async fn load(&self, url: &str) -> Result<(), AssetError>;
}

/// Live loader for local media: reads `file://` URLs or plain paths and decodes images.
///
/// Relative paths resolve against `root`. Decoding runs on tokio's blocking pool.
#[derive(Clone, Debug)]
pub struct FsAssetLoader {
    root: PathBuf,
}

impl FsAssetLoader {
    /// Create a loader resolving relative paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory used for relative paths.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, url: &str) -> Result<PathBuf, AssetError> {
        if let Some(rest) = url.strip_prefix("file://") {
            return Ok(PathBuf::from(rest));
        }
        if url.contains("://") || url.starts_with("data:") {
            return Err(AssetError::source(url, "unsupported URL scheme"));
        }
        let p = Path::new(url);
        Ok(if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        })
    }
}

#[async_trait::async_trait]
impl AssetLoader for FsAssetLoader {
    async fn load(&self, url: &str) -> Result<(), AssetError> {
        let path = self.path_for(url)?;
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("read asset bytes from '{}'", path.display()))
            .map_err(|e| AssetError::source(url, format!("{e:#}")))?;

        let decoded = tokio::task::spawn_blocking(move || decode_probe(&bytes))
            .await
            .map_err(|e| AssetError::source(url, format!("decode task failed: {e}")))?;
        decoded.map_err(|e| AssetError::source(url, format!("{e:#}")))?;

        tracing::trace!(url, "asset ready");
        Ok(())
    }
}

/// Fully decode encoded image bytes, returning the pixel dimensions.
pub fn decode_probe(bytes: &[u8]) -> anyhow::Result<(u32, u32)> {
    let img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok((img.width(), img.height()))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
