//! storyreel plays photo-story timelines.
//!
//! A JSON manifest describes scenes (a photo, timed text and positioned callouts, transitions)
//! on a single timeline. The engine:
//!
//! - Validates and normalizes the manifest into an immutable [`Schedule`]
//! - Readies media through an [`AssetLoader`] with bounded concurrency, retries and timeouts
//! - Drives a [`Player`] that enters and exits scenes on a [`RenderSurface`] and reveals each
//!   timed event exactly once
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod assets;
pub(crate) mod effects;
pub(crate) mod manifest;
pub(crate) mod playback;
pub(crate) mod render;
pub(crate) mod timeline;

pub use crate::foundation::core::{NormPoint, TimeSpan, secs_to_duration};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::assets::loader::{AssetError, AssetLoader, FsAssetLoader, decode_probe};
pub use crate::assets::preload::{
    PreloadEvent, PreloadOpts, PreloadPipeline, PreloadReport, preload_all,
};
pub use crate::assets::retry::{PreloadTask, RetryPolicy, load_with_retry};
pub use crate::assets::scripted::{Script, ScriptedLoader};
pub use crate::assets::warm::{AssetWarmer, WarmState};
pub use crate::effects::kenburns::{KenBurnsMotion, KenBurnsPreset, parse_kenburns};
pub use crate::effects::transitions::{
    Transition, TransitionEdge, TransitionKind, parse_transition,
};
pub use crate::manifest::model::{
    CalloutDef, Manifest, ManifestDef, MediaDef, SceneDef, TextDef,
};
pub use crate::manifest::normalize::{MIN_SCENE_DURATION, normalize};
pub use crate::manifest::resolve::resolve_media_src;
pub use crate::playback::lifecycle::{
    ACTIVE_CLASS, LifecycleManager, MountedScene, ScenePhase, VISIBLE_CLASS,
};
pub use crate::playback::opts::PlayerOpts;
pub use crate::playback::player::Player;
pub use crate::playback::scheduler::{PlaybackSummary, Scheduler, TickOutcome};
pub use crate::playback::triggers::{EventKind, TriggerKey, TriggerTracker};
pub use crate::render::memory::{MemNode, MemorySurface, SurfaceOp};
pub use crate::render::surface::{NodeId, NodeKind, RenderSurface};
pub use crate::timeline::model::{CalloutEvent, MediaSpec, Scene, Schedule, TextEvent, Theme};
