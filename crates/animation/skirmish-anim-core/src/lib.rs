//! Skirmish animation core (engine-agnostic).
//!
//! Plays back pre-baked 2D skeletal-sprite animations: a versioned binary
//! asset format, Hermite curve sampling, hierarchical world-matrix
//! resolution with mirroring, event collection over traversed time, and
//! weapon-sweep trail cursors. The host engine supplies storage, rendering
//! and event handling through the narrow seams in `registry` and `stepper`.

pub mod channel;
pub mod config;
pub mod curve;
pub mod data;
pub mod decode;
pub mod error;
pub mod hierarchy;
pub mod playback;
pub mod registry;
pub mod snapshot;
pub mod stepper;
pub mod sweep;

// Re-exports for consumers (adapters and the tactics crate).
pub use channel::{ChannelId, ChannelSet};
pub use config::AnimConfig;
pub use curve::{Curve, Keyframe, WeightedMode, WrapMode};
pub use data::{AnimEvent, AnimationAsset, PartDef};
pub use decode::{decode, FORMAT_VERSION};
pub use error::{AssetError, DecodeError};
pub use hierarchy::{resolve_world, PartOverride};
pub use playback::{EndKind, PlaybackInstance, PlaybackPhase, SeekTarget, SweepTrail};
pub use registry::{AssetRegistry, AssetSource};
pub use snapshot::{Facing, PartSnapshot};
pub use stepper::{EventSink, Stepper};
pub use sweep::{SweepCursor, SweepPoint, SweepPointCollection};
