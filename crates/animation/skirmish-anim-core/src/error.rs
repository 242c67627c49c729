//! Error types for asset decoding and the asset registry.

/// Errors produced while decoding a binary animation asset.
///
/// Decoding is all-or-nothing: any of these means the asset is unusable and
/// nothing has been partially loaded into caller state.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum DecodeError {
    /// The byte stream ended before the structure was complete.
    #[error("asset data truncated at byte {offset} while reading {what}")]
    Truncated { offset: usize, what: &'static str },

    /// The leading format version is not one this build understands.
    #[error("unsupported asset format version {found} (supported: {supported})")]
    BadVersion { found: i32, supported: i32 },

    /// A length-prefixed string was malformed or not valid UTF-8.
    #[error("malformed string at byte {offset}")]
    BadString { offset: usize },

    /// A curve referenced a `(kind, field)` pair outside the channel table.
    #[error("unknown channel (kind {kind}, field {field})")]
    UnknownChannel { kind: u8, field: u8 },

    /// A curve or sweep block referenced a part index that does not exist.
    #[error("part index {index} out of range ({count} parts)")]
    PartIndexOutOfRange { index: usize, count: usize },

    /// Parent links do not form a forest (cycle or out-of-range parent).
    #[error("part hierarchy invalid: {reason}")]
    InvalidHierarchy { reason: String },

    /// The clip duration is zero, negative or non-finite.
    #[error("invalid clip duration {duration}")]
    InvalidDuration { duration: f32 },

    /// Keyframe times within a curve were not non-decreasing.
    #[error("keyframes out of order in curve for part {part}")]
    UnsortedKeyframes { part: usize },
}

/// Errors produced by the asset registry when loading by path.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum AssetError {
    /// The backing store could not produce bytes for this path.
    #[error("failed to read asset '{path}': {reason}")]
    Io { path: String, reason: String },

    /// The bytes were read but did not decode.
    #[error("failed to decode asset '{path}'")]
    Decode {
        path: String,
        #[source]
        source: DecodeError,
    },
}
