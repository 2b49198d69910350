//! Error types for the playlist engine

use thiserror::Error;

/// Playlist contract violations
///
/// Returned before any state is touched, so a failed command leaves the
/// engine exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaylistError {
    /// Index does not address a track
    #[error("Index out of bounds: {index} (playlist length {len})")]
    IndexOutOfBounds {
        /// Offending index
        index: usize,
        /// Playlist length at the time of the call
        len: usize,
    },
}

/// Resource loader errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Media type is not one the loader accepts
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Source could not be read or probed
    #[error("Unreadable source {name}: {reason}")]
    Unreadable {
        /// Raw source name
        name: String,
        /// Underlying failure
        reason: String,
    },
}

/// Playback device errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// The device does not know the resource (already released or never loaded)
    #[error("Unknown resource: {0}")]
    UnknownResource(u64),

    /// The device handle is not (or no longer) held
    #[error("Unknown device handle: {0}")]
    UnknownHandle(u64),

    /// Backend specific failure
    #[error("Device backend error: {0}")]
    Backend(String),
}

/// Result type for playlist commands
pub type Result<T> = std::result::Result<T, PlaylistError>;
