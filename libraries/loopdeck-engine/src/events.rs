//! Engine events and snapshots
//!
//! Renderers never borrow engine state. They drain [`EngineEvent`]s after
//! each command and redraw from the [`PlaylistSnapshot`] carried by
//! `StateChanged`.

use crate::types::{Direction, PlaybackStatus, TrackId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Events emitted by the playlist engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Observable state changed; carries the full picture
    StateChanged {
        /// State after the change
        snapshot: PlaylistSnapshot,
    },

    /// A device was acquired and started for a track
    TrackStarted {
        /// Track now playing
        track_id: TrackId,
        /// Its index
        index: usize,
        /// Track that held the device before, if any
        previous_track_id: Option<TrackId>,
    },

    /// A track played through to its end
    TrackCompleted {
        /// Finished track
        track_id: TrackId,
    },

    /// Periodic progress of the playing track
    Progress {
        /// Playing track
        track_id: TrackId,
        /// Elapsed time
        position_ms: u64,
        /// Time left
        remaining_ms: u64,
        /// Elapsed fraction from 0.0 to 1.0
        ratio: f32,
    },

    /// Track appended to the playlist
    TrackAdded {
        /// New track
        track_id: TrackId,
        /// Its index
        index: usize,
    },

    /// Track removed and its resource released
    TrackRemoved {
        /// Removed track
        track_id: TrackId,
    },

    /// A raw source was dropped during import
    ImportRejected {
        /// Raw source name
        name: String,
        /// Why it was dropped
        reason: String,
    },

    /// The playback device reported a failure
    DeviceFailed {
        /// Track the device was playing, if still known
        track_id: Option<TrackId>,
        /// Failure description
        reason: String,
    },
}

/// Read-only view of the engine for renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistSnapshot {
    /// Tracks in playlist order
    pub tracks: Vec<TrackView>,

    /// Current track; `None` when the playlist is empty
    pub current_index: Option<usize>,

    /// Playback status
    pub status: PlaybackStatus,

    /// Shorthand for `status == Playing`
    pub is_playing: bool,

    /// Playback direction
    pub direction: Direction,

    /// Elapsed time of the current device (zero when idle)
    #[serde(with = "duration_ms")]
    pub position: Duration,

    /// A track just started or resumed; renderers bring it into view
    pub reveal_current: bool,
}

impl PlaylistSnapshot {
    /// View of the current track, if any
    pub fn current(&self) -> Option<&TrackView> {
        self.current_index.and_then(|i| self.tracks.get(i))
    }
}

/// One row of the playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackView {
    /// Track identifier
    pub id: TrackId,

    /// Name shown to the user
    pub display_name: String,

    /// Full duration
    #[serde(with = "duration_ms")]
    pub duration: Duration,

    /// Time left: full duration unless this is the current, started track
    #[serde(with = "duration_ms")]
    pub remaining: Duration,

    /// Elapsed fraction for the current track, 0.0 otherwise
    pub progress: f32,
}

/// Serialize durations as whole milliseconds
pub(crate) mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
