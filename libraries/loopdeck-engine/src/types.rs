//! Core types for the playlist engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Track identifier
///
/// Issued by the engine when a track is appended. Stable while the track
/// stays in the playlist and never reused within one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(u64);

impl TrackId {
    /// Create a track ID from its raw value
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Playback direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Play in insertion order
    #[default]
    Forward,

    /// Play from the last track towards the first
    Reverse,
}

impl Direction {
    /// The other direction
    pub fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }

    /// Index playback starts from when nothing is playing
    ///
    /// Returns 0 for an empty playlist.
    pub fn start_index(self, len: usize) -> usize {
        match self {
            Direction::Forward => 0,
            Direction::Reverse => len.saturating_sub(1),
        }
    }

    /// Index that follows `current` on natural completion
    ///
    /// Always wraps around, in both directions.
    pub fn advance(self, current: usize, len: usize) -> usize {
        debug_assert!(len > 0, "advance on an empty playlist");
        match self {
            Direction::Forward => (current + 1) % len,
            Direction::Reverse => (current + len - 1) % len,
        }
    }

    /// Index at which this direction wraps back to the other end
    ///
    /// Toggling *into* this direction while playing here restarts playback
    /// at the opposite end.
    pub fn wrap_boundary(self, len: usize) -> usize {
        match self {
            Direction::Forward => len.saturating_sub(1),
            Direction::Reverse => 0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Reverse => write!(f, "reverse"),
        }
    }
}

/// Playback status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// No device held
    #[default]
    Idle,

    /// Device running
    Playing,

    /// Device held but suspended
    Paused,
}

/// What to do when the playback device reports a failure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceFailurePolicy {
    /// Treat the failure like natural completion and move on
    #[default]
    Advance,

    /// Release the device and go idle
    Stop,
}

/// Configuration for the playlist engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Progress ticker interval in milliseconds (default: 250)
    pub progress_interval_ms: u64,

    /// Device failure handling (default: Advance)
    pub failure_policy: DeviceFailurePolicy,

    /// Direction at startup (default: Forward)
    pub initial_direction: Direction,

    /// Reset playback to idle after a batch import (default: true)
    pub stop_on_import: bool,
}

impl EngineConfig {
    /// Progress ticker interval
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            progress_interval_ms: 250,
            failure_policy: DeviceFailurePolicy::Advance,
            initial_direction: Direction::Forward,
            stop_on_import: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.progress_interval(), Duration::from_millis(250));
        assert_eq!(config.failure_policy, DeviceFailurePolicy::Advance);
        assert_eq!(config.initial_direction, Direction::Forward);
        assert!(config.stop_on_import);
    }

    #[test]
    fn start_index_per_direction() {
        assert_eq!(Direction::Forward.start_index(5), 0);
        assert_eq!(Direction::Reverse.start_index(5), 4);
        assert_eq!(Direction::Reverse.start_index(0), 0);
    }

    #[test]
    fn advance_wraps_both_ways() {
        assert_eq!(Direction::Forward.advance(1, 3), 2);
        assert_eq!(Direction::Forward.advance(2, 3), 0);
        assert_eq!(Direction::Reverse.advance(1, 3), 0);
        assert_eq!(Direction::Reverse.advance(0, 3), 2);
        assert_eq!(Direction::Reverse.advance(0, 1), 0);
    }

    #[test]
    fn wrap_boundaries() {
        assert_eq!(Direction::Forward.wrap_boundary(4), 3);
        assert_eq!(Direction::Reverse.wrap_boundary(4), 0);
    }

    #[test]
    fn config_deserializes_lowercase_enums() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"failure_policy": "stop", "initial_direction": "reverse"}"#,
        )
        .unwrap();
        assert_eq!(config.failure_policy, DeviceFailurePolicy::Stop);
        assert_eq!(config.initial_direction, Direction::Reverse);
        assert_eq!(config.progress_interval_ms, 250);
    }
}
