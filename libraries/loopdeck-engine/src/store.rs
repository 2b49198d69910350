//! Playlist store
//!
//! Ordered sequence of tracks. Knows nothing about playback; the engine
//! keeps the current index consistent around every call that changes
//! positions.

use crate::error::{PlaylistError, Result};
use crate::loader::ResourceHandle;
use crate::types::TrackId;
use std::time::Duration;

/// One playable unit
#[derive(Debug)]
pub struct Track {
    id: TrackId,
    resource: ResourceHandle,
    display_name: String,
    duration: Duration,
}

impl Track {
    /// Create a track
    pub fn new(
        id: TrackId,
        resource: ResourceHandle,
        display_name: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            id,
            resource,
            display_name: display_name.into(),
            duration,
        }
    }

    /// Track identifier
    pub fn id(&self) -> TrackId {
        self.id
    }

    /// Media handle owned by this track
    pub fn resource(&self) -> &ResourceHandle {
        &self.resource
    }

    /// Name shown to the user
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Duration fixed at load time
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Give up the track, returning its media handle for release
    pub fn into_resource(self) -> ResourceHandle {
        self.resource
    }
}

/// Ordered track list
#[derive(Debug, Default)]
pub struct PlaylistStore {
    tracks: Vec<Track>,
}

impl PlaylistStore {
    /// Create new empty store
    pub fn new() -> Self {
        Self { tracks: Vec::new() }
    }

    /// Add track at the end
    pub fn append(&mut self, track: Track) {
        debug_assert!(
            self.position(track.id()).is_none(),
            "duplicate track id {}",
            track.id()
        );
        self.tracks.push(track);
    }

    /// Remove track at index
    ///
    /// The caller owns the returned track and must release its resource.
    pub fn remove(&mut self, index: usize) -> Result<Track> {
        self.check(index)?;
        Ok(self.tracks.remove(index))
    }

    /// Move the track at `from` so it ends up at `to`
    ///
    /// Tracks in between shift by one; everything else keeps its order.
    pub fn move_track(&mut self, from: usize, to: usize) -> Result<()> {
        self.check(from)?;
        self.check(to)?;

        if from != to {
            let track = self.tracks.remove(from);
            self.tracks.insert(to, track);
        }

        Ok(())
    }

    /// Rename track at index
    ///
    /// The name is trimmed; blank names are ignored. Returns whether the
    /// name was changed.
    pub fn rename(&mut self, index: usize, name: &str) -> Result<bool> {
        self.check(index)?;

        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }

        let track = &mut self.tracks[index];
        if track.display_name == name {
            return Ok(false);
        }
        track.display_name = name.to_string();
        Ok(true)
    }

    /// Remove every track, in playlist order
    pub fn clear(&mut self) -> Vec<Track> {
        std::mem::take(&mut self.tracks)
    }

    /// Get track at index
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Index of the track with the given id
    pub fn position(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    /// Iterate tracks in playlist order
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.tracks.len() {
            Ok(())
        } else {
            Err(PlaylistError::IndexOutOfBounds {
                index,
                len: self.tracks.len(),
            })
        }
    }
}
