//! Playlist engine - core orchestration
//!
//! Owns the playlist, the playback state and the single active device, and
//! applies every transition rule synchronously. Commands run to completion
//! one at a time; the host drains events afterwards.

use crate::{
    cursor::{reconcile, ListChange},
    device::{DeviceHandle, DeviceSignal, PlaybackDevice},
    error::{PlaylistError, Result},
    events::{EngineEvent, PlaylistSnapshot, TrackView},
    loader::{LoadedResource, RawSource, ResourceLoader},
    progress::{ProgressReading, ProgressTicker, TickScheduler, TickerToken},
    store::{PlaylistStore, Track},
    types::{DeviceFailurePolicy, Direction, EngineConfig, PlaybackStatus, TrackId},
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Device currently owned by the engine
#[derive(Debug, Clone, Copy)]
struct ActiveDevice {
    handle: DeviceHandle,
    track_id: TrackId,
    /// Track ran out (or failed) while paused; resume moves on instead
    ended: bool,
}

/// Playlist sequencer and playback controller
///
/// Combines:
/// - Playlist store (append, remove, move, rename, clear)
/// - Playback state (current index, Idle/Playing/Paused, direction)
/// - Exclusive ownership of at most one playback device
/// - The progress ticker, alive only while playing
pub struct PlaylistEngine {
    config: EngineConfig,

    // Playlist
    store: PlaylistStore,
    next_track_id: u64,

    // Playback state
    current_index: usize,
    status: PlaybackStatus,
    direction: Direction,
    active: Option<ActiveDevice>,

    // Capabilities
    device: Box<dyn PlaybackDevice>,
    loader: Box<dyn ResourceLoader>,
    ticker: ProgressTicker,

    // Notifications
    reveal_pending: bool,
    pending_events: Vec<EngineEvent>,
}

impl PlaylistEngine {
    /// Create new engine with an empty playlist
    pub fn new(
        config: EngineConfig,
        device: Box<dyn PlaybackDevice>,
        loader: Box<dyn ResourceLoader>,
        scheduler: Box<dyn TickScheduler>,
    ) -> Self {
        let ticker = ProgressTicker::new(scheduler, config.progress_interval());

        Self {
            direction: config.initial_direction,
            config,
            store: PlaylistStore::new(),
            next_track_id: 1,
            current_index: 0,
            status: PlaybackStatus::Idle,
            active: None,
            device,
            loader,
            ticker,
            reveal_pending: false,
            pending_events: Vec::new(),
        }
    }

    // ===== Playlist Mutation =====

    /// Append a loaded track at the end of the playlist
    ///
    /// Leaves playback untouched.
    pub fn append_track(&mut self, loaded: LoadedResource) -> TrackId {
        let id = self.push_track(loaded);
        self.emit_state_changed();
        id
    }

    /// Load and append a batch of raw sources
    ///
    /// Sources the loader rejects are dropped with an `ImportRejected` event.
    /// When anything was added and `stop_on_import` is set, playback goes
    /// back to idle.
    pub fn import<I>(&mut self, sources: I) -> Vec<TrackId>
    where
        I: IntoIterator<Item = RawSource>,
    {
        let mut added = Vec::new();

        for source in sources {
            match self.loader.load(&source) {
                Ok(loaded) => added.push(self.push_track(loaded)),
                Err(err) => {
                    warn!(name = %source.name, error = %err, "Dropping import");
                    self.pending_events.push(EngineEvent::ImportRejected {
                        name: source.name,
                        reason: err.to_string(),
                    });
                }
            }
        }

        if !added.is_empty() && self.config.stop_on_import {
            self.halt();
        }

        info!(added = added.len(), total = self.store.len(), "Import finished");
        self.emit_state_changed();
        added
    }

    /// Remove track at index, releasing its resource
    ///
    /// Removing the track that owns the device (playing or paused) stops
    /// playback. Returns the removed track's id.
    pub fn remove_track(&mut self, index: usize) -> Result<TrackId> {
        let track = self.store.remove(index)?;
        let track_id = track.id();

        // The device reads the resource, so it goes first.
        if self.active.is_some_and(|a| a.track_id == track_id) {
            debug!(%track_id, "Removing the active track, going idle");
            self.halt();
        }
        self.loader.release(track.into_resource());

        self.reconcile(ListChange::Removed { index });
        if self.store.is_empty() {
            self.halt();
        }

        self.pending_events.push(EngineEvent::TrackRemoved { track_id });
        self.emit_state_changed();
        Ok(track_id)
    }

    /// Move the track at `from` to `to`
    ///
    /// Never interrupts playback; the current index follows its track.
    pub fn move_track(&mut self, from: usize, to: usize) -> Result<()> {
        self.store.move_track(from, to)?;

        if from != to {
            self.reconcile(ListChange::Moved { from, to });
            self.emit_state_changed();
        }

        Ok(())
    }

    /// Rename track at index
    ///
    /// Blank names are ignored. Returns whether the name changed.
    pub fn rename_track(&mut self, index: usize, name: &str) -> Result<bool> {
        let changed = self.store.rename(index, name)?;
        if changed {
            self.emit_state_changed();
        }
        Ok(changed)
    }

    /// Remove every track, releasing all resources
    pub fn clear(&mut self) {
        self.halt();

        for track in self.store.clear() {
            let track_id = track.id();
            self.loader.release(track.into_resource());
            self.pending_events.push(EngineEvent::TrackRemoved { track_id });
        }

        self.reconcile(ListChange::Cleared);
        self.emit_state_changed();
    }

    // ===== Playback Control =====

    /// Start, pause or resume
    ///
    /// - Idle: start at the direction's start index
    /// - Playing: pause the device
    /// - Paused: resume the same device
    ///
    /// No-op on an empty playlist.
    pub fn toggle_play_pause(&mut self) {
        if self.store.is_empty() {
            return;
        }

        match (self.status, self.active) {
            (PlaybackStatus::Playing, Some(active)) => {
                self.device.pause(active.handle);
                self.ticker.stop();
                self.status = PlaybackStatus::Paused;
                debug!(track_id = %active.track_id, "Paused");
            }
            (PlaybackStatus::Paused, Some(active)) if active.ended => {
                debug!(track_id = %active.track_id, "Resuming past finished track");
                let next = self.direction.advance(self.current_index, self.store.len());
                self.start_track(next);
            }
            (PlaybackStatus::Paused, Some(active)) => {
                self.device.play(active.handle);
                self.status = PlaybackStatus::Playing;
                self.ticker.restart();
                self.reveal_pending = true;
                debug!(track_id = %active.track_id, "Resumed");
            }
            _ => {
                let start = self.direction.start_index(self.store.len());
                self.start_track(start);
            }
        }

        self.emit_state_changed();
    }

    /// Play the track at index
    ///
    /// Re-selecting the track that is already playing does nothing; anything
    /// else (including the paused current track) starts it from the top.
    pub fn select_track(&mut self, index: usize) -> Result<()> {
        if self.store.is_empty() {
            return Ok(());
        }
        if index >= self.store.len() {
            return Err(PlaylistError::IndexOutOfBounds {
                index,
                len: self.store.len(),
            });
        }

        if index == self.current_index && self.status == PlaybackStatus::Playing {
            return Ok(());
        }

        self.start_track(index);
        self.emit_state_changed();
        Ok(())
    }

    /// Change playback direction
    ///
    /// - Idle or paused: move to the new direction's start index and go idle
    /// - Playing at the new direction's wrap boundary: restart at the other end
    /// - Playing elsewhere: keep playing; only the next advance changes
    pub fn set_direction(&mut self, direction: Direction) {
        if direction == self.direction {
            return;
        }
        self.direction = direction;
        let len = self.store.len();
        debug!(%direction, "Direction changed");

        match self.status {
            PlaybackStatus::Idle | PlaybackStatus::Paused => {
                self.current_index = direction.start_index(len);
                self.halt();
            }
            PlaybackStatus::Playing => {
                if self.current_index == direction.wrap_boundary(len) {
                    self.start_track(direction.start_index(len));
                }
            }
        }

        self.emit_state_changed();
    }

    /// Flip playback direction
    pub fn toggle_direction(&mut self) {
        self.set_direction(self.direction.flipped());
    }

    /// Stop playback and release the device
    ///
    /// Keeps the playlist and the current index.
    pub fn reset(&mut self) {
        self.halt();
        self.emit_state_changed();
    }

    // ===== Device Signals =====

    /// Route a device signal
    pub fn handle_device_signal(&mut self, signal: DeviceSignal) {
        match signal {
            DeviceSignal::Completed(handle) => self.handle_track_completed(handle),
            DeviceSignal::Failed { handle, reason } => self.handle_device_failure(handle, reason),
        }
    }

    /// The device finished its track naturally
    ///
    /// Advances one step in the current direction, wrapping at either end.
    /// While paused the advance waits for the next resume. Signals from a
    /// device the engine no longer holds are ignored.
    pub fn handle_track_completed(&mut self, handle: DeviceHandle) {
        let Some(active) = self.active_for(handle) else {
            debug!(%handle, "Ignoring completion from stale device");
            return;
        };
        if active.ended {
            return;
        }

        self.pending_events.push(EngineEvent::TrackCompleted {
            track_id: active.track_id,
        });

        // A pause that raced the end of the track still holds
        if self.status == PlaybackStatus::Paused {
            self.mark_ended();
            return;
        }

        let next = self.direction.advance(self.current_index, self.store.len());
        self.start_track(next);
        self.emit_state_changed();
    }

    /// The device failed to load or play
    ///
    /// Handled per [`DeviceFailurePolicy`]. Stale handles are ignored.
    pub fn handle_device_failure(&mut self, handle: DeviceHandle, reason: impl Into<String>) {
        let reason = reason.into();
        let Some(active) = self.active_for(handle) else {
            debug!(%handle, %reason, "Ignoring failure from stale device");
            return;
        };

        warn!(track_id = %active.track_id, %reason, "Playback device failed");
        self.pending_events.push(EngineEvent::DeviceFailed {
            track_id: Some(active.track_id),
            reason,
        });

        match self.config.failure_policy {
            DeviceFailurePolicy::Advance if self.status == PlaybackStatus::Paused => {
                self.mark_ended();
                return;
            }
            DeviceFailurePolicy::Advance => {
                let next = self.direction.advance(self.current_index, self.store.len());
                self.start_track(next);
            }
            DeviceFailurePolicy::Stop => self.halt(),
        }

        self.emit_state_changed();
    }

    /// Periodic progress tick
    ///
    /// Ticks for a cancelled ticker, or while not playing, are ignored.
    pub fn on_progress_tick(&mut self, token: TickerToken) {
        if !self.ticker.is_current(token) || self.status != PlaybackStatus::Playing {
            return;
        }
        let Some(active) = self.active else {
            return;
        };
        let Some(track) = self.store.get(self.current_index) else {
            return;
        };

        let reading = ProgressReading::new(self.device.position(active.handle), track.duration());
        self.pending_events.push(EngineEvent::Progress {
            track_id: active.track_id,
            position_ms: reading.elapsed().as_millis() as u64,
            remaining_ms: reading.remaining().as_millis() as u64,
            ratio: reading.ratio(),
        });
    }

    // ===== State Queries =====

    /// Read-only view for renderers
    pub fn snapshot(&self) -> PlaylistSnapshot {
        let position = self.position();
        let current = self.current_index();

        let tracks = self
            .store
            .iter()
            .enumerate()
            .map(|(i, track)| {
                let reading = if current == Some(i) && self.active.is_some() {
                    ProgressReading::new(position, track.duration())
                } else {
                    ProgressReading::new(Duration::ZERO, track.duration())
                };

                TrackView {
                    id: track.id(),
                    display_name: track.display_name().to_string(),
                    duration: track.duration(),
                    remaining: reading.remaining(),
                    progress: reading.ratio(),
                }
            })
            .collect();

        PlaylistSnapshot {
            tracks,
            current_index: current,
            status: self.status,
            is_playing: self.is_playing(),
            direction: self.direction,
            position,
            reveal_current: self.reveal_pending,
        }
    }

    /// Current index; `None` when the playlist is empty
    pub fn current_index(&self) -> Option<usize> {
        (!self.store.is_empty()).then_some(self.current_index)
    }

    /// Playback status
    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    /// Check if a track is actively playing
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// Playback direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Handle of the device currently held, if any
    pub fn active_device(&self) -> Option<DeviceHandle> {
        self.active.map(|a| a.handle)
    }

    /// Id of the track owning the device, if any
    pub fn active_track_id(&self) -> Option<TrackId> {
        self.active.map(|a| a.track_id)
    }

    /// Elapsed time of the active device
    pub fn position(&self) -> Duration {
        self.active
            .map(|a| self.device.position(a.handle))
            .unwrap_or(Duration::ZERO)
    }

    /// Get track at index
    pub fn track(&self, index: usize) -> Option<&Track> {
        self.store.get(index)
    }

    /// Iterate tracks in playlist order
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.store.iter()
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the playlist is empty
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ===== Events =====

    /// Drain all pending events
    ///
    /// Returns everything emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internals =====

    fn push_track(&mut self, loaded: LoadedResource) -> TrackId {
        let id = TrackId::new(self.next_track_id);
        self.next_track_id += 1;

        self.store
            .append(Track::new(id, loaded.resource, loaded.name, loaded.duration));
        debug!(track_id = %id, "Track appended");

        self.pending_events.push(EngineEvent::TrackAdded {
            track_id: id,
            index: self.store.len() - 1,
        });
        id
    }

    /// Release whatever device is held and play the track at `index`
    ///
    /// Acquisition failures follow the failure policy; at most one pass over
    /// the playlist is attempted before giving up and going idle.
    fn start_track(&mut self, index: usize) {
        let previous_track_id = self.release_active();
        let len = self.store.len();
        let mut target = index;

        for _ in 0..len {
            let Some(track) = self.store.get(target) else {
                break;
            };
            let track_id = track.id();
            self.current_index = target;

            match self.device.acquire(track.resource()) {
                Ok(handle) => {
                    self.device.play(handle);
                    self.active = Some(ActiveDevice {
                        handle,
                        track_id,
                        ended: false,
                    });
                    self.status = PlaybackStatus::Playing;
                    self.ticker.restart();
                    self.reveal_pending = true;

                    info!(%track_id, index = target, name = track.display_name(), "Track started");
                    self.pending_events.push(EngineEvent::TrackStarted {
                        track_id,
                        index: target,
                        previous_track_id,
                    });
                    return;
                }
                Err(err) => {
                    warn!(%track_id, error = %err, "Could not acquire device");
                    self.pending_events.push(EngineEvent::DeviceFailed {
                        track_id: Some(track_id),
                        reason: err.to_string(),
                    });

                    if self.config.failure_policy == DeviceFailurePolicy::Stop {
                        break;
                    }
                    target = self.direction.advance(target, len);
                }
            }
        }

        self.halt();
    }

    /// Release the held device, returning the track that owned it
    fn release_active(&mut self) -> Option<TrackId> {
        self.ticker.stop();
        let active = self.active.take()?;
        self.device.release(active.handle);
        Some(active.track_id)
    }

    /// Go back to the idle baseline
    fn halt(&mut self) {
        self.release_active();
        self.status = PlaybackStatus::Idle;
        self.reveal_pending = false;
    }

    fn mark_ended(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.ended = true;
            debug!(track_id = %active.track_id, "Track ended while paused");
        }
    }

    fn active_for(&self, handle: DeviceHandle) -> Option<ActiveDevice> {
        self.active.filter(|a| a.handle == handle)
    }

    fn reconcile(&mut self, change: ListChange) {
        self.current_index = reconcile(self.current_index, change, self.store.len());
    }

    fn emit_state_changed(&mut self) {
        self.debug_check_invariants();
        let snapshot = self.snapshot();
        self.pending_events.push(EngineEvent::StateChanged { snapshot });
        self.reveal_pending = false;
    }

    fn debug_check_invariants(&self) {
        debug_assert!(
            self.store.is_empty() || self.current_index < self.store.len(),
            "current index {} out of range for {} tracks",
            self.current_index,
            self.store.len()
        );
        debug_assert_eq!(
            self.active.is_some(),
            self.status != PlaybackStatus::Idle,
            "device ownership out of sync with status {:?}",
            self.status
        );
        if let Some(active) = self.active {
            debug_assert_eq!(
                self.store.get(self.current_index).map(Track::id),
                Some(active.track_id),
                "active device does not belong to the current track"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DeviceError, LoadError};
    use crate::loader::ResourceHandle;
    use crate::progress::NoopScheduler;
    use std::collections::HashSet;

    /// Device that accepts everything and reports no position
    #[derive(Default)]
    struct SilentDevice {
        next: u64,
        held: HashSet<DeviceHandle>,
    }

    impl PlaybackDevice for SilentDevice {
        fn acquire(&mut self, _resource: &ResourceHandle) -> std::result::Result<DeviceHandle, DeviceError> {
            self.next += 1;
            let handle = DeviceHandle::new(self.next);
            self.held.insert(handle);
            Ok(handle)
        }

        fn play(&mut self, _handle: DeviceHandle) {}

        fn pause(&mut self, _handle: DeviceHandle) {}

        fn release(&mut self, handle: DeviceHandle) {
            assert!(self.held.remove(&handle), "double release of {handle}");
        }

        fn position(&self, _handle: DeviceHandle) -> Duration {
            Duration::ZERO
        }
    }

    /// Loader that accepts names ending in ".mp3"
    #[derive(Default)]
    struct Mp3Loader {
        next: u64,
    }

    impl ResourceLoader for Mp3Loader {
        fn load(&mut self, source: &RawSource) -> std::result::Result<LoadedResource, LoadError> {
            if !source.name.ends_with(".mp3") {
                return Err(LoadError::UnsupportedMediaType(source.name.clone()));
            }
            self.next += 1;
            Ok(LoadedResource {
                resource: ResourceHandle::new(self.next),
                name: source.name.clone(),
                duration: Duration::from_secs(120),
            })
        }

        fn release(&mut self, _resource: ResourceHandle) {}
    }

    fn create_engine() -> PlaylistEngine {
        PlaylistEngine::new(
            EngineConfig::default(),
            Box::new(SilentDevice::default()),
            Box::new(Mp3Loader::default()),
            Box::new(NoopScheduler::default()),
        )
    }

    fn engine_with(names: &[&str]) -> PlaylistEngine {
        let mut engine = create_engine();
        engine.import(names.iter().map(|n| RawSource::from_path(format!("/music/{n}.mp3"))));
        engine.drain_events();
        engine
    }

    #[test]
    fn create_engine_is_idle() {
        let engine = create_engine();
        assert_eq!(engine.status(), PlaybackStatus::Idle);
        assert_eq!(engine.direction(), Direction::Forward);
        assert_eq!(engine.current_index(), None);
        assert!(engine.is_empty());
    }

    #[test]
    fn import_drops_unsupported_sources() {
        let mut engine = create_engine();
        let added = engine.import(vec![
            RawSource::from_path("/music/a.mp3"),
            RawSource::from_path("/music/notes.txt"),
            RawSource::from_path("/music/b.mp3"),
        ]);

        assert_eq!(added.len(), 2);
        assert_eq!(engine.len(), 2);
        assert_eq!(engine.track(1).unwrap().display_name(), "b.mp3");

        let events = engine.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            EngineEvent::ImportRejected { name, .. } if name == "notes.txt"
        )));
    }

    #[test]
    fn track_ids_are_never_reused() {
        let mut engine = engine_with(&["a", "b"]);
        let removed = engine.remove_track(1).unwrap();
        let added = engine.import(vec![RawSource::from_path("/music/c.mp3")]);
        assert_ne!(added[0], removed);
    }

    #[test]
    fn toggle_cycles_idle_playing_paused() {
        let mut engine = engine_with(&["a", "b"]);

        engine.toggle_play_pause();
        assert_eq!(engine.status(), PlaybackStatus::Playing);
        let handle = engine.active_device().unwrap();

        engine.toggle_play_pause();
        assert_eq!(engine.status(), PlaybackStatus::Paused);
        assert_eq!(engine.active_device(), Some(handle));

        engine.toggle_play_pause();
        assert_eq!(engine.status(), PlaybackStatus::Playing);
        assert_eq!(engine.active_device(), Some(handle));
    }

    #[test]
    fn reveal_flag_is_set_once_per_start() {
        let mut engine = engine_with(&["a", "b"]);
        engine.toggle_play_pause();

        let events = engine.drain_events();
        let snapshot = events
            .iter()
            .rev()
            .find_map(|e| match e {
                EngineEvent::StateChanged { snapshot } => Some(snapshot),
                _ => None,
            })
            .unwrap();
        assert!(snapshot.reveal_current);
        assert!(!engine.snapshot().reveal_current);

        engine.move_track(0, 1).unwrap();
        assert!(!engine.snapshot().reveal_current);
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut engine = engine_with(&["a", "b", "c"]);
        engine.toggle_play_pause();
        let first = engine.active_device().unwrap();

        engine.select_track(2).unwrap();
        engine.handle_track_completed(first);

        assert_eq!(engine.current_index(), Some(2));
        assert!(engine.is_playing());
    }

    #[test]
    fn clear_goes_idle_and_empties() {
        let mut engine = engine_with(&["a", "b"]);
        engine.toggle_play_pause();

        engine.clear();
        assert!(engine.is_empty());
        assert_eq!(engine.status(), PlaybackStatus::Idle);
        assert_eq!(engine.active_device(), None);
        assert_eq!(engine.current_index(), None);
    }

    #[test]
    fn import_stops_playback_by_default() {
        let mut engine = engine_with(&["a"]);
        engine.toggle_play_pause();

        engine.import(vec![RawSource::from_path("/music/b.mp3")]);
        assert_eq!(engine.status(), PlaybackStatus::Idle);
    }

    #[test]
    fn append_track_keeps_playing() {
        let mut engine = engine_with(&["a"]);
        engine.toggle_play_pause();

        engine.append_track(LoadedResource {
            resource: ResourceHandle::new(99),
            name: "late.mp3".to_string(),
            duration: Duration::from_secs(30),
        });
        assert!(engine.is_playing());
        assert_eq!(engine.len(), 2);
    }

    #[test]
    fn select_out_of_bounds_is_an_error() {
        let mut engine = engine_with(&["a"]);
        assert_eq!(
            engine.select_track(3).unwrap_err(),
            PlaylistError::IndexOutOfBounds { index: 3, len: 1 }
        );
        assert_eq!(engine.status(), PlaybackStatus::Idle);
    }

    #[test]
    fn select_on_empty_playlist_is_noop() {
        let mut engine = create_engine();
        assert!(engine.select_track(0).is_ok());
        assert_eq!(engine.status(), PlaybackStatus::Idle);
    }
}
