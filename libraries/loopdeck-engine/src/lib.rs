//! Loopdeck - Playlist Engine
//!
//! Platform-agnostic playlist sequencing and playback control.
//!
//! This crate provides:
//! - Ordered playlist (append, remove, move, rename, clear)
//! - Playback state machine (Idle, Playing, Paused)
//! - Forward and reverse direction with wrap-around in both
//! - Exclusive ownership of a single playback device
//! - Current-index reconciliation across every list mutation
//! - Progress readings for the playing track
//!
//! # Architecture
//!
//! `loopdeck-engine` never touches files, audio hardware or timers:
//! - Media loading goes through [`ResourceLoader`]
//! - Rendering goes through [`PlaybackDevice`]
//! - Periodic progress goes through [`TickScheduler`]
//!
//! Commands run synchronously and to completion. Observers drain
//! [`EngineEvent`]s afterwards; device completions and ticks are fed back in
//! as commands of their own.
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use loopdeck_engine::{
//!     DeviceError, DeviceHandle, EngineConfig, LoadError, LoadedResource, NoopScheduler,
//!     PlaybackDevice, PlaybackStatus, PlaylistEngine, RawSource, ResourceHandle, ResourceLoader,
//! };
//! use std::time::Duration;
//!
//! struct NullDevice(u64);
//!
//! impl PlaybackDevice for NullDevice {
//!     fn acquire(&mut self, _resource: &ResourceHandle) -> Result<DeviceHandle, DeviceError> {
//!         self.0 += 1;
//!         Ok(DeviceHandle::new(self.0))
//!     }
//!     fn play(&mut self, _handle: DeviceHandle) {}
//!     fn pause(&mut self, _handle: DeviceHandle) {}
//!     fn release(&mut self, _handle: DeviceHandle) {}
//!     fn position(&self, _handle: DeviceHandle) -> Duration {
//!         Duration::ZERO
//!     }
//! }
//!
//! struct FixedLoader(u64);
//!
//! impl ResourceLoader for FixedLoader {
//!     fn load(&mut self, source: &RawSource) -> Result<LoadedResource, LoadError> {
//!         self.0 += 1;
//!         Ok(LoadedResource {
//!             resource: ResourceHandle::new(self.0),
//!             name: source.name.clone(),
//!             duration: Duration::from_secs(180),
//!         })
//!     }
//!     fn release(&mut self, _resource: ResourceHandle) {}
//! }
//!
//! let mut engine = PlaylistEngine::new(
//!     EngineConfig::default(),
//!     Box::new(NullDevice(0)),
//!     Box::new(FixedLoader(0)),
//!     Box::new(NoopScheduler::default()),
//! );
//!
//! engine.import(vec![
//!     RawSource::from_path("/music/intro.mp3"),
//!     RawSource::from_path("/music/outro.mp3"),
//! ]);
//!
//! engine.toggle_play_pause();
//! assert_eq!(engine.status(), PlaybackStatus::Playing);
//! assert_eq!(engine.current_index(), Some(0));
//!
//! // Renderers redraw from drained events
//! for event in engine.drain_events() {
//!     println!("{event:?}");
//! }
//! ```

mod cursor;
mod device;
mod engine;
mod error;
mod events;
mod loader;
mod progress;
mod store;
pub mod types;

// Public exports
pub use cursor::{reconcile, ListChange};
pub use device::{DeviceHandle, DeviceSignal, PlaybackDevice};
pub use engine::PlaylistEngine;
pub use error::{DeviceError, LoadError, PlaylistError, Result};
pub use events::{EngineEvent, PlaylistSnapshot, TrackView};
pub use loader::{LoadedResource, RawSource, ResourceHandle, ResourceLoader};
pub use progress::{format_clock, NoopScheduler, ProgressReading, TickScheduler, TickerToken};
pub use store::{PlaylistStore, Track};
pub use types::{DeviceFailurePolicy, Direction, EngineConfig, PlaybackStatus, TrackId};
