//! Loopdeck - Local Media
//!
//! Platform pieces the playlist engine needs on a desktop or headless host:
//! - [`FileLoader`]: media-type filter plus lofty duration probe for local files
//! - [`ClockDevice`]: playback device driven by tokio timers
//! - [`TokioTicker`]: progress ticker on a tokio interval
//!
//! Device signals and ticks are delivered over unbounded mpsc channels so the
//! host can feed them back into the engine from a single task.

mod clock;
mod config;
mod error;
mod loader;
mod registry;
mod ticker;

pub use clock::ClockDevice;
pub use config::MediaConfig;
pub use error::{MediaError, Result};
pub use loader::{probe_duration, FileLoader};
pub use registry::{MediaEntry, MediaRegistry};
pub use ticker::TokioTicker;
