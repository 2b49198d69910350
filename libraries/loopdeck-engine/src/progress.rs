//! Progress ticker and readings
//!
//! While a track is playing the engine keeps exactly one periodic ticker
//! alive. Platforms schedule the actual timer; the engine only starts and
//! cancels it and ignores ticks that arrive for a token it no longer holds.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identifies one scheduled ticker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickerToken(u64);

impl TickerToken {
    /// Wrap a scheduler specific value
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Scheduler specific value
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Platform timer for progress updates
///
/// After `start`, the platform calls the engine's `on_progress_tick` with
/// the returned token every `interval` until the token is cancelled.
pub trait TickScheduler: Send {
    /// Start a periodic ticker
    fn start(&mut self, interval: Duration) -> TickerToken;

    /// Cancel a ticker; unknown tokens are ignored
    fn cancel(&mut self, token: TickerToken);
}

/// Scheduler that never ticks
///
/// For hosts that poll `snapshot()` themselves.
#[derive(Debug, Default)]
pub struct NoopScheduler {
    next: u64,
}

impl TickScheduler for NoopScheduler {
    fn start(&mut self, _interval: Duration) -> TickerToken {
        self.next += 1;
        TickerToken::new(self.next)
    }

    fn cancel(&mut self, _token: TickerToken) {}
}

/// Owner of the single live ticker
pub(crate) struct ProgressTicker {
    scheduler: Box<dyn TickScheduler>,
    interval: Duration,
    active: Option<TickerToken>,
}

impl ProgressTicker {
    pub(crate) fn new(scheduler: Box<dyn TickScheduler>, interval: Duration) -> Self {
        Self {
            scheduler,
            interval,
            active: None,
        }
    }

    /// Start a ticker, cancelling any previous one first
    pub(crate) fn restart(&mut self) {
        self.stop();
        self.active = Some(self.scheduler.start(self.interval));
    }

    pub(crate) fn stop(&mut self) {
        if let Some(token) = self.active.take() {
            self.scheduler.cancel(token);
        }
    }

    pub(crate) fn is_current(&self, token: TickerToken) -> bool {
        self.active == Some(token)
    }
}

/// Elapsed/remaining pair for one track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressReading {
    elapsed: Duration,
    total: Duration,
}

impl ProgressReading {
    /// Create a reading, clamping elapsed to the total
    pub fn new(elapsed: Duration, total: Duration) -> Self {
        Self {
            elapsed: elapsed.min(total),
            total,
        }
    }

    /// Elapsed time
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Track duration
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Time left
    pub fn remaining(&self) -> Duration {
        self.total.saturating_sub(self.elapsed)
    }

    /// Progress from 0.0 to 1.0 (0.0 for zero-length tracks)
    pub fn ratio(&self) -> f32 {
        if self.total.is_zero() {
            return 0.0;
        }
        (self.elapsed.as_secs_f64() / self.total.as_secs_f64()).clamp(0.0, 1.0) as f32
    }
}

/// Format a duration as `m:ss`
///
/// Fractions of a second are dropped; minutes are not wrapped into hours.
pub fn format_clock(duration: Duration) -> String {
    let seconds = duration.as_secs();
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
