//! Clock-driven playback device
//!
//! Renders nothing: each acquired device is a stopwatch over the track's
//! probed duration. A tokio timer fires `DeviceSignal::Completed` when the
//! stopwatch reaches the end. Headless hosts and tests use it in place of an
//! audio sink.

use crate::error::{MediaError, Result};
use crate::registry::MediaRegistry;
use loopdeck_engine::{DeviceError, DeviceHandle, DeviceSignal, PlaybackDevice, ResourceHandle};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// One acquired stopwatch
struct Slot {
    path: PathBuf,
    duration: Duration,
    /// Time played before the current run
    banked: Duration,
    /// Start of the current run, if running
    started_at: Option<Instant>,
    timer: Option<JoinHandle<()>>,
}

impl Slot {
    fn elapsed(&self) -> Duration {
        let running = self.started_at.map(|t| t.elapsed()).unwrap_or_default();
        (self.banked + running).min(self.duration)
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Playback device backed by tokio timers
pub struct ClockDevice {
    registry: MediaRegistry,
    signals: UnboundedSender<DeviceSignal>,
    runtime: Handle,
    next_handle: u64,
    slots: HashMap<DeviceHandle, Slot>,
}

impl ClockDevice {
    /// Create a device reporting on `signals`
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(registry: MediaRegistry, signals: UnboundedSender<DeviceSignal>) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| MediaError::NoRuntime)?;

        Ok(Self {
            registry,
            signals,
            runtime,
            next_handle: 0,
            slots: HashMap::new(),
        })
    }

    /// Number of devices currently acquired
    pub fn acquired(&self) -> usize {
        self.slots.len()
    }

    /// Check if the device is running
    pub fn is_running(&self, handle: DeviceHandle) -> bool {
        self.slots
            .get(&handle)
            .is_some_and(|slot| slot.started_at.is_some())
    }

    fn report_failure(&self, handle: DeviceHandle, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(%handle, %reason, "Device failure");
        // Receiver gone means the session is shutting down.
        let _ = self.signals.send(DeviceSignal::Failed { handle, reason });
    }
}

impl PlaybackDevice for ClockDevice {
    fn acquire(&mut self, resource: &ResourceHandle) -> std::result::Result<DeviceHandle, DeviceError> {
        let entry = self
            .registry
            .get(resource.key())
            .ok_or(DeviceError::UnknownResource(resource.key()))?;

        self.next_handle += 1;
        let handle = DeviceHandle::new(self.next_handle);
        self.slots.insert(
            handle,
            Slot {
                path: entry.path,
                duration: entry.duration,
                banked: Duration::ZERO,
                started_at: None,
                timer: None,
            },
        );

        debug!(%handle, key = resource.key(), "Device acquired");
        Ok(handle)
    }

    fn play(&mut self, handle: DeviceHandle) {
        let Some(slot) = self.slots.get_mut(&handle) else {
            self.report_failure(handle, DeviceError::UnknownHandle(handle.get()).to_string());
            return;
        };
        if slot.started_at.is_some() {
            return;
        }
        if !slot.path.exists() {
            let reason = format!("File disappeared: {}", slot.path.display());
            self.report_failure(handle, reason);
            return;
        }

        let remaining = slot.duration.saturating_sub(slot.banked);
        let now = Instant::now();
        let deadline = now + remaining;
        let signals = self.signals.clone();
        slot.started_at = Some(now);
        slot.timer = Some(self.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = signals.send(DeviceSignal::Completed(handle));
        }));

        debug!(%handle, ?remaining, "Device playing");
    }

    fn pause(&mut self, handle: DeviceHandle) {
        let Some(slot) = self.slots.get_mut(&handle) else {
            return;
        };
        if let Some(started_at) = slot.started_at.take() {
            slot.banked += started_at.elapsed();
            slot.stop_timer();
            debug!(%handle, position = ?slot.elapsed(), "Device paused");
        }
    }

    fn release(&mut self, handle: DeviceHandle) {
        if let Some(mut slot) = self.slots.remove(&handle) {
            slot.stop_timer();
            debug!(%handle, "Device released");
        }
    }

    fn position(&self, handle: DeviceHandle) -> Duration {
        self.slots
            .get(&handle)
            .map(Slot::elapsed)
            .unwrap_or(Duration::ZERO)
    }
}

impl Drop for ClockDevice {
    fn drop(&mut self) {
        for slot in self.slots.values_mut() {
            slot.stop_timer();
        }
    }
}
