//! Platform-agnostic playback device trait
//!
//! Abstracts whatever actually renders audio (a sound card sink, a headless
//! clock, a test double) so the engine only deals in handles.

use crate::error::DeviceError;
use crate::loader::ResourceHandle;
use std::fmt;
use std::time::Duration;

/// Handle to one acquired device
///
/// Issued by [`PlaybackDevice::acquire`]. Handles are never reused by a
/// device, which lets the engine recognise signals from a preempted track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceHandle(u64);

impl DeviceHandle {
    /// Wrap a device specific value
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Device specific value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dev-{}", self.0)
    }
}

/// Asynchronous notifications from a playback device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSignal {
    /// The track played through to its end
    Completed(DeviceHandle),

    /// Loading or playback failed
    Failed {
        /// Handle that failed
        handle: DeviceHandle,
        /// Human readable cause
        reason: String,
    },
}

impl DeviceSignal {
    /// Handle the signal refers to
    pub fn handle(&self) -> DeviceHandle {
        match self {
            DeviceSignal::Completed(handle) | DeviceSignal::Failed { handle, .. } => *handle,
        }
    }
}

/// Platform playback device
///
/// All requests are fire-and-forget from the engine's point of view:
/// problems after `acquire` are reported later as [`DeviceSignal::Failed`].
pub trait PlaybackDevice: Send {
    /// Prepare a device for the given resource
    fn acquire(&mut self, resource: &ResourceHandle) -> Result<DeviceHandle, DeviceError>;

    /// Start or resume rendering
    fn play(&mut self, handle: DeviceHandle);

    /// Suspend rendering, keeping the position
    fn pause(&mut self, handle: DeviceHandle);

    /// Stop rendering and drop the device
    fn release(&mut self, handle: DeviceHandle);

    /// Elapsed position of the device
    ///
    /// Returns `Duration::ZERO` for unknown handles.
    fn position(&self, handle: DeviceHandle) -> Duration;
}
