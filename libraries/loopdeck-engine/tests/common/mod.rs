//! Shared test doubles for engine integration tests

#![allow(dead_code)]

use loopdeck_engine::{
    DeviceError, DeviceHandle, EngineConfig, LoadError, LoadedResource, PlaybackDevice,
    PlaylistEngine, RawSource, ResourceHandle, ResourceLoader, TickScheduler, TickerToken, TrackId,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ===== Device =====

/// Calls seen by the mock device, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    Acquire { resource: u64, handle: DeviceHandle },
    Play(DeviceHandle),
    Pause(DeviceHandle),
    Release(DeviceHandle),
}

#[derive(Debug, Default)]
pub struct DeviceLog {
    pub calls: Vec<DeviceCall>,
    pub held: HashSet<DeviceHandle>,
    pub positions: HashMap<DeviceHandle, Duration>,
    /// Resource keys whose acquisition fails
    pub failing: HashSet<u64>,
    /// Set when a device was acquired while another was still held
    pub overlapped: bool,
}

/// Device double that records every call
pub struct MockDevice {
    log: Arc<Mutex<DeviceLog>>,
    next: u64,
}

impl PlaybackDevice for MockDevice {
    fn acquire(&mut self, resource: &ResourceHandle) -> Result<DeviceHandle, DeviceError> {
        let mut log = self.log.lock().unwrap();
        if log.failing.contains(&resource.key()) {
            return Err(DeviceError::Backend(format!("cannot open {}", resource.key())));
        }

        self.next += 1;
        let handle = DeviceHandle::new(self.next);
        if !log.held.is_empty() {
            log.overlapped = true;
        }
        log.held.insert(handle);
        log.calls.push(DeviceCall::Acquire {
            resource: resource.key(),
            handle,
        });
        Ok(handle)
    }

    fn play(&mut self, handle: DeviceHandle) {
        self.log.lock().unwrap().calls.push(DeviceCall::Play(handle));
    }

    fn pause(&mut self, handle: DeviceHandle) {
        self.log.lock().unwrap().calls.push(DeviceCall::Pause(handle));
    }

    fn release(&mut self, handle: DeviceHandle) {
        let mut log = self.log.lock().unwrap();
        assert!(log.held.remove(&handle), "release of unheld {handle}");
        log.calls.push(DeviceCall::Release(handle));
    }

    fn position(&self, handle: DeviceHandle) -> Duration {
        self.log
            .lock()
            .unwrap()
            .positions
            .get(&handle)
            .copied()
            .unwrap_or(Duration::ZERO)
    }
}

// ===== Loader =====

#[derive(Debug, Default)]
pub struct LoaderLog {
    pub live: HashSet<u64>,
    pub released: Vec<u64>,
}

/// Loader double: accepts `.mp3`, takes the duration from `durations`
/// (180s when absent)
pub struct MockLoader {
    log: Arc<Mutex<LoaderLog>>,
    durations: HashMap<String, Duration>,
    next: u64,
}

impl ResourceLoader for MockLoader {
    fn load(&mut self, source: &RawSource) -> Result<LoadedResource, LoadError> {
        if !source.name.ends_with(".mp3") {
            return Err(LoadError::UnsupportedMediaType(source.name.clone()));
        }

        self.next += 1;
        self.log.lock().unwrap().live.insert(self.next);
        Ok(LoadedResource {
            resource: ResourceHandle::new(self.next),
            name: source.name.trim_end_matches(".mp3").to_string(),
            duration: self
                .durations
                .get(&source.name)
                .copied()
                .unwrap_or(Duration::from_secs(180)),
        })
    }

    fn release(&mut self, resource: ResourceHandle) {
        let mut log = self.log.lock().unwrap();
        assert!(log.live.remove(&resource.key()), "double release");
        log.released.push(resource.key());
    }
}

// ===== Scheduler =====

#[derive(Debug, Default)]
pub struct TickLog {
    pub next: u64,
    pub live: HashSet<TickerToken>,
}

pub struct MockScheduler {
    log: Arc<Mutex<TickLog>>,
}

impl TickScheduler for MockScheduler {
    fn start(&mut self, _interval: Duration) -> TickerToken {
        let mut log = self.log.lock().unwrap();
        log.next += 1;
        let token = TickerToken::new(log.next);
        log.live.insert(token);
        token
    }

    fn cancel(&mut self, token: TickerToken) {
        self.log.lock().unwrap().live.remove(&token);
    }
}

// ===== Harness =====

/// Engine plus handles into its doubles
pub struct Harness {
    pub engine: PlaylistEngine,
    pub device: Arc<Mutex<DeviceLog>>,
    pub loader: Arc<Mutex<LoaderLog>>,
    pub ticks: Arc<Mutex<TickLog>>,
}

impl Harness {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_durations(config, HashMap::new())
    }

    pub fn with_durations(config: EngineConfig, durations: HashMap<String, Duration>) -> Self {
        let device = Arc::new(Mutex::new(DeviceLog::default()));
        let loader = Arc::new(Mutex::new(LoaderLog::default()));
        let ticks = Arc::new(Mutex::new(TickLog::default()));

        let engine = PlaylistEngine::new(
            config,
            Box::new(MockDevice {
                log: device.clone(),
                next: 0,
            }),
            Box::new(MockLoader {
                log: loader.clone(),
                durations,
                next: 0,
            }),
            Box::new(MockScheduler { log: ticks.clone() }),
        );

        Self {
            engine,
            device,
            loader,
            ticks,
        }
    }

    /// Harness with default config and tracks named after `names`
    pub fn with_tracks(names: &[&str]) -> Self {
        let mut harness = Self::new(EngineConfig::default());
        harness.add(names);
        harness
    }

    pub fn add(&mut self, names: &[&str]) -> Vec<TrackId> {
        let ids = self
            .engine
            .import(names.iter().map(|n| RawSource::from_path(format!("/music/{n}.mp3"))));
        self.engine.drain_events();
        ids
    }

    pub fn names(&self) -> Vec<String> {
        self.engine
            .tracks()
            .map(|t| t.display_name().to_string())
            .collect()
    }

    pub fn ids(&self) -> Vec<TrackId> {
        self.engine.tracks().map(|t| t.id()).collect()
    }

    /// Display name of the track owning the device
    pub fn playing_name(&self) -> Option<String> {
        let id = self.engine.active_track_id()?;
        self.engine
            .tracks()
            .find(|t| t.id() == id)
            .map(|t| t.display_name().to_string())
    }

    pub fn held_devices(&self) -> usize {
        self.device.lock().unwrap().held.len()
    }

    pub fn live_tickers(&self) -> usize {
        self.ticks.lock().unwrap().live.len()
    }

    pub fn live_ticker(&self) -> Option<TickerToken> {
        self.ticks.lock().unwrap().live.iter().next().copied()
    }

    pub fn device_calls(&self) -> Vec<DeviceCall> {
        self.device.lock().unwrap().calls.clone()
    }

    pub fn fail_resource(&self, key: u64) {
        self.device.lock().unwrap().failing.insert(key);
    }

    pub fn set_position(&self, position: Duration) {
        let handle = self.engine.active_device().expect("no active device");
        self.device
            .lock()
            .unwrap()
            .positions
            .insert(handle, position);
    }

    /// Simulate natural completion of the active device
    pub fn complete(&mut self) {
        let handle = self.engine.active_device().expect("no active device");
        self.engine.handle_track_completed(handle);
    }
}
