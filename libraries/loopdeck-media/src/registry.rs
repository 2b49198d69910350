//! Shared table of loaded media
//!
//! The loader fills it, the clock device reads from it. Keys are the values
//! wrapped by [`ResourceHandle`].

use loopdeck_engine::ResourceHandle;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Probed media file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEntry {
    /// File location
    pub path: PathBuf,
    /// Media type the file was accepted as
    pub media_type: String,
    /// Duration reported by the probe
    pub duration: Duration,
}

#[derive(Debug, Default)]
struct Inner {
    next_key: u64,
    entries: HashMap<u64, MediaEntry>,
}

/// Cloneable handle to the shared media table
#[derive(Debug, Clone, Default)]
pub struct MediaRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl MediaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry and hand out the resource that owns it
    pub fn insert(&self, entry: MediaEntry) -> ResourceHandle {
        let mut inner = self.lock();
        inner.next_key += 1;
        let key = inner.next_key;
        inner.entries.insert(key, entry);
        ResourceHandle::new(key)
    }

    /// Drop the entry owned by `resource`
    pub fn remove(&self, resource: ResourceHandle) -> Option<MediaEntry> {
        self.lock().entries.remove(&resource.key())
    }

    /// Look up an entry by resource key
    pub fn get(&self, key: u64) -> Option<MediaEntry> {
        self.lock().entries.get(&key).cloned()
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Check if no media is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A poisoned lock only means another thread panicked mid-insert; the map
    // itself is still consistent.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
