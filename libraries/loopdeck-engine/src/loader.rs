//! Resource loading capability
//!
//! Turns raw file handles into playable resources. The engine never reads
//! media itself; platforms provide a [`ResourceLoader`].

use crate::error::LoadError;
use std::path::PathBuf;
use std::time::Duration;

/// Opaque handle to loaded media
///
/// Owned by exactly one track. Not `Clone`: the only way to get rid of it is
/// to hand it back through [`ResourceLoader::release`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ResourceHandle(u64);

impl ResourceHandle {
    /// Wrap a loader specific key
    pub fn new(key: u64) -> Self {
        Self(key)
    }

    /// Loader specific key
    pub fn key(&self) -> u64 {
        self.0
    }
}

/// A raw file as handed over by drag-and-drop or a file picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSource {
    /// File name as presented to the user
    pub name: String,

    /// Location of the file
    pub path: PathBuf,

    /// Media type declared by the picker, if any
    pub media_type: Option<String>,
}

impl RawSource {
    /// Build a raw source from a path, using the file name as display name
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            name,
            path,
            media_type: None,
        }
    }

    /// Attach a declared media type
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }
}

/// Result of a successful load
#[derive(Debug)]
pub struct LoadedResource {
    /// Handle to the playable media
    pub resource: ResourceHandle,

    /// Initial display name
    pub name: String,

    /// Duration discovered while loading
    pub duration: Duration,
}

/// Platform resource loader
///
/// `load` must have resolved the duration by the time it returns; a track
/// is only appended once its duration is known.
pub trait ResourceLoader: Send {
    /// Load a raw source
    ///
    /// # Returns
    /// * `Ok(resource)` - Media is playable
    /// * `Err(LoadError::UnsupportedMediaType)` - Not an accepted audio type
    /// * `Err(LoadError::Unreadable)` - File could not be probed
    fn load(&mut self, source: &RawSource) -> Result<LoadedResource, LoadError>;

    /// Release a resource that is no longer owned by any track
    fn release(&mut self, resource: ResourceHandle);
}
