//! Local file loader
//!
//! Filters raw sources by media type, probes their duration with lofty and
//! registers them in the shared [`MediaRegistry`].

use crate::config::MediaConfig;
use crate::error::{MediaError, Result};
use crate::registry::{MediaEntry, MediaRegistry};
use lofty::AudioFile;
use loopdeck_engine::{LoadError, LoadedResource, RawSource, ResourceHandle, ResourceLoader};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Resource loader for files on the local filesystem
pub struct FileLoader {
    registry: MediaRegistry,
    config: MediaConfig,
}

impl FileLoader {
    /// Create a loader writing into `registry`
    pub fn new(registry: MediaRegistry, config: MediaConfig) -> Self {
        Self { registry, config }
    }

    /// Media type of a source: the declared one, else guessed from the extension
    pub fn media_type_of(source: &RawSource) -> Option<String> {
        source.media_type.clone().or_else(|| {
            mime_guess::from_path(&source.path)
                .first_raw()
                .map(str::to_string)
        })
    }
}

impl ResourceLoader for FileLoader {
    fn load(&mut self, source: &RawSource) -> std::result::Result<LoadedResource, LoadError> {
        let media_type = Self::media_type_of(source).unwrap_or_else(|| "unknown".to_string());
        if !self.config.accepts(&media_type) {
            return Err(LoadError::UnsupportedMediaType(media_type));
        }

        let duration = probe_duration(&source.path).map_err(|e| {
            warn!(path = %source.path.display(), error = %e, "Probe failed");
            e.into_load_error(&source.name)
        })?;

        let resource = self.registry.insert(MediaEntry {
            path: source.path.clone(),
            media_type,
            duration,
        });
        debug!(key = resource.key(), name = %source.name, ?duration, "Loaded");

        Ok(LoadedResource {
            resource,
            name: source.name.clone(),
            duration,
        })
    }

    fn release(&mut self, resource: ResourceHandle) {
        let key = resource.key();
        if self.registry.remove(resource).is_none() {
            warn!(key, "Released unknown resource");
        }
    }
}

/// Read the playback duration of an audio file
pub fn probe_duration(path: &Path) -> Result<Duration> {
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let tagged_file = lofty::read_from_path(path)?;
    Ok(tagged_file.properties().duration())
}
