use loopdeck_engine::LoadError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while probing or playing local media
#[derive(Debug, Error)]
pub enum MediaError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Lofty error
    #[error("Metadata error: {0}")]
    Lofty(#[from] lofty::error::LoftyError),

    /// Timers need a tokio runtime
    #[error("No tokio runtime available")]
    NoRuntime,
}

impl MediaError {
    /// Convert into the engine's loader error for the named source
    pub fn into_load_error(self, name: &str) -> LoadError {
        LoadError::Unreadable {
            name: name.to_string(),
            reason: self.to_string(),
        }
    }
}

/// Result type for media operations
pub type Result<T> = std::result::Result<T, MediaError>;
