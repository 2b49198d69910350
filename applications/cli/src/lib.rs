//! Loopdeck CLI Library
//!
//! Headless terminal front-end for the playlist engine: configuration,
//! command parsing, rendering and the interactive session loop.
//!
//! This library exposes the components for testing purposes.

pub mod command;
pub mod config;
pub mod error;
pub mod render;
pub mod session;

// Re-export commonly used types for convenience
pub use command::Command;
pub use config::LoopdeckConfig;
pub use error::{CliError, Result};
pub use render::{OutputFormat, Renderer};
pub use session::{Flow, Session};
