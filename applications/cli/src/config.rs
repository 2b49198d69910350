/// Loopdeck configuration
use crate::error::{CliError, Result};
use loopdeck_engine::EngineConfig;
use loopdeck_media::MediaConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "loopdeck.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoopdeckConfig {
    pub engine: EngineConfig,
    pub media: MediaConfig,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// Tracing filter directive; `RUST_LOG` wins when set
    pub filter: String,

    /// Print engine events as JSON lines instead of text
    pub json_events: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json_events: false,
        }
    }
}

fn default_filter() -> String {
    "loopdeck=info,loopdeck_cli=info,loopdeck_engine=info,loopdeck_media=info".to_string()
}

impl LoopdeckConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) if !path.exists() => {
                return Err(CliError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables, e.g. LOOPDECK_ENGINE__FAILURE_POLICY=stop
        settings = settings.add_source(
            config::Environment::with_prefix("LOOPDECK")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("media.accepted_media_types")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.engine.progress_interval_ms == 0 {
            return Err(CliError::Config(
                "engine.progress_interval_ms must be greater than zero".to_string(),
            ));
        }

        if self.media.accepted_media_types.is_empty() {
            return Err(CliError::Config(
                "media.accepted_media_types must list at least one type".to_string(),
            ));
        }

        Ok(())
    }
}
