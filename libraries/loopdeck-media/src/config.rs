use serde::{Deserialize, Serialize};

/// Media loading configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Media types the loader accepts (default: `["audio/mpeg"]`)
    pub accepted_media_types: Vec<String>,
}

impl MediaConfig {
    /// Check whether a media type is accepted (case-insensitive)
    pub fn accepts(&self, media_type: &str) -> bool {
        self.accepted_media_types
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(media_type))
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            accepted_media_types: vec!["audio/mpeg".to_string()],
        }
    }
}
