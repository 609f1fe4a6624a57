//! Configuration for the thumbnail generator and views.
//!
//! Loaded from a TOML file; every field has a default so partial files work:
//!
//! ```toml
//! log_level = "debug"
//!
//! [generator]
//! worker_threads = 4
//!
//! [view]
//! thumbnail_width = 240
//! thumbnail_height = 135
//! show_thumbnail = true
//! fit = "stretch"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::decode::FitMode;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_level: String,
    pub generator: GeneratorConfig,
    pub view: ViewConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            generator: GeneratorConfig::default(),
            view: ViewConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

/// Worker pool settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of decode threads; 0 is treated as 1
    pub worker_threads: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { worker_threads: 2 }
    }
}

/// Initial property values for a new `ThumbnailView`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
    pub thumbnail_width: f32,
    pub thumbnail_height: f32,
    pub show_thumbnail: bool,
    pub fit: FitMode,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            thumbnail_width: 160.0,
            thumbnail_height: 90.0,
            show_thumbnail: true,
            fit: FitMode::Fill,
        }
    }
}
