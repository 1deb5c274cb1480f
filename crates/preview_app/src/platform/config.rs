//! Configuration file loading for the preview app.
//!
//! The file is RON. A missing file means defaults; anything else that goes
//! wrong is reported so the caller can warn and fall back.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine_logging::engine_info;
use preview_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub log: LogDestination,
    /// Seed the buffer with the built-in sample when `engine.seed` is unset.
    pub seed_sample: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            log: LogDestination::default(),
            seed_sample: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Ok(AppConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    engine_info!("Loaded configuration from {:?}", path);
    Ok(config)
}
