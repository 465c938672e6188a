//! Serializable backtest configuration with content-addressed run IDs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use edgelab_core::engine::EngineConfig;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// On-disk (TOML) configuration for a single backtest run.
///
/// Captures everything needed to reproduce the run: the data file and the
/// full engine configuration. Two identical configs hash to the same
/// `RunId`, so results can be compared or cached by ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Path to the minute-bar CSV file.
    pub data_path: PathBuf,
    pub engine: EngineConfig,
}

impl BacktestConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigFileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigFileError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Deterministic content hash of this configuration.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("BacktestConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
