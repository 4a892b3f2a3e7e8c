//! Configuration management for the server.

use std::env;
use std::path::PathBuf;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// JSON file holding an array of flag configs to preload
    pub flags_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let flags_path = env::var("FLAGS_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            host,
            port,
            flags_path,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("Failed to read flags file {}: {source}", .path.display())]
    ReadFlags {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse flags file {}: {source}", .path.display())]
    ParseFlags {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid flag '{key}': {source}")]
    InvalidFlag {
        key: String,
        source: switchyard_engine::Error,
    },

    #[error("Duplicate flag key: {0}")]
    DuplicateFlag(String),
}
