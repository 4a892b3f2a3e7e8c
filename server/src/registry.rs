//! Preloaded flags, validated once at startup.

use crate::config::ConfigError;
use std::collections::HashMap;
use std::path::Path;
use switchyard_engine::{FlagConfig, ValidatedFlag};

/// Read-only set of validated flags, keyed by flag key.
#[derive(Debug, Default)]
pub struct FlagRegistry {
    flags: HashMap<String, ValidatedFlag>,
}

impl FlagRegistry {
    /// Load and validate every flag in a JSON file holding an array of configs.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFlags {
            path: path.to_path_buf(),
            source,
        })?;
        let configs: Vec<FlagConfig> =
            serde_json::from_str(&raw).map_err(|source| ConfigError::ParseFlags {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_configs(configs)
    }

    /// Validate a set of configs. Any invalid flag rejects the whole set.
    pub fn from_configs(configs: Vec<FlagConfig>) -> Result<Self, ConfigError> {
        let mut flags = HashMap::with_capacity(configs.len());
        for config in configs {
            let key = config.key.clone();
            if flags.contains_key(&key) {
                return Err(ConfigError::DuplicateFlag(key));
            }
            let validated = config
                .validated()
                .map_err(|source| ConfigError::InvalidFlag {
                    key: key.clone(),
                    source,
                })?;
            flags.insert(key, validated);
        }
        Ok(Self { flags })
    }

    pub fn get(&self, key: &str) -> Option<&ValidatedFlag> {
        self.flags.get(key)
    }

    /// Flag keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<_> = self.flags.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }
}
