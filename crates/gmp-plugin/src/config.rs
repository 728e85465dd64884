//! Plugin configuration (`config.json` in the plugin data folder).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ConfigError;

pub const CONFIG_FILE: &str = "config.json";

/// Permission levels per command, plus whether the short `!!spec` aliases are
/// registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    pub short_command: bool,
    /// `!!spec` on yourself.
    pub spec: u8,
    /// `!!spec <player>`.
    pub spec_other: u8,
    pub tp: u8,
    pub back: u8,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            short_command: true,
            spec: 1,
            spec_other: 2,
            tp: 1,
            back: 1,
        }
    }
}

impl PluginConfig {
    /// Load `config.json` from `data_folder`, writing defaults when the file
    /// is missing and filling in any keys it lacks. A file that does not parse
    /// is left alone and the defaults are used.
    pub fn load_or_create(data_folder: &Path) -> Self {
        let path = data_folder.join(CONFIG_FILE);
        if !path.exists() {
            let config = Self::default();
            match config.save(&path) {
                Ok(()) => info!("Wrote default config to {}", path.display()),
                Err(e) => warn!("{e}"),
            }
            return config;
        }

        match Self::load(&path) {
            Ok((config, complete)) => {
                if !complete {
                    debug!("Filling missing keys in {}", path.display());
                    if let Err(e) = config.save(&path) {
                        warn!("{e}");
                    }
                }
                config
            }
            Err(e) => {
                warn!("{e}, using defaults");
                Self::default()
            }
        }
    }

    /// Parse a config file. The flag is `false` when some keys were missing
    /// and took their default values.
    pub fn load(path: &Path) -> Result<(Self, bool), ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let json_err = |source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        };
        let raw: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&contents).map_err(json_err)?;
        let complete = Self::keys().iter().all(|k| raw.contains_key(*k));
        let config: Self =
            serde_json::from_value(serde_json::Value::Object(raw)).map_err(json_err)?;
        Ok((config, complete))
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(io_err)
    }

    fn keys() -> [&'static str; 5] {
        ["short_command", "spec", "spec_other", "tp", "back"]
    }
}
