use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub host: HostSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub players: Vec<PlayerSection>,
}

#[derive(Debug, Deserialize)]
pub struct HostSection {
    /// Game server working directory; the plugin keeps its table in
    /// `<working_directory>/world/`.
    #[serde(default = "default_working_directory")]
    pub working_directory: String,
    /// Parent of every plugin's data folder.
    #[serde(default = "default_data_directory")]
    pub data_directory: String,
}

fn default_working_directory() -> String {
    "server".into()
}

fn default_data_directory() -> String {
    "config".into()
}

impl Default for HostSection {
    fn default() -> Self {
        Self {
            working_directory: default_working_directory(),
            data_directory: default_data_directory(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    pub level: String,
}

/// A simulated player known to the host.
#[derive(Debug, Deserialize)]
pub struct PlayerSection {
    pub name: String,
    #[serde(default = "default_permission")]
    pub permission: u8,
    #[serde(default = "default_dimension")]
    pub dimension: String,
    #[serde(default = "default_position")]
    pub position: [f64; 3],
    #[serde(default = "default_online")]
    pub online: bool,
}

fn default_permission() -> u8 {
    1
}

fn default_dimension() -> String {
    "minecraft:overworld".into()
}

fn default_position() -> [f64; 3] {
    [0.0, 64.0, 0.0]
}

fn default_online() -> bool {
    true
}

impl HostConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }
}
