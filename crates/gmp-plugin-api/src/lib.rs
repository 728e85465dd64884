//! Plugin API: the traits a host implements to embed the plugin, and the
//! trait the plugin implements for the host.
//!
//! The host owns command parsing into lines, permission levels, player I/O
//! and world data. The plugin only sees it through [`ServerApi`].

use std::path::PathBuf;

use gmp_world::{Dimension, Position};
use thiserror::Error;

// ─── Types ───────────────────────────────────────────────────────────────────

/// Permission levels as hosts usually number them.
pub mod permission {
    pub const GUEST: u8 = 0;
    pub const USER: u8 = 1;
    pub const HELPER: u8 = 2;
    pub const ADMIN: u8 = 3;
    pub const OWNER: u8 = 4;
}

/// Who sent a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSource {
    Console,
    Player { name: String, permission_level: u8 },
}

impl CommandSource {
    pub fn player(name: impl Into<String>, permission_level: u8) -> Self {
        Self::Player {
            name: name.into(),
            permission_level,
        }
    }

    pub fn is_console(&self) -> bool {
        matches!(self, Self::Console)
    }

    /// Player name, `None` for the console.
    pub fn player_name(&self) -> Option<&str> {
        match self {
            Self::Console => None,
            Self::Player { name, .. } => Some(name),
        }
    }

    /// The console holds every permission.
    pub fn permission_level(&self) -> u8 {
        match self {
            Self::Console => permission::OWNER,
            Self::Player {
                permission_level, ..
            } => *permission_level,
        }
    }

    pub fn has_permission(&self, level: u8) -> bool {
        self.permission_level() >= level
    }
}

/// Failures reported by the host's player data accessors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("player not found: {0}")]
    PlayerNotFound(String),

    #[error("player info unavailable for {player}: {reason}")]
    InfoUnavailable { player: String, reason: String },

    #[error("unknown dimension id {id:?} reported for {player}")]
    UnknownDimension { player: String, id: String },
}

/// Metadata about a plugin.
#[derive(Debug, Clone)]
pub struct PluginInfo {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
}

// ─── Server API ──────────────────────────────────────────────────────────────

/// Host services available to the plugin.
///
/// All methods take `&self`: handlers may run on several worker threads at
/// once, so implementations keep their own state behind locks.
pub trait ServerApi: Send + Sync {
    // --- Paths ---
    /// The game server's working directory (the one holding `world/`).
    fn working_directory(&self) -> PathBuf;
    /// This plugin's own data folder (`plugins/<id>`).
    fn data_folder(&self) -> PathBuf;

    // --- Output ---
    /// Run a console command on the game server.
    fn execute(&self, command: &str);
    /// Send a chat message to one player.
    fn tell(&self, player: &str, message: &str);

    // --- Player data ---
    fn player_dimension(&self, player: &str) -> Result<Dimension, HostError>;
    fn player_position(&self, player: &str) -> Result<Position, HostError>;

    // --- Registration ---
    fn register_help_message(&self, prefix: &str, description: &str);
    /// Route lines starting with `literal` to this plugin.
    fn register_command(&self, literal: &str, description: &str);
}

// ─── Plugin trait ────────────────────────────────────────────────────────────

pub trait Plugin: Send + Sync {
    /// Return plugin metadata.
    fn info(&self) -> PluginInfo;

    /// Load config and state, register commands.
    fn on_load(&mut self, api: &dyn ServerApi);

    /// Flush state before the plugin goes away.
    fn on_unload(&mut self) {}

    /// Handle a line whose first token was registered by this plugin.
    /// Returns the replies for the source, or `None` if the line is not ours.
    fn on_command(
        &self,
        source: &CommandSource,
        line: &str,
        api: &dyn ServerApi,
    ) -> Option<Vec<String>>;

    fn on_player_joined(&self, player: &str, api: &dyn ServerApi) {
        let _ = (player, api);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
