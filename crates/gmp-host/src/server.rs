//! In-process stand-in for a game server: tracks players and applies the
//! handful of console commands the plugin issues.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use gmp_plugin_api::{CommandSource, HostError, ServerApi};
use gmp_world::{Dimension, Position};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::HostConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    #[error("unknown player: {0}")]
    UnknownPlayer(String),

    #[error("unknown dimension: {0}")]
    UnknownDimension(String),

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("unknown game mode: {0}")]
    UnknownGamemode(String),

    #[error("command not simulated: {0}")]
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimPlayer {
    pub dimension: Dimension,
    pub position: Position,
    pub gamemode: String,
    pub permission: u8,
    pub online: bool,
}

pub struct SimulatedServer {
    working_directory: PathBuf,
    data_folder: PathBuf,
    players: Mutex<HashMap<String, SimPlayer>>,
    /// literal → description
    routes: Mutex<BTreeMap<String, String>>,
    help: Mutex<Vec<(String, String)>>,
}

const GAMEMODES: [&str; 4] = ["survival", "creative", "adventure", "spectator"];

impl SimulatedServer {
    pub fn new(working_directory: PathBuf, data_folder: PathBuf) -> Self {
        Self {
            working_directory,
            data_folder,
            players: Mutex::new(HashMap::new()),
            routes: Mutex::new(BTreeMap::new()),
            help: Mutex::new(Vec::new()),
        }
    }

    /// Build from `host.toml`. `plugin_id` names the plugin's data folder.
    pub fn from_config(config: &HostConfig, plugin_id: &str) -> Result<Self, SimError> {
        let server = Self::new(
            PathBuf::from(&config.host.working_directory),
            PathBuf::from(&config.host.data_directory).join(plugin_id),
        );
        for p in &config.players {
            let dimension = Dimension::from_alias(&p.dimension)
                .ok_or_else(|| SimError::UnknownDimension(p.dimension.clone()))?;
            server.add_player(
                &p.name,
                SimPlayer {
                    dimension,
                    position: Position::from(p.position),
                    gamemode: "survival".into(),
                    permission: p.permission,
                    online: p.online,
                },
            );
        }
        Ok(server)
    }

    pub fn add_player(&self, name: &str, player: SimPlayer) {
        self.players().insert(name.to_string(), player);
    }

    #[cfg(test)]
    pub fn player(&self, name: &str) -> Option<SimPlayer> {
        self.players().get(name).cloned()
    }

    /// Sorted snapshot of every known player.
    pub fn list_players(&self) -> Vec<(String, SimPlayer)> {
        let mut all: Vec<_> = self
            .players()
            .iter()
            .map(|(n, p)| (n.clone(), p.clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Mark a player online or offline. Returns `false` for unknown names.
    pub fn set_online(&self, name: &str, online: bool) -> bool {
        match self.players().get_mut(name) {
            Some(p) => {
                p.online = online;
                true
            }
            None => false,
        }
    }

    /// Command source for an online player.
    pub fn source_for(&self, name: &str) -> Result<CommandSource, SimError> {
        match self.players().get(name) {
            Some(p) if p.online => Ok(CommandSource::player(name, p.permission)),
            _ => Err(SimError::UnknownPlayer(name.to_string())),
        }
    }

    /// Whether the first token of `line` was registered by the plugin.
    pub fn is_routed(&self, line: &str) -> bool {
        line.split_whitespace()
            .next()
            .is_some_and(|lit| self.routes().contains_key(lit))
    }

    pub fn help_messages(&self) -> Vec<(String, String)> {
        self.help
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget routes and help entries before a plugin registers again.
    pub fn clear_registrations(&self) {
        self.routes().clear();
        self.help
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Deliver a command reply to its source.
    pub fn reply(&self, source: &CommandSource, message: &str) {
        match source.player_name() {
            Some(name) => self.tell(name, message),
            None => info!(target: "console", "{message}"),
        }
    }

    /// Apply a console command to the simulated world.
    pub fn apply(&self, command: &str) -> Result<(), SimError> {
        let tokens: Vec<&str> = command.split_whitespace().collect();
        match tokens.as_slice() {
            ["gamemode", mode, player] => {
                if !GAMEMODES.contains(mode) {
                    return Err(SimError::UnknownGamemode(mode.to_string()));
                }
                let mut players = self.players();
                let p = players
                    .get_mut(*player)
                    .ok_or_else(|| SimError::UnknownPlayer(player.to_string()))?;
                p.gamemode = mode.to_string();
                Ok(())
            }
            ["execute", "in", dim, "run", "tp", player, x, y, z] => {
                let dimension = Dimension::from_alias(dim)
                    .ok_or_else(|| SimError::UnknownDimension(dim.to_string()))?;
                let position = Position::new(coordinate(x)?, coordinate(y)?, coordinate(z)?);
                let mut players = self.players();
                let p = players
                    .get_mut(*player)
                    .ok_or_else(|| SimError::UnknownPlayer(player.to_string()))?;
                p.dimension = dimension;
                p.position = position;
                Ok(())
            }
            _ => Err(SimError::Unsupported(command.to_string())),
        }
    }

    fn players(&self) -> MutexGuard<'_, HashMap<String, SimPlayer>> {
        self.players.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn routes(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn online_player(&self, name: &str) -> Result<SimPlayer, HostError> {
        match self.players().get(name) {
            Some(p) if p.online => Ok(p.clone()),
            _ => Err(HostError::PlayerNotFound(name.to_string())),
        }
    }
}

fn coordinate(s: &str) -> Result<f64, SimError> {
    s.parse()
        .map_err(|_| SimError::InvalidCoordinate(s.to_string()))
}

impl ServerApi for SimulatedServer {
    fn working_directory(&self) -> PathBuf {
        self.working_directory.clone()
    }

    fn data_folder(&self) -> PathBuf {
        self.data_folder.clone()
    }

    fn execute(&self, command: &str) {
        info!(target: "server", "/{command}");
        match self.apply(command) {
            Ok(()) => {}
            Err(e @ SimError::Unsupported(_)) => debug!("{e}"),
            Err(e) => warn!("Command failed: {e}"),
        }
    }

    fn tell(&self, player: &str, message: &str) {
        info!(target: "chat", "[to {player}] {message}");
    }

    fn player_dimension(&self, player: &str) -> Result<Dimension, HostError> {
        self.online_player(player).map(|p| p.dimension)
    }

    fn player_position(&self, player: &str) -> Result<Position, HostError> {
        self.online_player(player).map(|p| p.position)
    }

    fn register_help_message(&self, prefix: &str, description: &str) {
        self.help
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((prefix.to_string(), description.to_string()));
    }

    fn register_command(&self, literal: &str, description: &str) {
        debug!("Routing {literal} to plugin");
        self.routes()
            .insert(literal.to_string(), description.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> SimulatedServer {
        let s = SimulatedServer::new(PathBuf::from("srv"), PathBuf::from("config/test"));
        s.add_player(
            "Steve",
            SimPlayer {
                dimension: Dimension::Overworld,
                position: Position::new(1.0, 64.0, 1.0),
                gamemode: "survival".into(),
                permission: 1,
                online: true,
            },
        );
        s
    }

    #[test]
    fn gamemode_command() {
        let s = server();
        s.apply("gamemode spectator Steve").unwrap();
        assert_eq!(s.player("Steve").unwrap().gamemode, "spectator");
        assert_eq!(
            s.apply("gamemode hardcore Steve"),
            Err(SimError::UnknownGamemode("hardcore".into()))
        );
        assert_eq!(
            s.apply("gamemode survival Alex"),
            Err(SimError::UnknownPlayer("Alex".into()))
        );
    }

    #[test]
    fn teleport_command() {
        let s = server();
        s.apply("execute in minecraft:the_nether run tp Steve 13 72.5 -12")
            .unwrap();
        let steve = s.player("Steve").unwrap();
        assert_eq!(steve.dimension, Dimension::Nether);
        assert_eq!(steve.position, Position::new(13.0, 72.5, -12.0));
        assert_eq!(
            s.apply("execute in minecraft:the_nether run tp Steve a 1 1"),
            Err(SimError::InvalidCoordinate("a".into()))
        );
        assert!(matches!(
            s.apply("say hello"),
            Err(SimError::Unsupported(_))
        ));
    }

    #[test]
    fn offline_players_are_invisible() {
        let s = server();
        assert!(s.player_dimension("Steve").is_ok());
        assert!(s.set_online("Steve", false));
        assert_eq!(
            s.player_position("Steve"),
            Err(HostError::PlayerNotFound("Steve".into()))
        );
        assert!(s.source_for("Steve").is_err());
        assert!(!s.set_online("Nobody", true));
    }

    #[test]
    fn routing() {
        let s = server();
        assert!(!s.is_routed("!!spec"));
        s.register_command("!!spec", "Toggle");
        assert!(s.is_routed("!!spec help"));
        assert!(!s.is_routed("!!specx"));
        assert!(!s.is_routed(""));
        s.register_help_message("!!spec help", "help");
        s.clear_registrations();
        assert!(!s.is_routed("!!spec"));
        assert!(s.help_messages().is_empty());
    }

    #[test]
    fn source_carries_permission() {
        let s = server();
        assert_eq!(
            s.source_for("Steve").unwrap(),
            CommandSource::player("Steve", 1)
        );
    }
}
