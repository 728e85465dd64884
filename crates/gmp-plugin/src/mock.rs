//! Recording host used by the handler tests.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use gmp_plugin_api::{HostError, Plugin, ServerApi};
use gmp_world::{Dimension, Position};

use crate::store::SpecStore;
use crate::{GamemodePlus, PLUGIN_ID};

pub struct MockApi {
    root: PathBuf,
    players: Mutex<HashMap<String, (Dimension, Position)>>,
    executed: Mutex<Vec<String>>,
    told: Mutex<Vec<(String, String)>>,
    helps: Mutex<Vec<(String, String)>>,
    commands: Mutex<Vec<String>>,
    fail_position: AtomicBool,
}

impl MockApi {
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("gmp_plugin_{}", rand::random::<u64>()));
        fs::create_dir_all(&root).unwrap();
        Self {
            root,
            players: Mutex::new(HashMap::new()),
            executed: Mutex::new(Vec::new()),
            told: Mutex::new(Vec::new()),
            helps: Mutex::new(Vec::new()),
            commands: Mutex::new(Vec::new()),
            fail_position: AtomicBool::new(false),
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    pub fn data_folder_path(&self) -> PathBuf {
        self.root.join("plugins").join(PLUGIN_ID)
    }

    /// Add or move a player.
    pub fn add_player(&self, name: &str, dim: Dimension, pos: Position) {
        self.players
            .lock()
            .unwrap()
            .insert(name.to_string(), (dim, pos));
    }

    pub fn remove_player(&self, name: &str) {
        self.players.lock().unwrap().remove(name);
    }

    pub fn fail_position(&self, fail: bool) {
        self.fail_position.store(fail, Ordering::SeqCst);
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn told(&self, player: &str) -> Vec<String> {
        self.told
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == player)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn help_messages(&self) -> Vec<(String, String)> {
        self.helps.lock().unwrap().clone()
    }

    pub fn registered_commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    /// Forget executed commands and messages.
    pub fn clear(&self) {
        self.executed.lock().unwrap().clear();
        self.told.lock().unwrap().clear();
    }

    pub fn data_file_contains(&self, needle: &str) -> bool {
        fs::read_to_string(SpecStore::data_path(&self.root))
            .map(|s| s.contains(needle))
            .unwrap_or(false)
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        fs::remove_dir_all(&self.root).ok();
    }
}

impl ServerApi for MockApi {
    fn working_directory(&self) -> PathBuf {
        self.root.clone()
    }

    fn data_folder(&self) -> PathBuf {
        self.data_folder_path()
    }

    fn execute(&self, command: &str) {
        self.executed.lock().unwrap().push(command.to_string());
    }

    fn tell(&self, player: &str, message: &str) {
        self.told
            .lock()
            .unwrap()
            .push((player.to_string(), message.to_string()));
    }

    fn player_dimension(&self, player: &str) -> Result<Dimension, HostError> {
        self.players
            .lock()
            .unwrap()
            .get(player)
            .map(|(dim, _)| *dim)
            .ok_or_else(|| HostError::PlayerNotFound(player.to_string()))
    }

    fn player_position(&self, player: &str) -> Result<Position, HostError> {
        if self.fail_position.load(Ordering::SeqCst) {
            return Err(HostError::InfoUnavailable {
                player: player.to_string(),
                reason: "timed out".into(),
            });
        }
        self.players
            .lock()
            .unwrap()
            .get(player)
            .map(|(_, pos)| *pos)
            .ok_or_else(|| HostError::PlayerNotFound(player.to_string()))
    }

    fn register_help_message(&self, prefix: &str, description: &str) {
        self.helps
            .lock()
            .unwrap()
            .push((prefix.to_string(), description.to_string()));
    }

    fn register_command(&self, literal: &str, _description: &str) {
        self.commands.lock().unwrap().push(literal.to_string());
    }
}

/// A plugin loaded against `api`.
pub fn loaded(api: &MockApi) -> GamemodePlus {
    let mut plugin = GamemodePlus::new();
    plugin.on_load(api);
    plugin
}
