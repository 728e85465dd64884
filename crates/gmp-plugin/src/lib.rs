//! Spectator/survival toggle with dimension teleport and a one-deep "back".
//!
//! Players in spectator mode are tracked in a [`SpecStore`] so that leaving
//! spectator mode puts them back exactly where they entered it.

pub mod commands;
pub mod config;
pub mod error;
pub mod migrate;
pub mod store;

#[cfg(test)]
mod mock;

use std::path::PathBuf;

use gmp_command::{CommandError, CommandRegistry};
use gmp_plugin_api::{CommandSource, Plugin, PluginInfo, ServerApi};
use tracing::{debug, error, info};

pub use config::PluginConfig;
pub use error::{ConfigError, StoreError};
pub use store::{Location, SpecEntry, SpecStore};

pub const PLUGIN_ID: &str = "gamemode_plus";

pub struct GamemodePlus {
    config: PluginConfig,
    store: SpecStore,
    registry: CommandRegistry,
}

impl GamemodePlus {
    /// Unloaded plugin: default config, empty table, no commands.
    pub fn new() -> Self {
        Self {
            config: PluginConfig::default(),
            store: SpecStore::new(PathBuf::from("world").join(store::DATA_FILE)),
            registry: CommandRegistry::new(),
        }
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn store(&self) -> &SpecStore {
        &self.store
    }

    /// Save the table, logging failures. Handlers never fail on a save error.
    fn persist(&self) {
        if let Err(e) = self.store.save() {
            error!("Failed to save spectator data: {e}");
        }
    }
}

impl Default for GamemodePlus {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for GamemodePlus {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            id: PLUGIN_ID.into(),
            name: "Gamemode Plus".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            description: "Spectator toggle, dimension teleport and back".into(),
        }
    }

    fn on_load(&mut self, api: &dyn ServerApi) {
        let data_folder = api.data_folder();
        self.config = PluginConfig::load_or_create(&data_folder);

        let data_path = SpecStore::data_path(&api.working_directory());
        match migrate::migrate_legacy(&data_folder, &data_path) {
            Ok(Some(from)) => info!("Imported legacy data from {}", from.display()),
            Ok(None) => {}
            Err(e) => error!("Legacy data migration failed: {e}"),
        }
        self.store = SpecStore::open(data_path);
        info!(
            "Loaded {} spectator entries from {}",
            self.store.len(),
            self.store.path().display()
        );

        self.registry = commands::build_registry(&self.config);
        api.register_help_message(commands::HELP_PREFIX, "Gamemode Plus help");
        for literal in self.registry.literals() {
            if let Some(entry) = self.registry.resolve(literal) {
                api.register_command(literal, &entry.description);
            }
        }
    }

    fn on_unload(&mut self) {
        self.persist();
    }

    fn on_command(
        &self,
        source: &CommandSource,
        line: &str,
        api: &dyn ServerApi,
    ) -> Option<Vec<String>> {
        let invocation = match self.registry.dispatch(source.permission_level(), line) {
            Ok(inv) => inv,
            Err(CommandError::Unknown(_) | CommandError::Empty) => return None,
            Err(e @ CommandError::PermissionDenied { .. }) => return Some(vec![format!("§c{e}")]),
        };

        let result = match invocation.name.as_str() {
            commands::SPEC => self.cmd_spec(source, &invocation.args, api),
            commands::TP => self.cmd_tp(source, &invocation.args, api),
            commands::BACK => self.cmd_back(source, &invocation.args, api),
            _ => return None,
        };
        if !result.success {
            debug!("{line:?} from {source:?} failed: {:?}", result.messages);
        }
        Some(result.messages)
    }

    fn on_player_joined(&self, player: &str, api: &dyn ServerApi) {
        if self.store.contains(player) {
            api.execute(&commands::gamemode_command("spectator", player));
            info!("{player} rejoined while in spectator mode");
        }
    }
}
