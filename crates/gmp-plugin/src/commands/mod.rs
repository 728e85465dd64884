//! Chat command handlers: `!!spec`, `!!tp`, `!!back`.

mod back;
mod mode;
mod teleport;

use gmp_command::CommandRegistry;
use gmp_plugin_api::{HostError, ServerApi};
use gmp_world::{Dimension, Position};

use crate::config::PluginConfig;
use crate::store::Location;

pub const SPEC: &str = "!!spec";
pub const TP: &str = "!!tp";
pub const BACK: &str = "!!back";

/// Extra literals for `!!spec` when `short_command` is on. Includes the
/// full-width `！` that CJK input methods produce.
pub const SHORT_SPEC_ALIASES: [&str; 8] = ["!s", "！s", "!c", "！c", "!S", "！S", "!C", "！C"];

pub const HELP_PREFIX: &str = "!!spec help";

pub const HELP_MESSAGE: &str = "§6!!spec §7Toggle spectator/survival
§6!!spec <player> §7Toggle another player's mode
§6!!tp [dimension] [position] §7Teleport to a location
§6!!back §7Return to the previous location";

const PLAYERS_ONLY: &str = "§cOnly players can use this command";
const SPECTATOR_ONLY: &str = "§cYou can only teleport in spectator mode";
const NO_PERMISSION: &str = "§cYou do not have permission to switch other players";
const MODE_FAILED: &str = "§cFailed to switch game mode";
const NO_SUCH_DIMENSION: &str = "§cNo such dimension";
const ALREADY_IN_DIMENSION: &str = "§cYou are already in this dimension!";
const INVALID_COORDINATES: &str = "§cInvalid coordinates";
const DIMENSION_UNAVAILABLE: &str = "§cUnable to read your current dimension";
const POSITION_UNAVAILABLE: &str = "§cUnable to read your current position";
const TELEPORT_FAILED: &str = "§cAn error occurred while teleporting";
const BACK_FAILED: &str = "§cAn error occurred while returning to the previous location";
const RETURNED: &str = "§aTeleported you to the previous location";

const SPEC_USAGE: &str = "§cUsage: !!spec [help|<player>]";
const TP_USAGE: &str = "§cUsage: !!tp <dimension> | !!tp <x> <y> <z> | !!tp <dimension> <x> <y> <z>";
const BACK_USAGE: &str = "§cUsage: !!back";

/// Root literals with the permission levels from `config`.
pub fn build_registry(config: &PluginConfig) -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    let spec_aliases: &[&str] = if config.short_command {
        &SHORT_SPEC_ALIASES
    } else {
        &[]
    };
    registry.register(SPEC, spec_aliases, "Toggle spectator/survival", config.spec);
    registry.register(TP, &[], "Teleport to a dimension or position", config.tp);
    registry.register(BACK, &[], "Return to the previous location", config.back);
    registry
}

/// `execute in <dim> run tp <player> <x> <y> <z>`
pub fn tp_command(dim: Dimension, player: &str, pos: Position) -> String {
    format!("execute in {} run tp {player} {pos}", dim.id())
}

pub fn gamemode_command(mode: &str, player: &str) -> String {
    format!("gamemode {mode} {player}")
}

/// Where the host says the player is right now.
fn current_location(api: &dyn ServerApi, player: &str) -> Result<Location, HostError> {
    let dim = api.player_dimension(player)?;
    let pos = api.player_position(player)?;
    Ok(Location::new(dim, pos))
}
