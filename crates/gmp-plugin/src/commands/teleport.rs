use gmp_command::{parse_coordinates, CommandResult};
use gmp_plugin_api::{CommandSource, ServerApi};
use gmp_world::{map_xz, END_FALLBACK};
use tracing::{error, info};

use super::*;
use crate::GamemodePlus;

impl GamemodePlus {
    /// `!!tp <dimension>` | `!!tp <x> <y> <z>` | `!!tp <dimension> <x> <y> <z>`
    pub(crate) fn cmd_tp(
        &self,
        source: &CommandSource,
        args: &[String],
        api: &dyn ServerApi,
    ) -> CommandResult {
        let Some(player) = source.player_name() else {
            return CommandResult::err(PLAYERS_ONLY);
        };
        if !self.store.contains(player) {
            return CommandResult::err(SPECTATOR_ONLY);
        }

        let destination = match args {
            [dim] => self.dimension_destination(player, dim, api),
            [x, y, z] => match parse_coordinates(x, y, z) {
                Some(pos) => match api.player_dimension(player) {
                    Ok(dim) => Ok((dim, pos)),
                    Err(e) => {
                        error!("Failed to read dimension of {player}: {e}");
                        Err(CommandResult::err(DIMENSION_UNAVAILABLE))
                    }
                },
                None => Err(CommandResult::err(INVALID_COORDINATES)),
            },
            [dim, x, y, z] => match Dimension::from_alias(dim) {
                Some(dim) => parse_coordinates(x, y, z)
                    .map(|pos| (dim, pos))
                    .ok_or_else(|| CommandResult::err(INVALID_COORDINATES)),
                None => Err(CommandResult::err(NO_SUCH_DIMENSION)),
            },
            _ => Err(CommandResult::err(TP_USAGE)),
        };

        match destination {
            Ok((dim, pos)) => self.teleport(player, dim, pos, api),
            Err(reply) => reply,
        }
    }

    /// Destination for a dimension-only teleport: x/z carried over between
    /// Overworld and Nether at the current height, otherwise the fixed
    /// fallback point.
    fn dimension_destination(
        &self,
        player: &str,
        alias: &str,
        api: &dyn ServerApi,
    ) -> Result<(Dimension, Position), CommandResult> {
        let target =
            Dimension::from_alias(alias).ok_or_else(|| CommandResult::err(NO_SUCH_DIMENSION))?;
        let current = api.player_dimension(player).map_err(|e| {
            error!("Failed to read dimension of {player}: {e}");
            CommandResult::err(DIMENSION_UNAVAILABLE)
        })?;
        if target == current {
            return Err(CommandResult::err(ALREADY_IN_DIMENSION));
        }

        let here = api.player_position(player).map_err(|e| {
            error!("Failed to read position of {player}: {e}");
            CommandResult::err(POSITION_UNAVAILABLE)
        })?;
        let pos = match map_xz(current, target, here.x, here.z) {
            Some((x, z)) => Position::new(x, here.y, z),
            None => END_FALLBACK,
        };
        Ok((target, pos))
    }

    /// Remember the current location as `back`, then move.
    fn teleport(
        &self,
        player: &str,
        dim: Dimension,
        pos: Position,
        api: &dyn ServerApi,
    ) -> CommandResult {
        let here = match current_location(api, player) {
            Ok(here) => here,
            Err(e) => {
                error!("Failed to teleport {player}: {e}");
                return CommandResult::err(TELEPORT_FAILED);
            }
        };
        if !self.store.set_back(player, here) {
            return CommandResult::err(SPECTATOR_ONLY);
        }
        self.persist();
        api.execute(&tp_command(dim, player, pos));
        info!("{player} teleported to {dim} {pos}");
        CommandResult::ok(format!(
            "§aTeleported to §e{}§a, coordinates §e{}",
            dim.display_name(),
            pos.block_string()
        ))
    }
}
