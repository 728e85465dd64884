use gmp_command::CommandResult;
use gmp_plugin_api::{CommandSource, ServerApi};
use tracing::{error, info};

use super::*;
use crate::GamemodePlus;

impl GamemodePlus {
    /// `!!back`: swap the current location with the remembered one.
    pub(crate) fn cmd_back(
        &self,
        source: &CommandSource,
        args: &[String],
        api: &dyn ServerApi,
    ) -> CommandResult {
        let Some(player) = source.player_name() else {
            return CommandResult::err(PLAYERS_ONLY);
        };
        if !args.is_empty() {
            return CommandResult::err(BACK_USAGE);
        }
        if !self.store.contains(player) {
            return CommandResult::err(SPECTATOR_ONLY);
        }

        let here = match current_location(api, player) {
            Ok(here) => here,
            Err(e) => {
                error!("Failed to return {player} to the previous location: {e}");
                return CommandResult::err(BACK_FAILED);
            }
        };
        let Some(previous) = self.store.swap_back(player, here) else {
            return CommandResult::err(SPECTATOR_ONLY);
        };
        self.persist();
        api.execute(&tp_command(previous.dim, player, previous.position()));
        info!("{player} went back to {} {}", previous.dim, previous.position());
        CommandResult::ok(RETURNED)
    }
}
