use gmp_command::CommandResult;
use gmp_plugin_api::{CommandSource, HostError, ServerApi};
use tracing::{debug, error, info};

use super::*;
use crate::store::{unix_now, SpecEntry};
use crate::GamemodePlus;

impl GamemodePlus {
    /// `!!spec`, `!!spec help`, `!!spec <player>`
    pub(crate) fn cmd_spec(
        &self,
        source: &CommandSource,
        args: &[String],
        api: &dyn ServerApi,
    ) -> CommandResult {
        match args {
            [] => {
                let Some(player) = source.player_name() else {
                    return CommandResult::err(PLAYERS_ONLY);
                };
                self.toggle_mode(player, api)
            }
            [sub] if sub == "help" => CommandResult::ok(HELP_MESSAGE),
            [target] => {
                if !source.has_permission(self.config.spec_other) {
                    return CommandResult::err(NO_PERMISSION);
                }
                if source.is_console() {
                    return CommandResult::err(PLAYERS_ONLY);
                }
                self.toggle_mode(target, api)
            }
            _ => CommandResult::err(SPEC_USAGE),
        }
    }

    /// Spectator if the player has no entry, back to survival at their
    /// origin if they do. The entry is claimed atomically so concurrent
    /// toggles of one player never both take the same branch.
    fn toggle_mode(&self, target: &str, api: &dyn ServerApi) -> CommandResult {
        let now = unix_now();
        if let Some(entry) = self.store.delete(target) {
            api.tell(
                target,
                &format!(
                    "§aYou spent §e{}min§a in spectator mode",
                    entry.minutes_used(now)
                ),
            );
            self.leave_spectator(target, &entry, api);
            return CommandResult::silent();
        }

        match self.enter_spectator(target, now, api) {
            Ok(true) => {
                api.tell(target, "§aSwitched to spectator mode");
                CommandResult::silent()
            }
            Ok(false) => {
                debug!("{target} was switched to spectator mode concurrently");
                CommandResult::silent()
            }
            Err(e) => {
                error!("Failed to switch {target} to spectator mode: {e}");
                CommandResult::err(MODE_FAILED)
            }
        }
    }

    /// `Ok(false)` when another toggle recorded the player first.
    fn enter_spectator(
        &self,
        player: &str,
        now: f64,
        api: &dyn ServerApi,
    ) -> Result<bool, HostError> {
        let origin = current_location(api, player)?;
        if !self.store.insert_if_absent(player, SpecEntry::enter(origin, now)) {
            return Ok(false);
        }
        api.execute(&gamemode_command("spectator", player));
        self.persist();
        info!("{player} entered spectator mode in {}", origin.dim);
        Ok(true)
    }

    /// The entry has already been removed from the table.
    fn leave_spectator(&self, player: &str, entry: &SpecEntry, api: &dyn ServerApi) {
        let origin = entry.origin;
        api.execute(&tp_command(origin.dim, player, origin.position()));
        api.execute(&gamemode_command("survival", player));
        self.persist();
        info!("{player} returned to survival mode");
    }
}

#[cfg(test)]
mod tests {
    use crate::mock::{loaded, MockApi};
    use gmp_plugin_api::{permission, CommandSource, Plugin};
    use gmp_world::{Dimension, Position};

    use super::{HELP_MESSAGE, MODE_FAILED, NO_PERMISSION, PLAYERS_ONLY, SPEC_USAGE};

    #[test]
    fn toggle_into_spectator_and_back() {
        let api = MockApi::new();
        api.add_player("Steve", Dimension::Overworld, Position::new(10.5, 64.0, -3.0));
        let plugin = loaded(&api);
        let steve = CommandSource::player("Steve", permission::USER);

        let replies = plugin.on_command(&steve, "!!spec", &api).unwrap();
        assert!(replies.is_empty());
        assert_eq!(api.executed(), vec!["gamemode spectator Steve"]);
        assert_eq!(api.told("Steve"), vec!["§aSwitched to spectator mode"]);
        let entry = plugin.store().get("Steve").unwrap();
        assert_eq!(entry.origin.dim, Dimension::Overworld);
        assert_eq!(entry.origin.pos, [10.5, 64.0, -3.0]);
        assert_eq!(entry.back, Some(entry.origin));
        assert!(api.data_file_contains("Steve"));

        api.clear();
        let replies = plugin.on_command(&steve, "!!spec", &api).unwrap();
        assert!(replies.is_empty());
        assert_eq!(
            api.executed(),
            vec![
                "execute in minecraft:overworld run tp Steve 10.5 64 -3",
                "gamemode survival Steve",
            ]
        );
        let told = api.told("Steve");
        assert_eq!(told.len(), 1);
        assert!(told[0].contains("min"));
        assert!(!plugin.store().contains("Steve"));
        assert!(!api.data_file_contains("Steve"));
    }

    #[test]
    fn short_alias_toggles() {
        let api = MockApi::new();
        api.add_player("Steve", Dimension::Nether, Position::new(0.0, 70.0, 0.0));
        let plugin = loaded(&api);
        let steve = CommandSource::player("Steve", permission::USER);
        plugin.on_command(&steve, "！s", &api).unwrap();
        assert!(plugin.store().contains("Steve"));
    }

    #[test]
    fn help_works_for_everyone() {
        let api = MockApi::new();
        let plugin = loaded(&api);
        let replies = plugin
            .on_command(&CommandSource::Console, "!!spec help", &api)
            .unwrap();
        assert_eq!(replies, vec![HELP_MESSAGE]);
    }

    #[test]
    fn console_cannot_toggle() {
        let api = MockApi::new();
        api.add_player("Steve", Dimension::Overworld, Position::new(0.0, 64.0, 0.0));
        let plugin = loaded(&api);
        for line in ["!!spec", "!!spec Steve"] {
            let replies = plugin
                .on_command(&CommandSource::Console, line, &api)
                .unwrap();
            assert_eq!(replies, vec![PLAYERS_ONLY]);
        }
        assert!(api.executed().is_empty());
    }

    #[test]
    fn toggling_others_needs_spec_other() {
        let api = MockApi::new();
        api.add_player("Alex", Dimension::Overworld, Position::new(0.0, 64.0, 0.0));
        let plugin = loaded(&api);

        let user = CommandSource::player("Steve", permission::USER);
        let replies = plugin.on_command(&user, "!!spec Alex", &api).unwrap();
        assert_eq!(replies, vec![NO_PERMISSION]);
        assert!(!plugin.store().contains("Alex"));

        let helper = CommandSource::player("Steve", permission::HELPER);
        plugin.on_command(&helper, "!!spec Alex", &api).unwrap();
        assert!(plugin.store().contains("Alex"));
        assert!(!plugin.store().contains("Steve"));
        assert_eq!(api.told("Alex"), vec!["§aSwitched to spectator mode"]);
    }

    #[test]
    fn host_failure_leaves_state_untouched() {
        let api = MockApi::new();
        let plugin = loaded(&api);
        let ghost = CommandSource::player("Ghost", permission::USER);
        let replies = plugin.on_command(&ghost, "!!spec", &api).unwrap();
        assert_eq!(replies, vec![MODE_FAILED]);
        assert!(!plugin.store().contains("Ghost"));
        assert!(api.executed().is_empty());
    }

    #[test]
    fn too_many_arguments() {
        let api = MockApi::new();
        let plugin = loaded(&api);
        let admin = CommandSource::player("Steve", permission::ADMIN);
        let replies = plugin.on_command(&admin, "!!spec a b", &api).unwrap();
        assert_eq!(replies, vec![SPEC_USAGE]);
    }

    #[test]
    fn below_spec_level_is_denied() {
        let api = MockApi::new();
        api.add_player("Steve", Dimension::Overworld, Position::new(0.0, 64.0, 0.0));
        let plugin = loaded(&api);
        let guest = CommandSource::player("Steve", permission::GUEST);
        let replies = plugin.on_command(&guest, "!!spec", &api).unwrap();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].starts_with("§c"));
        assert!(!plugin.store().contains("Steve"));
    }

    #[test]
    fn concurrent_toggles_of_one_player_stay_paired() {
        let api = MockApi::new();
        api.add_player("Steve", Dimension::Overworld, Position::new(0.0, 64.0, 0.0));
        let plugin = loaded(&api);

        let own = CommandSource::player("Steve", permission::USER);
        let admin = CommandSource::player("Op", permission::ADMIN);
        let calls: Vec<(&CommandSource, &str)> = (0..4)
            .flat_map(|_| [(&own, "!!spec"), (&admin, "!!spec Steve")])
            .collect();

        std::thread::scope(|s| {
            for (src, line) in calls {
                let (plugin, api) = (&plugin, &api);
                s.spawn(move || {
                    plugin.on_command(src, line, api).unwrap();
                });
            }
        });

        let executed = api.executed();
        let count = |cmd: &str| executed.iter().filter(|c| c.as_str() == cmd).count();
        let entered = count("gamemode spectator Steve");
        let left = count("gamemode survival Steve");
        let in_table = usize::from(plugin.store().contains("Steve"));
        assert_eq!(entered, left + in_table);
        let minutes = api.told("Steve").iter().filter(|m| m.contains("min")).count();
        assert_eq!(minutes, left);
    }
}
