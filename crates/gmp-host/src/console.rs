//! Console line grammar for the host REPL.

/// One line typed at the host console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleLine {
    /// `<player>: <command>`
    Player { name: String, command: String },
    /// `console: <command>`
    Console(String),
    Join(String),
    Quit(String),
    List,
    Reload,
    Stop,
    Help,
}

pub const USAGE: &str = "Lines: <player>: <command> | console: <command> | join <player> | quit <player> | list | reload | stop";

pub fn parse_line(line: &str) -> Option<ConsoleLine> {
    let line = line.trim();
    if let Some((who, command)) = line.split_once(':') {
        let (who, command) = (who.trim(), command.trim());
        if !who.is_empty() && !who.contains(char::is_whitespace) && !command.is_empty() {
            return Some(if who == "console" {
                ConsoleLine::Console(command.to_string())
            } else {
                ConsoleLine::Player {
                    name: who.to_string(),
                    command: command.to_string(),
                }
            });
        }
    }

    let mut tokens = line.split_whitespace();
    let line = match (tokens.next()?, tokens.next(), tokens.next()) {
        ("join", Some(name), None) => ConsoleLine::Join(name.to_string()),
        ("quit", Some(name), None) => ConsoleLine::Quit(name.to_string()),
        ("list", None, _) => ConsoleLine::List,
        ("reload", None, _) => ConsoleLine::Reload,
        ("stop", None, _) => ConsoleLine::Stop,
        ("help", None, _) => ConsoleLine::Help,
        _ => return None,
    };
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_and_console_commands() {
        assert_eq!(
            parse_line("Steve: !!tp nether 1 2 3"),
            Some(ConsoleLine::Player {
                name: "Steve".into(),
                command: "!!tp nether 1 2 3".into()
            })
        );
        assert_eq!(
            parse_line("  console:   !!spec help "),
            Some(ConsoleLine::Console("!!spec help".into()))
        );
    }

    #[test]
    fn builtins() {
        assert_eq!(parse_line("join Alex"), Some(ConsoleLine::Join("Alex".into())));
        assert_eq!(parse_line("quit Alex"), Some(ConsoleLine::Quit("Alex".into())));
        assert_eq!(parse_line("list"), Some(ConsoleLine::List));
        assert_eq!(parse_line("reload"), Some(ConsoleLine::Reload));
        assert_eq!(parse_line("stop"), Some(ConsoleLine::Stop));
        assert_eq!(parse_line("help"), Some(ConsoleLine::Help));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("join"), None);
        assert_eq!(parse_line("join a b"), None);
        assert_eq!(parse_line("Steve:"), None);
        assert_eq!(parse_line("two words: !!spec"), None);
        assert_eq!(parse_line("dance"), None);
    }
}
