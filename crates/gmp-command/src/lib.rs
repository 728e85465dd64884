//! Command registry, dispatch, and argument validation.

pub mod coords;

use std::collections::HashMap;

use thiserror::Error;

pub use coords::{is_valid_coordinate, parse_coordinates};

/// Why a line could not be turned into an [`Invocation`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Permission denied: {name} requires level {required}")]
    PermissionDenied { name: String, required: u8 },

    #[error("Empty command")]
    Empty,
}

/// A dispatched command: canonical root name plus the remaining tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    pub args: Vec<String>,
}

/// Result returned by a command handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Whether the command executed successfully.
    pub success: bool,
    /// Messages to send back to the command source.
    pub messages: Vec<String>,
}

impl CommandResult {
    /// Create a successful result with a single message.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            messages: vec![message.into()],
        }
    }

    /// Create a failed result with a single message.
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            messages: vec![message.into()],
        }
    }

    /// Successful, nothing to reply.
    pub fn silent() -> Self {
        Self {
            success: true,
            messages: Vec::new(),
        }
    }
}

/// A registered root literal.
pub struct CommandEntry {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    pub permission: u8,
}

/// Root literals this plugin answers to.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandEntry>,
    /// alias → canonical name
    aliases: HashMap<String, String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a root literal. Re-registering a name replaces it.
    pub fn register(&mut self, name: &str, aliases: &[&str], description: &str, permission: u8) {
        if let Some(old) = self.commands.get(name) {
            for alias in &old.aliases {
                if self.aliases.get(alias).is_some_and(|target| target == name) {
                    self.aliases.remove(alias);
                }
            }
        }
        for alias in aliases {
            self.aliases.insert(alias.to_string(), name.to_string());
        }
        self.commands.insert(
            name.to_string(),
            CommandEntry {
                name: name.to_string(),
                aliases: aliases.iter().map(|a| a.to_string()).collect(),
                description: description.to_string(),
                permission,
            },
        );
    }

    /// Look up a root by canonical name or alias.
    pub fn resolve(&self, literal: &str) -> Option<&CommandEntry> {
        self.commands.get(literal).or_else(|| {
            self.aliases
                .get(literal)
                .and_then(|name| self.commands.get(name))
        })
    }

    /// Split `line` on whitespace, resolve the root literal and check the
    /// source's permission level against it.
    pub fn dispatch(&self, level: u8, line: &str) -> Result<Invocation, CommandError> {
        let mut tokens = line.split_whitespace();
        let literal = tokens.next().ok_or(CommandError::Empty)?;
        let entry = self
            .resolve(literal)
            .ok_or_else(|| CommandError::Unknown(literal.to_string()))?;
        if level < entry.permission {
            return Err(CommandError::PermissionDenied {
                name: entry.name.clone(),
                required: entry.permission,
            });
        }
        Ok(Invocation {
            name: entry.name.clone(),
            args: tokens.map(String::from).collect(),
        })
    }

    /// Every literal (names and aliases) that routes to this registry.
    pub fn literals(&self) -> Vec<&str> {
        let mut all: Vec<&str> = self
            .commands
            .keys()
            .chain(self.aliases.keys())
            .map(String::as_str)
            .collect();
        all.sort_unstable();
        all
    }
}
