//! Dimension identifiers and the aliases players may type for them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown dimension: {0}")]
pub struct DimensionError(pub String);

/// One of the three vanilla dimensions.
///
/// Serialized as the namespaced id (`minecraft:the_nether`), which is also the
/// form `execute in <dim>` expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    #[serde(rename = "minecraft:overworld")]
    Overworld,
    #[serde(rename = "minecraft:the_nether")]
    Nether,
    #[serde(rename = "minecraft:the_end")]
    End,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Overworld, Dimension::Nether, Dimension::End];

    /// Namespaced id.
    pub const fn id(self) -> &'static str {
        match self {
            Self::Overworld => "minecraft:overworld",
            Self::Nether => "minecraft:the_nether",
            Self::End => "minecraft:the_end",
        }
    }

    /// Name shown to players.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Overworld => "Overworld",
            Self::Nether => "The Nether",
            Self::End => "The End",
        }
    }

    /// Resolve a typed alias: legacy numeric id, short name, or namespaced id.
    pub fn from_alias(s: &str) -> Option<Self> {
        match s {
            "0" | "overworld" | "minecraft:overworld" => Some(Self::Overworld),
            "-1" | "nether" | "the_nether" | "minecraft:the_nether" => Some(Self::Nether),
            "1" | "end" | "the_end" | "minecraft:the_end" => Some(Self::End),
            _ => None,
        }
    }
}

impl FromStr for Dimension {
    type Err = DimensionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_alias(s).ok_or_else(|| DimensionError(s.to_string()))
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_alias_resolves() {
        let cases = [
            ("0", Dimension::Overworld),
            ("overworld", Dimension::Overworld),
            ("minecraft:overworld", Dimension::Overworld),
            ("-1", Dimension::Nether),
            ("nether", Dimension::Nether),
            ("the_nether", Dimension::Nether),
            ("minecraft:the_nether", Dimension::Nether),
            ("1", Dimension::End),
            ("end", Dimension::End),
            ("the_end", Dimension::End),
            ("minecraft:the_end", Dimension::End),
        ];
        for (alias, dim) in cases {
            assert_eq!(Dimension::from_alias(alias), Some(dim), "alias {alias}");
        }
    }

    #[test]
    fn aliases_are_case_sensitive() {
        assert_eq!(Dimension::from_alias("Nether"), None);
        assert_eq!(Dimension::from_alias("2"), None);
        assert_eq!(
            "twilight".parse::<Dimension>(),
            Err(DimensionError("twilight".into()))
        );
    }

    #[test]
    fn id_roundtrips_through_alias() {
        for dim in Dimension::ALL {
            assert_eq!(Dimension::from_alias(dim.id()), Some(dim));
            assert_eq!(dim.to_string(), dim.id());
        }
    }

    #[test]
    fn serializes_as_namespaced_id() {
        let json = serde_json::to_string(&Dimension::Nether).unwrap();
        assert_eq!(json, "\"minecraft:the_nether\"");
        let back: Dimension = serde_json::from_str("\"minecraft:the_end\"").unwrap();
        assert_eq!(back, Dimension::End);
    }
}
