//! Per-player spectator state, persisted as JSON next to the world.
//!
//! On disk: `{"data": {"<player>": {"dim", "pos", "time", "back"}}}`,
//! indented with four spaces. Entries are keyed by player name.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use gmp_world::{Dimension, Position};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::error::StoreError;

pub const DATA_FILE: &str = "spec_data.json";

// ─── Records ─────────────────────────────────────────────────────────────────

/// A dimension plus a position in it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(deserialize_with = "dimension_alias")]
    pub dim: Dimension,
    pub pos: [f64; 3],
}

impl Location {
    pub fn new(dim: Dimension, pos: Position) -> Self {
        Self {
            dim,
            pos: pos.to_array(),
        }
    }

    pub fn position(&self) -> Position {
        Position::from(self.pos)
    }
}

/// State kept while a player is in spectator mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecEntry {
    /// Where the player was when they entered spectator mode.
    #[serde(flatten)]
    pub origin: Location,
    /// Unix seconds at entry.
    pub time: f64,
    /// The single remembered previous location for `!!back`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<Location>,
}

impl SpecEntry {
    /// A fresh entry; `back` starts at the origin.
    pub fn enter(origin: Location, now: f64) -> Self {
        Self {
            origin,
            time: now,
            back: Some(origin),
        }
    }

    /// Records migrated from older files may lack `back`.
    pub fn back_or_origin(&self) -> Location {
        self.back.unwrap_or(self.origin)
    }

    /// Whole minutes spent in spectator mode, rounded up.
    pub fn minutes_used(&self, now: f64) -> u64 {
        ((now - self.time).max(0.0) / 60.0).ceil() as u64
    }
}

/// Accept any dimension alias, including the legacy numeric ids.
fn dimension_alias<'de, D: Deserializer<'de>>(d: D) -> Result<Dimension, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Id(String),
        Numeric(i64),
    }

    let key = match Raw::deserialize(d)? {
        Raw::Id(s) => s,
        Raw::Numeric(n) => n.to_string(),
    };
    Dimension::from_alias(&key).ok_or_else(|| de::Error::custom(format!("unknown dimension: {key}")))
}

#[derive(Default, Deserialize)]
struct DataFile {
    #[serde(default)]
    data: Map<String, Value>,
}

#[derive(Serialize)]
struct DataFileRef<'a> {
    data: BTreeMap<&'a str, &'a SpecEntry>,
}

pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// The player → [`SpecEntry`] table and the file backing it.
pub struct SpecStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, SpecEntry>>,
}

impl SpecStore {
    /// `<working_dir>/world/spec_data.json`
    pub fn data_path(working_dir: &Path) -> PathBuf {
        working_dir.join("world").join(DATA_FILE)
    }

    /// An empty table that will save to `path`. Nothing is read.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Load the table from `path`. A missing file gives an empty table; an
    /// unreadable one is logged and also gives an empty table.
    pub fn open(path: PathBuf) -> Self {
        if let Some(dir) = path.parent() {
            if let Err(e) = fs::create_dir_all(dir) {
                error!("Failed to create {}: {e}", dir.display());
            }
        }
        let entries = match load_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                error!("{e}");
                HashMap::new()
            }
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the table out. Holds the lock for the duration so concurrent
    /// saves cannot interleave.
    pub fn save(&self) -> Result<(), StoreError> {
        let entries = self.lock();
        debug!("Saving {} entries to {}", entries.len(), self.path.display());
        write_entries(&self.path, &entries)
    }

    pub fn get(&self, player: &str) -> Option<SpecEntry> {
        self.lock().get(player).cloned()
    }

    pub fn contains(&self, player: &str) -> bool {
        self.lock().contains_key(player)
    }

    /// Insert or replace, returning the previous entry.
    pub fn put(&self, player: &str, entry: SpecEntry) -> Option<SpecEntry> {
        self.lock().insert(player.to_string(), entry)
    }

    /// Insert only if the player has no entry yet. `false` if one exists.
    pub fn insert_if_absent(&self, player: &str, entry: SpecEntry) -> bool {
        match self.lock().entry(player.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }

    /// Remove and return the entry. Of several concurrent callers at most
    /// one gets it.
    pub fn delete(&self, player: &str) -> Option<SpecEntry> {
        self.lock().remove(player)
    }

    /// Overwrite the player's `back` location. `false` if they have no entry.
    pub fn set_back(&self, player: &str, back: Location) -> bool {
        match self.lock().get_mut(player) {
            Some(entry) => {
                entry.back = Some(back);
                true
            }
            None => false,
        }
    }

    /// Replace `back` with `current` and return what it held before.
    pub fn swap_back(&self, player: &str, current: Location) -> Option<Location> {
        let mut entries = self.lock();
        let entry = entries.get_mut(player)?;
        let previous = entry.back_or_origin();
        entry.back = Some(current);
        Some(previous)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SpecEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read a data file. Missing file → empty table.
pub fn load_entries(path: &Path) -> Result<HashMap<String, SpecEntry>, StoreError> {
    if !path.exists() {
        debug!("No data file at {}, starting empty", path.display());
        return Ok(HashMap::new());
    }
    let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: DataFile = serde_json::from_str(&contents).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let entries = parse_entries(file.data, path);
    debug!("Loaded {} entries from {}", entries.len(), path.display());
    Ok(entries)
}

/// Decode a player map one record at a time. Records that do not parse are
/// logged and skipped; the rest are kept.
pub(crate) fn parse_entries(raw: Map<String, Value>, path: &Path) -> HashMap<String, SpecEntry> {
    raw.into_iter()
        .filter_map(|(player, value)| match serde_json::from_value(value) {
            Ok(entry) => Some((player, entry)),
            Err(e) => {
                warn!("Skipping entry {player:?} in {}: {e}", path.display());
                None
            }
        })
        .collect()
}

/// Write a data file via a temporary sibling and a rename.
pub fn write_entries(path: &Path, entries: &HashMap<String, SpecEntry>) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = DataFileRef {
        data: entries.iter().map(|(k, v)| (k.as_str(), v)).collect(),
    };
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    file.serialize(&mut ser).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &buf).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)
}
