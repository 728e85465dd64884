//! One-time import of the data file written by the older `gamemode` plugin.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::StoreError;
use crate::store::{parse_entries, write_entries, SpecEntry};

/// Places the old plugin kept its table, relative to the plugins directory,
/// in lookup order.
const LEGACY_FILES: [&str; 2] = ["gamemode/data.json", "gamemode_data.json"];

/// First legacy data file that exists. `data_folder` is this plugin's own
/// folder; its parent is the plugins directory.
pub fn find_legacy_file(data_folder: &Path) -> Option<PathBuf> {
    let plugins_dir = data_folder.parent()?;
    LEGACY_FILES
        .iter()
        .map(|rel| plugins_dir.join(rel))
        .find(|p| p.is_file())
}

/// Parse a legacy file. It may hold `{"data": {...}}` or the bare map.
/// Anything unusable is logged and yields an empty table.
pub fn read_legacy(path: &Path) -> HashMap<String, SpecEntry> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to read legacy data {}: {e}", path.display());
            return HashMap::new();
        }
    };
    if contents.trim().is_empty() {
        warn!("Legacy data file {} is empty", path.display());
        return HashMap::new();
    }

    let table = match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Object(mut obj)) => match obj.remove("data") {
            Some(Value::Object(data)) => {
                info!("Legacy data is wrapped in a \"data\" key");
                data
            }
            Some(other) => {
                obj.insert("data".into(), other);
                info!("Legacy data is a bare player map");
                obj
            }
            None => {
                info!("Legacy data is a bare player map");
                obj
            }
        },
        Ok(other) => {
            warn!("Legacy data in {} is not an object: {other}", path.display());
            return HashMap::new();
        }
        Err(e) => {
            error!("Legacy data {} is not valid JSON: {e}", path.display());
            return HashMap::new();
        }
    };

    parse_entries(table, path)
}

/// Copy a legacy table to `target` unless `target` already exists.
/// Returns the file migrated from, if any.
pub fn migrate_legacy(data_folder: &Path, target: &Path) -> Result<Option<PathBuf>, StoreError> {
    let Some(legacy) = find_legacy_file(data_folder) else {
        debug!("No legacy gamemode data found");
        return Ok(None);
    };
    if target.exists() {
        debug!(
            "Both {} and {} exist, skipping migration",
            legacy.display(),
            target.display()
        );
        return Ok(None);
    }

    info!("Migrating legacy gamemode data from {}", legacy.display());
    let entries = read_legacy(&legacy);
    write_entries(target, &entries)?;
    info!(
        "Migrated {} entries from {} to {}",
        entries.len(),
        legacy.display(),
        target.display()
    );
    Ok(Some(legacy))
}
