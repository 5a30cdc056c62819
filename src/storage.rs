//! Local persistence for airport inventories.
//!
//! Each airport has up to two files under the storage root:
//!
//! ```text
//! <root>/
//!   EDDS.json               # Raw map: tokens and navigation coordinates
//!   EDDS_interpreted.json   # Positions grouped by terminal and gate
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};

use crate::model::{AirportInventory, RawMap};

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

const INTERPRETED_SUFFIX: &str = "_interpreted";

/// Local file-based storage for raw and interpreted inventories.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Creates a new storage instance rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Returns the default storage root: `~/.gate-director/inventories/`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".gate-director").join("inventories"))
    }

    // ── Raw maps ──

    /// Writes the raw map of an airport, replacing any earlier one.
    pub fn save_raw(&self, map: &RawMap) -> Result<()> {
        write_json(&self.raw_path(&map.airport), map)
    }

    /// Loads the raw map of an airport, if one was saved.
    pub fn load_raw(&self, airport: &str) -> Result<Option<RawMap>> {
        read_json(&self.raw_path(airport))
    }

    // ── Interpreted inventories ──

    /// Writes the interpreted inventory of an airport.
    pub fn save_inventory(&self, inventory: &AirportInventory) -> Result<()> {
        write_json(&self.interpreted_path(&inventory.airport), inventory)
    }

    /// Loads the interpreted inventory of an airport, if one was saved.
    pub fn load_inventory(&self, airport: &str) -> Result<Option<AirportInventory>> {
        read_json(&self.interpreted_path(airport))
    }

    /// Lists airports with a raw map on disk, sorted by code.
    pub fn list_airports(&self) -> Result<Vec<String>> {
        let mut airports = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(airports),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !stem.ends_with(INTERPRETED_SUFFIX) {
                airports.push(stem.to_string());
            }
        }
        airports.sort();
        Ok(airports)
    }

    // ── Helpers ──

    fn raw_path(&self, airport: &str) -> PathBuf {
        self.root.join(format!("{}.json", airport.to_uppercase()))
    }

    fn interpreted_path(&self, airport: &str) -> PathBuf {
        self.root
            .join(format!("{}{INTERPRETED_SUFFIX}.json", airport.to_uppercase()))
    }
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    tracing::debug!("wrote {}", path.display());
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&json)?))
}
