//! Process-wide inventory cache.
//!
//! Mapping an airport takes minutes of menu clicking, so each inventory is
//! built at most once: from memory, else from its interpreted file, else
//! from its raw map, else by walking the menu.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::Config;
use crate::mapper::MenuMapper;
use crate::menu::{MenuError, Navigator};
use crate::model::AirportInventory;
use crate::storage::{Storage, StorageError};

/// Errors raised while resolving an inventory.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error(transparent)]
    Menu(#[from] MenuError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Inventories resolved so far, keyed by ICAO code.
pub struct Inventories {
    storage: Storage,
    cache: RwLock<HashMap<String, Arc<AirportInventory>>>,
}

impl Inventories {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// The cached inventory of `airport`, if it was resolved before.
    pub fn cached(&self, airport: &str) -> Option<Arc<AirportInventory>> {
        self.cache.read().get(&airport.to_uppercase()).cloned()
    }

    /// Whether `airport` can be resolved without touching the menu.
    pub fn is_known(&self, airport: &str) -> Result<bool, StorageError> {
        if self.cached(airport).is_some() {
            return Ok(true);
        }
        Ok(self.storage.load_inventory(airport)?.is_some()
            || self.storage.load_raw(airport)?.is_some())
    }

    /// Loads `airport` from disk, without ever mapping it.
    pub fn load(&self, airport: &str) -> Result<Option<Arc<AirportInventory>>, StorageError> {
        if let Some(inventory) = self.cached(airport) {
            return Ok(Some(inventory));
        }
        let key = airport.to_uppercase();
        if let Some(inventory) = self.storage.load_inventory(&key)? {
            tracing::info!("loaded interpreted inventory for {key}");
            return Ok(Some(self.remember(inventory)));
        }
        if let Some(raw) = self.storage.load_raw(&key)? {
            tracing::info!("interpreting saved map for {key}");
            let inventory = AirportInventory::from_raw(&raw);
            self.storage.save_inventory(&inventory)?;
            return Ok(Some(self.remember(inventory)));
        }
        Ok(None)
    }

    /// Loads `airport`, mapping it through `nav` when nothing is on disk.
    pub fn resolve(
        &self,
        nav: &mut Navigator,
        config: &Config,
        airport: &str,
    ) -> Result<Arc<AirportInventory>, InventoryError> {
        if let Some(inventory) = self.load(airport)? {
            return Ok(inventory);
        }
        let raw = MenuMapper::new(nav, config).map_airport(airport)?;
        self.storage.save_raw(&raw)?;
        let inventory = AirportInventory::from_raw(&raw);
        self.storage.save_inventory(&inventory)?;
        tracing::info!(
            "saved inventory for {}: {} position(s)",
            inventory.airport,
            inventory.len()
        );
        Ok(self.remember(inventory))
    }

    fn remember(&self, inventory: AirportInventory) -> Arc<AirportInventory> {
        let inventory = Arc::new(inventory);
        self.cache
            .write()
            .insert(inventory.airport.to_uppercase(), Arc::clone(&inventory));
        inventory
    }
}
