//! One gate assignment, end to end.
//!
//! A session owns the navigator for as long as the director runs. It
//! resolves the airport's inventory, picks the position, and clicks
//! through the addon's dialogs to put the aircraft there.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::confirm::GateConfirmation;
use crate::inventory::{Inventories, InventoryError};
use crate::mapper::verify_airport;
use crate::matcher::{GateMatch, GateMatcher};
use crate::menu::{MatchMode, MenuError, MenuReader, Navigator};
use crate::model::AssignmentRequest;
use crate::sim::SimLink;
use crate::storage::StorageError;

/// Keyword of the option that commits a selected position.
const ACTIVATE: &str = "activate";

/// Errors that end an assignment attempt.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Menu(#[from] MenuError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("no parking positions known for {0}")]
    NoPositions(String),
}

impl From<InventoryError> for SessionError {
    fn from(e: InventoryError) -> Self {
        match e {
            InventoryError::Menu(e) => Self::Menu(e),
            InventoryError::Storage(e) => Self::Storage(e),
        }
    }
}

pub type Result<T> = core::result::Result<T, SessionError>;

/// What the director needs from an assignment backend.
pub trait Session: Send {
    /// Carries out one request.
    fn assign(&mut self, request: &AssignmentRequest) -> Result<GateMatch>;

    /// Builds the inventory of `airport` ahead of any request.
    fn premap(&mut self, airport: &str) -> Result<()>;

    /// Whether the aircraft has ground contact.
    fn on_ground(&mut self) -> Result<bool>;

    /// Closes and reopens the menu to get out of whatever dialog it is in.
    fn reset_menu(&mut self) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}

/// A [`Session`] driving the addon's menu.
pub struct GateSession {
    nav: Navigator,
    config: Config,
    inventories: Arc<Inventories>,
    matcher: GateMatcher,
    confirmer: Option<Box<dyn GateConfirmation>>,
    running: Arc<AtomicBool>,
}

impl GateSession {
    pub fn new(
        nav: Navigator,
        config: Config,
        inventories: Arc<Inventories>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            nav,
            matcher: GateMatcher::new(config.matching),
            config,
            inventories,
            confirmer: None,
            running,
        }
    }

    /// Opens a session over `link`, reading the first menu file that exists.
    pub fn connect(
        link: Box<dyn SimLink>,
        config: Config,
        inventories: Arc<Inventories>,
        running: Arc<AtomicBool>,
    ) -> Result<Self> {
        let reader = MenuReader::locate(&config.menu_file_paths, config.read_policy())?;
        let nav = Navigator::new(link, reader, &config);
        Ok(Self::new(nav, config, inventories, running))
    }

    /// Tells `confirmer` about every gate that was matched fuzzily.
    #[must_use]
    pub fn with_confirmer(mut self, confirmer: Box<dyn GateConfirmation>) -> Self {
        self.confirmer = Some(confirmer);
        self
    }

    /// Picks the position for `request` without touching the menu beyond
    /// what resolving the inventory needs.
    pub fn plan(&mut self, request: &AssignmentRequest) -> Result<GateMatch> {
        let inventory = self
            .inventories
            .resolve(&mut self.nav, &self.config, &request.airport)?;
        let terminal = request.terminal_label();
        let gate = request.gate_designator();
        self.matcher
            .find_best_match(&inventory, &terminal, &gate)
            .ok_or_else(|| SessionError::NoPositions(request.airport.clone()))
    }

    /// Blocks until the aircraft is on the ground or the session is stopped.
    fn wait_for_ground(&mut self) -> Result<()> {
        let interval = self.config.timing.ground_check();
        let mut logged = false;
        loop {
            if !self.running.load(Ordering::Relaxed) {
                return Err(MenuError::Cancelled.into());
            }
            if self.nav.on_ground()? {
                if logged {
                    tracing::info!("aircraft on ground, proceeding");
                }
                return Ok(());
            }
            if !logged {
                tracing::info!("waiting for the aircraft to be on the ground");
                logged = true;
            }
            sleep(interval);
        }
    }

    fn confirm(&self, airport: &str, found: &GateMatch) {
        if found.exact {
            return;
        }
        let Some(confirmer) = &self.confirmer else {
            return;
        };
        if let Err(e) = confirmer.confirm(airport, &found.position.gate) {
            tracing::warn!("could not confirm gate {}: {e}", found.position.gate);
        }
    }
}

impl Session for GateSession {
    fn assign(&mut self, request: &AssignmentRequest) -> Result<GateMatch> {
        tracing::info!(
            "assigning {} {} at {}",
            request.terminal_label(),
            request.gate_designator(),
            request.airport
        );
        let found = self.plan(request)?;
        self.confirm(&request.airport, &found);

        if request.wait_for_ground {
            self.wait_for_ground()?;
        } else if !self.nav.on_ground()? {
            tracing::warn!("aircraft not on the ground, the addon may refuse");
        }

        let menu = self.nav.refresh()?;
        verify_airport(&menu, &request.airport)?;
        self.nav.replay(&found.position.raw.coordinate)?;
        self.nav.find_and_advance(&[ACTIVATE], MatchMode::MenuAction)?;

        let airline = if request.airline.is_empty() {
            self.config.default_airline.as_str()
        } else {
            request.airline.as_str()
        };
        self.nav.find_and_advance(&[airline], MatchMode::Substring)?;
        self.nav.close()?;

        tracing::info!("assigned {}", found.position.position_id);
        Ok(found)
    }

    fn premap(&mut self, airport: &str) -> Result<()> {
        let inventory = self
            .inventories
            .resolve(&mut self.nav, &self.config, airport)?;
        tracing::info!("{airport} ready: {} position(s)", inventory.len());
        self.nav.close()?;
        Ok(())
    }

    fn on_ground(&mut self) -> Result<bool> {
        Ok(self.nav.on_ground()?)
    }

    fn reset_menu(&mut self) -> Result<()> {
        self.nav.close()?;
        self.nav.refresh()?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(self.nav.close()?)
    }
}

fn sleep(interval: Duration) {
    if !interval.is_zero() {
        thread::sleep(interval);
    }
}
