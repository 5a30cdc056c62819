//! Simulator variable capability.
//!
//! The connection layer itself lives outside this crate. All the automation
//! needs from it is reading and writing named variables and polling ground
//! contact.

/// Opens (1) or closes (0) the addon menu.
pub const MENU_OPEN: &str = "L:FSDT_GSX_MENU_OPEN";

/// Selects a menu option by index, or refreshes the menu when set to
/// [`MENU_REFRESH`].
pub const MENU_CHOICE: &str = "L:FSDT_GSX_MENU_CHOICE";

/// Aircraft ground-contact flag.
pub const SIM_ON_GROUND: &str = "SIM ON GROUND";

/// Value written to [`MENU_CHOICE`] to force the addon to rewrite the menu file.
pub const MENU_REFRESH: f64 = -2.0;

/// Errors raised by a simulator link.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("simulator link unavailable: {0}")]
    Connection(String),

    #[error("failed to access variable {name}: {reason}")]
    Variable { name: String, reason: String },
}

/// A live link to the simulator.
///
/// Implementations are driven from the single consumer thread only.
pub trait SimLink: Send {
    /// Set a named variable.
    fn write(&mut self, name: &str, value: f64) -> Result<(), SimError>;

    /// Read a named variable.
    fn read(&mut self, name: &str) -> Result<f64, SimError>;

    /// Whether the aircraft currently has ground contact.
    fn on_ground(&mut self) -> Result<bool, SimError> {
        Ok(self.read(SIM_ON_GROUND)? != 0.0)
    }
}
