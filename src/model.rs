//! Core data model for Gate Director.
//!
//! Positions discovered in the addon's menu, the inventories built from
//! them, and the assignment requests that consume those inventories.

mod inventory;
mod position;
mod request;

pub use inventory::{AirportInventory, RawMap};
pub use position::{Category, InterpretedPosition, NavigationCoordinate, RawPosition};
pub use request::AssignmentRequest;
