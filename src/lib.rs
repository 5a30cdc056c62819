//! Gate assignment automation for a ground-services addon.
//!
//! The addon exposes its menu as a text file and takes input through
//! simulator variables. This crate maps each airport's menu into an
//! inventory of positions once, matches requested gates against it, and
//! replays the recorded path to assign the winner. Requests arrive from a
//! telemetry feed and are worked off one at a time by the [`director`].

pub mod config;
pub mod confirm;
pub mod director;
pub mod inventory;
pub mod mapper;
pub mod matcher;
pub mod menu;
pub mod model;
pub mod retry;
pub mod session;
pub mod sim;
pub mod storage;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;
