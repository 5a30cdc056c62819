//! Assignment requests: one gate change, consumed once by the director.

use serde::{Deserialize, Serialize};

/// A request to assign a gate at an airport.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssignmentRequest {
    /// ICAO code of the airport.
    pub airport: String,
    /// Terminal name, e.g. `Terminal` or `Pier`.
    pub terminal: String,
    /// Terminal number or letter, e.g. `1` or `C`.
    pub terminal_number: String,
    /// Letter in front of the gate number (`V` in `V19`).
    pub gate_letter: String,
    pub gate_number: String,
    /// Letter behind the gate number (`A` in `5A`).
    pub gate_suffix: String,
    /// Operator to pick on the airline page; empty for the configured default.
    pub airline: String,
    pub wait_for_ground: bool,
}

impl AssignmentRequest {
    /// Terminal name and number joined the way inventories key them.
    pub fn terminal_label(&self) -> String {
        [self.terminal.as_str(), self.terminal_number.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The gate designator as a single string, e.g. `V19` or `5A`.
    pub fn gate_designator(&self) -> String {
        format!("{}{}{}", self.gate_letter, self.gate_number, self.gate_suffix)
    }
}
