//! Per-airport inventories: the raw map and its interpretation.

use indexmap::IndexMap;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{InterpretedPosition, RawPosition};

/// Everything the mapper found at one airport, keyed by token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMap {
    pub airport: String,
    pub last_updated: Timestamp,
    #[serde(default)]
    pub gates: IndexMap<String, RawPosition>,
    #[serde(default)]
    pub spots: IndexMap<String, RawPosition>,
}

impl RawMap {
    /// An empty map stamped with the current time.
    pub fn new(airport: impl Into<String>) -> Self {
        Self {
            airport: airport.into(),
            last_updated: Timestamp::now(),
            gates: IndexMap::new(),
            spots: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty() && self.spots.is_empty()
    }

    /// Number of positions across both categories.
    pub fn len(&self) -> usize {
        self.gates.len() + self.spots.len()
    }
}

/// Interpreted positions of one airport, grouped by terminal then gate.
///
/// Both levels keep first-seen order; matching breaks ties by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportInventory {
    pub airport: String,
    pub created: Timestamp,
    pub terminals: IndexMap<String, IndexMap<String, InterpretedPosition>>,
}

impl AirportInventory {
    /// An empty inventory stamped with the current time.
    pub fn new(airport: impl Into<String>) -> Self {
        Self {
            airport: airport.into(),
            created: Timestamp::now(),
            terminals: IndexMap::new(),
        }
    }

    /// Files a position under its terminal and gate.
    ///
    /// A later position with the same keys replaces the earlier one but keeps
    /// its place in the ordering.
    pub fn insert(&mut self, position: InterpretedPosition) {
        self.terminals
            .entry(position.terminal.clone())
            .or_default()
            .insert(position.gate.clone(), position);
    }

    /// Looks up a position by its exact keys.
    pub fn get(&self, terminal: &str, gate: &str) -> Option<&InterpretedPosition> {
        self.terminals.get(terminal)?.get(gate)
    }

    /// All positions in inventory order.
    pub fn positions(&self) -> impl Iterator<Item = &InterpretedPosition> {
        self.terminals.values().flat_map(IndexMap::values)
    }

    pub fn len(&self) -> usize {
        self.terminals.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{Category, NavigationCoordinate};

    fn position(terminal: &str, gate: &str) -> InterpretedPosition {
        InterpretedPosition {
            terminal: terminal.into(),
            gate: gate.into(),
            position_id: format!("Terminal {terminal} Gate {gate}"),
            kind: Category::Gate,
            raw: RawPosition {
                token: gate.into(),
                full_text: format!("Gate {gate}"),
                coordinate: NavigationCoordinate::default(),
                menu_title: "Gates".into(),
                depth: 1,
                category: Category::Gate,
            },
        }
    }

    #[test]
    fn keeps_first_seen_order() {
        let mut inventory = AirportInventory::new("EDDS");
        inventory.insert(position("2", "20"));
        inventory.insert(position("1", "5A"));
        inventory.insert(position("2", "21"));

        let gates: Vec<_> = inventory.positions().map(|p| p.gate.as_str()).collect();
        assert_eq!(gates, vec!["20", "21", "5A"]);
        assert_eq!(inventory.len(), 3);
        assert!(inventory.get("1", "5A").is_some());
        assert!(inventory.get("1", "20").is_none());
    }

    #[test]
    fn serializes_position_kind_as_type() {
        let json = serde_json::to_value(position("1", "5A")).unwrap();

        assert_eq!(json["type"], "gate");
        assert_eq!(json["raw"]["coordinate"]["leaf_index"], 0);
    }

    #[test]
    fn raw_map_without_top_level_page_loads() {
        let json = r#"{
            "airport": "EDDS",
            "last_updated": "2024-05-01T10:00:00Z",
            "gates": {
                "5A": {
                    "token": "5A",
                    "full_text": "Gate 5A",
                    "coordinate": {"top_level_index": 0, "pagination_clicks": 1, "leaf_index": 1},
                    "menu_title": "Gate 1-10",
                    "depth": 1,
                    "category": "gate"
                }
            }
        }"#;

        let map: RawMap = serde_json::from_str(json).unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(map.gates["5A"].coordinate.top_level_page, 0);
    }
}
