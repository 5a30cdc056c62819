//! Positions: what the mapper finds and how to get back to it.

use serde::{Deserialize, Serialize};

/// The selections that lead from the menu root to one leaf option.
///
/// Valid only for the menu layout it was recorded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NavigationCoordinate {
    /// Pagination clicks on the root menu before the entry is visible.
    #[serde(default)]
    pub top_level_page: usize,
    /// Index of the top-level entry on its root page.
    pub top_level_index: usize,
    /// Pagination clicks inside the entry before the leaf is visible.
    pub pagination_clicks: usize,
    /// Index of the leaf option on its page.
    pub leaf_index: usize,
}

/// Which pattern family recognised a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Gate,
    Parking,
}

/// A menu option the mapper recognised as a gate or parking position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPosition {
    /// Identifier captured from the option, e.g. `11B` or `Stand 501`.
    pub token: String,
    /// The option text as the addon showed it.
    pub full_text: String,
    pub coordinate: NavigationCoordinate,
    /// Title of the page the option was found on.
    pub menu_title: String,
    pub depth: usize,
    pub category: Category,
}

/// A position filed under a terminal and gate key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpretedPosition {
    pub terminal: String,
    pub gate: String,
    /// Human-readable label: `Terminal <terminal> Gate <gate>`.
    pub position_id: String,
    #[serde(rename = "type")]
    pub kind: Category,
    pub raw: RawPosition,
}
