//! The addon's menu, seen through its snapshot file.
//!
//! The addon mirrors whatever menu it is showing into a plain text file:
//! the first line is the title, every following line is one selectable
//! option. We drive it by writing option indices to a simulator variable
//! and watching the file for the result.

mod navigator;
mod reader;

pub use navigator::{MatchMode, NavState, Navigator};
pub use reader::MenuReader;

use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::sim::SimError;

/// Menu words that move between pages rather than select anything.
pub const NAVIGATION_OPTIONS: [&str; 5] = ["Next", "Previous", "Back", "Exit", "Cancel"];

/// Errors raised while reading or driving the menu.
#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error("menu file not found in any configured path: {}", format_paths(.0))]
    FileNotFound(Vec<PathBuf>),

    #[error("menu file stayed empty after {0} reads")]
    EmptyMenu(u32),

    #[error("menu did not change after selecting option {index} on '{title}'")]
    NotChanged { index: usize, title: String },

    #[error("could not find {keywords:?} after {attempts} page(s)")]
    OptionNotFound {
        keywords: Vec<String>,
        attempts: u32,
    },

    #[error("expected a Next option on '{0}' but there was none")]
    PaginationEnded(String),

    #[error("airport mismatch: expected {expected}, menu shows {found}")]
    AirportMismatch { expected: String, found: String },

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("cancelled")]
    Cancelled,

    #[error(transparent)]
    Connection(#[from] SimError),

    #[error("I/O error reading menu: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = core::result::Result<T, MenuError>;

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One snapshot of the menu file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    pub title: String,
    pub options: Vec<String>,
    /// Modification time of the file when it was read.
    pub source_timestamp: Option<jiff::Timestamp>,
}

impl MenuState {
    /// Placeholder state held before the first read.
    pub fn initial() -> Self {
        Self {
            title: "Initial".to_string(),
            options: vec!["Initial".to_string()],
            source_timestamp: None,
        }
    }

    /// Parse a snapshot from the file contents.
    ///
    /// Returns `None` for an empty file or an empty title line, which is what
    /// a read in the middle of the addon's rewrite looks like.
    pub fn parse(contents: &str, source_timestamp: Option<jiff::Timestamp>) -> Option<Self> {
        let mut lines = contents.lines().map(str::trim);
        let title = lines.next().filter(|t| !t.is_empty())?.to_string();
        let mut options: Vec<String> = lines.map(String::from).collect();
        while options.last().is_some_and(String::is_empty) {
            options.pop();
        }
        Some(Self {
            title,
            options,
            source_timestamp,
        })
    }

    /// Hex SHA-256 of the title and options.
    ///
    /// Two snapshots with the same fingerprint show the same menu, whatever
    /// their timestamps say.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.title.as_bytes());
        for option in &self.options {
            hasher.update([0x1f]);
            hasher.update(option.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    /// Index of the first pagination marker, if the page has one.
    pub fn next_index(&self) -> Option<usize> {
        self.options.iter().position(|o| is_next_marker(o))
    }

    /// Whether the page offers a pagination marker.
    pub fn has_next(&self) -> bool {
        self.next_index().is_some()
    }
}

/// An option is a pagination marker when one of its words contains `Next`.
pub fn is_next_marker(option: &str) -> bool {
    option.split_whitespace().any(|w| w.contains("Next"))
}

/// Whether an option only moves around the menu.
pub fn is_navigation_option(option: &str) -> bool {
    NAVIGATION_OPTIONS.contains(&option) || is_next_marker(option)
}
