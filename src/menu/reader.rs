//! Menu snapshot reader.

use std::fs;
use std::path::{Path, PathBuf};

use crate::retry::RetryPolicy;

use super::{MenuError, MenuState, Result};

/// Reads the menu file the addon keeps rewriting.
///
/// The file is replaced in place without locking, so a read can land on a
/// truncated file. Empty reads are retried quietly; the caller only ever
/// sees a complete snapshot or an error.
pub struct MenuReader {
    path: PathBuf,
    policy: RetryPolicy,
    current: MenuState,
}

impl MenuReader {
    /// Creates a reader for the first of `candidates` that exists.
    pub fn locate(candidates: &[PathBuf], policy: RetryPolicy) -> Result<Self> {
        let path = candidates
            .iter()
            .find(|p| p.exists())
            .ok_or_else(|| MenuError::FileNotFound(candidates.to_vec()))?;
        tracing::debug!("using menu file {}", path.display());
        Ok(Self::new(path.clone(), policy))
    }

    /// Creates a reader for a known menu file.
    pub fn new(path: PathBuf, policy: RetryPolicy) -> Self {
        Self {
            path,
            policy,
            current: MenuState::initial(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The last snapshot successfully read.
    pub fn current(&self) -> &MenuState {
        &self.current
    }

    /// Reads a fresh snapshot and makes it current.
    pub fn read_menu(&mut self) -> Result<&MenuState> {
        let mut last_io_error = None;
        let mut failures = 0;

        for _ in self.policy.attempts() {
            match self.read_once() {
                Ok(Some(state)) => {
                    if failures > 0 {
                        tracing::debug!("read menu despite {failures} failed read(s)");
                    }
                    self.current = state;
                    return Ok(&self.current);
                }
                Ok(None) => {}
                Err(e) => last_io_error = Some(e),
            }
            failures += 1;
            self.policy.pause();
        }

        match last_io_error {
            Some(e) => {
                tracing::error!("failed to read menu file {}: {e}", self.path.display());
                Err(MenuError::Io(e))
            }
            None => Err(MenuError::EmptyMenu(failures)),
        }
    }

    fn read_once(&self) -> std::io::Result<Option<MenuState>> {
        let modified = fs::metadata(&self.path)?
            .modified()
            .ok()
            .and_then(|t| jiff::Timestamp::try_from(t).ok());
        let contents = fs::read_to_string(&self.path)?;
        Ok(MenuState::parse(&contents, modified))
    }
}
