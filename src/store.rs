//! Persistence slot for the session state
//!
//! The controller reads and writes the state through a single slot and
//! asks the store to flush it after commands and at the end of every
//! profiled cycle. Clearing the store between independent runs is the
//! host's job.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::session::SessionState;

pub trait StateStore {
    fn slot(&self) -> Option<&SessionState>;

    fn slot_mut(&mut self) -> &mut Option<SessionState>;

    /// Persist the current slot contents
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Slot kept in process memory only
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Option<SessionState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn slot(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    fn slot_mut(&mut self) -> &mut Option<SessionState> {
        &mut self.state
    }
}

/// Slot mirrored to a JSON document on disk
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    state: Option<SessionState>,
}

impl JsonFileStore {
    /// Open the store, loading any state a previous run left behind
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            read_state(&path)?
        } else {
            None
        };
        Ok(Self { path, state })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn slot(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    fn slot_mut(&mut self) -> &mut Option<SessionState> {
        &mut self.state
    }

    fn flush(&mut self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.state)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Decode a persisted state document; an empty file or `null` means no session
pub fn read_state(path: &Path) -> Result<Option<SessionState>> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(None);
    }
    Ok(serde_json::from_str(&content)?)
}
