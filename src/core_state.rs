//! Shared application state.
//!
//! `CoreState` is wrapped in `Arc` at startup and shared by every request
//! handler. It owns the database location and the process-wide hardware
//! status mirror. Connections are opened per operation; the mirror sits
//! behind an `RwLock` so pollers read concurrently while writers block.

use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config;
use crate::db::{self, DatabaseError};
use crate::hardware::BoxMirror;

pub struct CoreState {
    /// SQLite database file backing all per-user records.
    pub db_path: PathBuf,
    /// In-memory hardware status mirror. Not persisted; empty after restart.
    mirror: RwLock<BoxMirror>,
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("state lock poisoned")]
    LockPoisoned,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl CoreState {
    /// Create state pointing at the default database location.
    pub fn new() -> Self {
        Self::with_db_path(config::db_path())
    }

    /// Create state with an explicit database path (tests use a tempdir).
    pub fn with_db_path(db_path: PathBuf) -> Self {
        Self {
            db_path,
            mirror: RwLock::new(BoxMirror::new()),
        }
    }

    /// Open a database connection. Migrations are idempotent, so every
    /// open on a fresh path also bootstraps the schema.
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        Ok(db::open_database(&self.db_path)?)
    }

    pub fn read_mirror(&self) -> Result<RwLockReadGuard<'_, BoxMirror>, CoreError> {
        self.mirror.read().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn write_mirror(&self) -> Result<RwLockWriteGuard<'_, BoxMirror>, CoreError> {
        self.mirror.write().map_err(|_| CoreError::LockPoisoned)
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self::new()
    }
}
