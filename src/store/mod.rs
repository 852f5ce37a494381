//! Per-user keyed persistence for the three independent stores:
//! daily-entry history, the raw adapter log, and sweet-spot profiles.
//!
//! Absence is never an error (empty history, empty log, no profile).
//! Malformed records always are: callers get `StoreError::Corrupt` instead of
//! a silently reset state.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::history::{DailyEntry, History, RawLogRow};
use crate::sweet_spots::SweetSpotProfile;

const MAX_USER_ID_LEN: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid user id {0:?}")]
    InvalidUserId(String),
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupted record in {path:?}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("corrupted record in {path:?} line {line}: {source}")]
    CorruptLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Stored data exists but cannot be read back.
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            StoreError::Corrupt { .. } | StoreError::CorruptLine { .. }
        )
    }
}

/// User ids become file names: `[A-Za-z0-9_-]{1,64}` only.
pub fn check_user_id(user_id: &str) -> Result<(), StoreError> {
    let ok = !user_id.is_empty()
        && user_id.len() <= MAX_USER_ID_LEN
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidUserId(user_id.to_string()))
    }
}

pub trait HistoryStore: Send + Sync {
    /// Insert or overwrite the entry for `entry.date`.
    fn upsert_daily_entry(&self, user_id: &str, entry: DailyEntry) -> Result<(), StoreError>;
    fn load_history(&self, user_id: &str) -> Result<History, StoreError>;
}

pub trait RawLogStore: Send + Sync {
    /// Append-only; rows are never rewritten. The row carries its user id.
    fn append_raw_log_row(&self, row: &RawLogRow) -> Result<(), StoreError>;
    fn load_raw_log(&self, user_id: &str) -> Result<Vec<RawLogRow>, StoreError>;
}

pub trait SweetSpotStore: Send + Sync {
    fn load_sweet_spots(&self, user_id: &str) -> Result<Option<SweetSpotProfile>, StoreError>;
    fn save_sweet_spots(&self, user_id: &str, profile: &SweetSpotProfile) -> Result<(), StoreError>;
}

/// Everything the service needs from storage.
pub trait LifeStore: HistoryStore + RawLogStore + SweetSpotStore {}

impl<T: HistoryStore + RawLogStore + SweetSpotStore> LifeStore for T {}
