// src/store/file.rs
//! File-backed store, one file per user and concern under a data directory:
//!
//! ```text
//! <data_dir>/history/user_<id>.json      {"entries": [...]}
//! <data_dir>/logs/user_<id>.jsonl        one RawLogRow per line, append-only
//! <data_dir>/sweet_spots/user_<id>.json  {"sleep": .., "activity": .., ...}
//! ```
//!
//! Whole-file writes go through `<file>.tmp` + rename.

use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use super::{check_user_id, HistoryStore, RawLogStore, StoreError, SweetSpotStore};
use crate::history::{DailyEntry, History, RawLogRow};
use crate::sweet_spots::SweetSpotProfile;

const HISTORY_DIR: &str = "history";
const LOG_DIR: &str = "logs";
const SWEET_SPOT_DIR: &str = "sweet_spots";

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn user_file(&self, dir: &str, user_id: &str, ext: &str) -> Result<PathBuf, StoreError> {
        check_user_id(user_id)?;
        Ok(self.root.join(dir).join(format!("user_{user_id}.{ext}")))
    }

    pub fn history_path(&self, user_id: &str) -> Result<PathBuf, StoreError> {
        self.user_file(HISTORY_DIR, user_id, "json")
    }

    pub fn raw_log_path(&self, user_id: &str) -> Result<PathBuf, StoreError> {
        self.user_file(LOG_DIR, user_id, "jsonl")
    }

    pub fn sweet_spot_path(&self, user_id: &str) -> Result<PathBuf, StoreError> {
        self.user_file(SWEET_SPOT_DIR, user_id, "json")
    }
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// `Ok(None)` when the file does not exist.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_err(path)(e)),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| {
            warn!(path = %path.display(), error = %source, "stored record is malformed");
            StoreError::Corrupt {
                path: path.to_path_buf(),
                source,
            }
        })
}

fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    Ok(())
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    ensure_parent(path)?;
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| io_err(path)(io::Error::other(e)))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).map_err(io_err(&tmp))?;
    fs::rename(&tmp, path).map_err(io_err(path))?;
    Ok(())
}

impl HistoryStore for FileStore {
    fn upsert_daily_entry(&self, user_id: &str, entry: DailyEntry) -> Result<(), StoreError> {
        let path = self.history_path(user_id)?;
        let mut history: History = read_json(&path)?.unwrap_or_default();
        history.upsert(entry);
        write_json_atomic(&path, &history)?;
        debug!(path = %path.display(), entries = history.len(), "history written");
        Ok(())
    }

    fn load_history(&self, user_id: &str) -> Result<History, StoreError> {
        let path = self.history_path(user_id)?;
        Ok(read_json(&path)?.unwrap_or_default())
    }
}

impl RawLogStore for FileStore {
    fn append_raw_log_row(&self, row: &RawLogRow) -> Result<(), StoreError> {
        let path = self.raw_log_path(&row.user_id)?;
        ensure_parent(&path)?;
        let line = serde_json::to_string(row).map_err(|e| io_err(&path)(io::Error::other(e)))?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err(&path))?;
        writeln!(file, "{line}").map_err(io_err(&path))?;
        Ok(())
    }

    fn load_raw_log(&self, user_id: &str) -> Result<Vec<RawLogRow>, StoreError> {
        let path = self.raw_log_path(user_id)?;
        let file = match fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_err(&path)(e)),
        };

        let mut rows = Vec::new();
        for (i, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(io_err(&path))?;
            if line.trim().is_empty() {
                continue;
            }
            let row: RawLogRow = serde_json::from_str(&line).map_err(|source| {
                warn!(path = %path.display(), line = i + 1, error = %source, "raw log row is malformed");
                StoreError::CorruptLine {
                    path: path.clone(),
                    line: i + 1,
                    source,
                }
            })?;
            rows.push(row);
        }
        Ok(rows)
    }
}

impl SweetSpotStore for FileStore {
    fn load_sweet_spots(&self, user_id: &str) -> Result<Option<SweetSpotProfile>, StoreError> {
        let path = self.sweet_spot_path(user_id)?;
        read_json(&path)
    }

    fn save_sweet_spots(&self, user_id: &str, profile: &SweetSpotProfile) -> Result<(), StoreError> {
        let path = self.sweet_spot_path(user_id)?;
        write_json_atomic(&path, profile)
    }
}
