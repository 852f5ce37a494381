//! In-process store, used by tests and embedders that persist elsewhere.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{check_user_id, HistoryStore, RawLogStore, StoreError, SweetSpotStore};
use crate::history::{DailyEntry, History, RawLogRow};
use crate::sweet_spots::SweetSpotProfile;

#[derive(Debug, Default)]
pub struct MemoryStore {
    histories: Mutex<HashMap<String, History>>,
    raw_log: Mutex<Vec<RawLogRow>>,
    profiles: Mutex<HashMap<String, SweetSpotProfile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryStore {
    fn upsert_daily_entry(&self, user_id: &str, entry: DailyEntry) -> Result<(), StoreError> {
        check_user_id(user_id)?;
        let mut map = self.histories.lock().expect("history map mutex poisoned");
        map.entry(user_id.to_string()).or_default().upsert(entry);
        Ok(())
    }

    fn load_history(&self, user_id: &str) -> Result<History, StoreError> {
        check_user_id(user_id)?;
        let map = self.histories.lock().expect("history map mutex poisoned");
        Ok(map.get(user_id).cloned().unwrap_or_default())
    }
}

impl RawLogStore for MemoryStore {
    fn append_raw_log_row(&self, row: &RawLogRow) -> Result<(), StoreError> {
        check_user_id(&row.user_id)?;
        self.raw_log
            .lock()
            .expect("raw log mutex poisoned")
            .push(row.clone());
        Ok(())
    }

    fn load_raw_log(&self, user_id: &str) -> Result<Vec<RawLogRow>, StoreError> {
        check_user_id(user_id)?;
        let rows = self.raw_log.lock().expect("raw log mutex poisoned");
        Ok(rows.iter().filter(|r| r.user_id == user_id).cloned().collect())
    }
}

impl SweetSpotStore for MemoryStore {
    fn load_sweet_spots(&self, user_id: &str) -> Result<Option<SweetSpotProfile>, StoreError> {
        check_user_id(user_id)?;
        let map = self.profiles.lock().expect("profile map mutex poisoned");
        Ok(map.get(user_id).copied())
    }

    fn save_sweet_spots(&self, user_id: &str, profile: &SweetSpotProfile) -> Result<(), StoreError> {
        check_user_id(user_id)?;
        let mut map = self.profiles.lock().expect("profile map mutex poisoned");
        map.insert(user_id.to_string(), *profile);
        Ok(())
    }
}
