//! Per-user orchestration that the interface layers call into.
//!
//! Every read-modify-write of one user's state (history, raw log, sweet-spot
//! profile) runs under that user's lock. Different users never contend.

use chrono::{Local, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::config::ScoringConfig;
use crate::history::{DailyEntry, History, RawLogRow};
use crate::rolling::{weekly_average, WindowSummary};
use crate::score::{compute_life_score, LifeScoreResult};
use crate::store::{check_user_id, LifeStore, StoreError};
use crate::sweet_spots::{recalculate_sweet_spots, SweetSpotProfile};
use crate::user_tag;
use crate::validate::ValidEntry;

/// Mutex per user id, present only while some call holds or awaits it.
#[derive(Debug, Default)]
struct UserLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UserLocks {
    fn for_user(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().expect("user lock map poisoned");
        map.entry(user_id.to_string()).or_default().clone()
    }

    /// Give back a handle from `for_user`; the entry goes away with the last one.
    fn release(&self, user_id: &str, lock: Arc<Mutex<()>>) {
        let mut map = self.inner.lock().expect("user lock map poisoned");
        drop(lock);
        if map.get(user_id).is_some_and(|l| Arc::strong_count(l) == 1) {
            map.remove(user_id);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().expect("user lock map poisoned").len()
    }
}

pub struct LifeService {
    store: Arc<dyn LifeStore>,
    config: Arc<ScoringConfig>,
    locks: UserLocks,
}

impl LifeService {
    pub fn new(store: Arc<dyn LifeStore>, config: Arc<ScoringConfig>) -> Self {
        Self {
            store,
            config,
            locks: UserLocks::default(),
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    fn with_user<T>(
        &self,
        user_id: &str,
        f: impl FnOnce() -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        check_user_id(user_id)?;
        let lock = self.locks.for_user(user_id);
        let result = {
            let _guard = lock.lock().expect("user mutex poisoned");
            f()
        };
        self.locks.release(user_id, lock);
        result
    }

    /// Store a validated day, feed the raw log, adapt sweet spots, and return
    /// the day's Life Score.
    pub fn log_day(
        &self,
        user_id: &str,
        date: NaiveDate,
        input: ValidEntry,
        at: NaiveDateTime,
    ) -> Result<LifeScoreResult, StoreError> {
        self.with_user(user_id, || {
            let entry = DailyEntry::new(
                date,
                input.mood,
                input.sleep,
                input.activity,
                input.focus,
                input.social,
            )
            .at(at);

            self.store.upsert_daily_entry(user_id, entry.clone())?;
            self.store
                .append_raw_log_row(&RawLogRow::from_entry(user_id, &entry))?;
            metrics::counter!("daily_entries_logged_total").increment(1);
            info!(
                user = %user_tag(user_id),
                %date,
                mood = input.mood,
                sleep = input.sleep,
                activity = input.activity,
                focus = input.focus,
                social = input.social,
                "daily entry stored"
            );

            recalculate_sweet_spots(self.store.as_ref(), user_id, &self.config.sweet_spots)?;

            let history = self.store.load_history(user_id)?;
            Ok(self.score_history(&history, date))
        })
    }

    /// Convenience: log for the local current day.
    pub fn log_today(&self, user_id: &str, input: ValidEntry) -> Result<LifeScoreResult, StoreError> {
        let now = Local::now().naive_local();
        self.log_day(user_id, now.date(), input, now)
    }

    /// Life Score as of `as_of`; `None` when the user has no entry that day.
    pub fn score(&self, user_id: &str, as_of: NaiveDate) -> Result<Option<LifeScoreResult>, StoreError> {
        self.with_user(user_id, || {
            let history = self.store.load_history(user_id)?;
            if history.get(as_of).is_none() {
                return Ok(None);
            }
            Ok(Some(self.score_history(&history, as_of)))
        })
    }

    pub fn week(&self, user_id: &str, as_of: NaiveDate) -> Result<WindowSummary, StoreError> {
        self.with_user(user_id, || {
            let history = self.store.load_history(user_id)?;
            Ok(weekly_average(&history, as_of, &self.config))
        })
    }

    pub fn export(&self, user_id: &str) -> Result<History, StoreError> {
        self.with_user(user_id, || self.store.load_history(user_id))
    }

    pub fn recalculate_sweet_spots(&self, user_id: &str) -> Result<(), StoreError> {
        self.with_user(user_id, || {
            recalculate_sweet_spots(self.store.as_ref(), user_id, &self.config.sweet_spots)
        })
    }

    /// `None` means "not yet established".
    pub fn sweet_spots(&self, user_id: &str) -> Result<Option<SweetSpotProfile>, StoreError> {
        self.with_user(user_id, || self.store.load_sweet_spots(user_id))
    }

    fn score_history(&self, history: &History, as_of: NaiveDate) -> LifeScoreResult {
        let result = compute_life_score(history, as_of, &self.config);
        metrics::counter!("life_score_computed_total").increment(1);
        metrics::histogram!("life_score_value").record(result.score as f64);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor::Factor;
    use crate::score::Band;
    use crate::store::{FileStore, MemoryStore, RawLogStore};
    use std::thread;

    fn service() -> LifeService {
        LifeService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(ScoringConfig::default()),
        )
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, day).unwrap()
    }

    fn input(mood: u8, sleep: f64) -> ValidEntry {
        ValidEntry {
            mood,
            sleep,
            activity: 6.0,
            focus: 7.0,
            social: 4.0,
        }
    }

    #[test]
    fn first_log_scores_from_defaults() {
        let svc = service();
        let r = svc
            .log_day("u1", d(1), input(8, 7.5), d(1).and_hms_opt(21, 0, 0).unwrap())
            .unwrap();
        assert_eq!(r.score, 40);
        assert_eq!(r.band, Band::Low);
        assert_eq!(svc.sweet_spots("u1").unwrap(), None);
    }

    #[test]
    fn relogging_same_day_overwrites_history_but_appends_log() {
        let svc = service();
        let at = d(1).and_hms_opt(9, 0, 0).unwrap();
        svc.log_day("u1", d(1), input(3, 6.0), at).unwrap();
        svc.log_day("u1", d(1), input(9, 8.0), at).unwrap();
        let h = svc.export("u1").unwrap();
        assert_eq!(h.len(), 1);
        assert_eq!(h.get(d(1)).unwrap().mood, Some(9));
        assert_eq!(h.get(d(1)).unwrap().timestamp, Some(at));
    }

    #[test]
    fn tenth_log_establishes_sweet_spots() {
        let svc = service();
        for i in 1..=9 {
            let at = d(i).and_hms_opt(20, 0, 0).unwrap();
            svc.log_day("u1", d(i), input(5 + (i % 4) as u8, 7.0), at).unwrap();
        }
        assert_eq!(svc.sweet_spots("u1").unwrap(), None);
        svc.log_day("u1", d(10), input(9, 8.0), d(10).and_hms_opt(20, 0, 0).unwrap())
            .unwrap();
        let p = svc.sweet_spots("u1").unwrap().expect("established");
        assert!(svc.config().sweet_spots.bounds.sleep.contains(p.get(Factor::Sleep)));
    }

    #[test]
    fn score_for_day_without_entry_is_none() {
        let svc = service();
        assert!(svc.score("u1", d(5)).unwrap().is_none());
    }

    #[test]
    fn invalid_user_id_is_rejected() {
        let svc = service();
        let err = svc.export("../../etc").unwrap_err();
        assert!(matches!(err, StoreError::InvalidUserId(_)));
    }

    #[test]
    fn concurrent_logs_for_one_user_are_not_lost() {
        // FileStore rewrites the whole history file per upsert, so only the
        // per-user lock keeps concurrent writers from dropping each other's days.
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path()));
        let svc = Arc::new(LifeService::new(
            store.clone(),
            Arc::new(ScoringConfig::default()),
        ));
        let handles: Vec<_> = (1..=28)
            .map(|i| {
                let svc = Arc::clone(&svc);
                thread::spawn(move || {
                    let at = d(i).and_hms_opt(12, 0, 0).unwrap();
                    svc.log_day("u1", d(i), input(6, 7.0), at).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(svc.export("u1").unwrap().len(), 28);
        assert_eq!(store.load_raw_log("u1").unwrap().len(), 28);
        assert!(svc.sweet_spots("u1").unwrap().is_some());
        assert_eq!(svc.locks.len(), 0);
    }

    #[test]
    fn lock_map_does_not_grow_with_unknown_users() {
        let svc = service();
        for i in 0..10_000 {
            assert!(svc.score(&format!("ghost{i}"), d(1)).unwrap().is_none());
        }
        svc.week("ghost", d(1)).unwrap();
        svc.export("ghost").unwrap();
        svc.sweet_spots("ghost").unwrap();
        assert_eq!(svc.locks.len(), 0);
    }

    #[test]
    fn lock_entry_survives_while_another_caller_holds_it() {
        let locks = UserLocks::default();
        let a = locks.for_user("u1");
        let b = locks.for_user("u1");
        assert!(Arc::ptr_eq(&a, &b));
        locks.release("u1", a);
        assert_eq!(locks.len(), 1);
        locks.release("u1", b);
        assert_eq!(locks.len(), 0);
    }
}
