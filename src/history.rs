//! Daily entries per user and the flat raw log rows.
//!
//! `History` is the scoring input: at most one `DailyEntry` per calendar day,
//! kept ordered by date. `RawLogRow` is the append-only record the sweet-spot
//! adapter learns from; it lives in a separate store on purpose.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::factor::Factor;

/// One self-reported day. Fields are optional so that partially written or
/// older records load as "absent" instead of failing; absent values
/// contribute neutrally (0) to scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEntry {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social: Option<f64>,
    #[serde(rename = "ts", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
}

impl DailyEntry {
    pub fn new(
        date: NaiveDate,
        mood: u8,
        sleep: f64,
        activity: f64,
        focus: f64,
        social: f64,
    ) -> Self {
        Self {
            date,
            mood: Some(mood),
            sleep: Some(sleep),
            activity: Some(activity),
            focus: Some(focus),
            social: Some(social),
            timestamp: None,
        }
    }

    pub fn at(mut self, ts: NaiveDateTime) -> Self {
        self.timestamp = Some(ts);
        self
    }

    /// Finite factor value, `None` when absent or malformed.
    pub fn factor(&self, factor: Factor) -> Option<f64> {
        let v = match factor {
            Factor::Sleep => self.sleep,
            Factor::Activity => self.activity,
            Factor::Focus => self.focus,
            Factor::Social => self.social,
        };
        v.filter(|x| x.is_finite())
    }

    pub fn mood(&self) -> Option<f64> {
        self.mood.map(f64::from)
    }
}

/// Date-ordered entries of one user. Serializes as `{"entries": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "HistoryFile", into = "HistoryFile")]
pub struct History {
    entries: Vec<DailyEntry>,
}

#[derive(Serialize, Deserialize)]
struct HistoryFile {
    #[serde(default)]
    entries: Vec<DailyEntry>,
}

impl From<HistoryFile> for History {
    fn from(f: HistoryFile) -> Self {
        let mut h = History::default();
        for e in f.entries {
            h.upsert(e);
        }
        h
    }
}

impl From<History> for HistoryFile {
    fn from(h: History) -> Self {
        HistoryFile { entries: h.entries }
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = DailyEntry>) -> Self {
        let mut h = Self::default();
        for e in entries {
            h.upsert(e);
        }
        h
    }

    /// Insert or overwrite the entry for `entry.date`, keeping date order.
    pub fn upsert(&mut self, entry: DailyEntry) {
        match self.entries.binary_search_by_key(&entry.date, |e| e.date) {
            Ok(i) => self.entries[i] = entry,
            Err(i) => self.entries.insert(i, entry),
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailyEntry> {
        self.entries
            .binary_search_by_key(&date, |e| e.date)
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn entries(&self) -> &[DailyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&DailyEntry> {
        self.entries.last()
    }

    /// Up to `n` entries dated on/before `as_of`, newest first. Gaps between
    /// dates are not filled.
    pub fn recent_up_to(&self, as_of: NaiveDate, n: usize) -> impl Iterator<Item = &DailyEntry> {
        let end = self.entries.partition_point(|e| e.date <= as_of);
        self.entries[..end].iter().rev().take(n)
    }
}

/// One row of the flat, append-only log used by the sweet-spot adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLogRow {
    pub user_id: String,
    pub date: NaiveDate,
    pub mood: f64,
    pub sleep: f64,
    pub activity: f64,
    pub focus: f64,
    pub social: f64,
}

impl RawLogRow {
    pub fn from_entry(user_id: impl Into<String>, entry: &DailyEntry) -> Self {
        let f = |v: Option<f64>| v.unwrap_or(0.0);
        Self {
            user_id: user_id.into(),
            date: entry.date,
            mood: entry.mood().unwrap_or(0.0),
            sleep: f(entry.sleep),
            activity: f(entry.activity),
            focus: f(entry.focus),
            social: f(entry.social),
        }
    }

    pub fn factor(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Sleep => self.sleep,
            Factor::Activity => self.activity,
            Factor::Focus => self.focus,
            Factor::Social => self.social,
        }
    }
}
