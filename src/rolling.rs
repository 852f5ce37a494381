//! # Rolling Window
//! Average Life Score over the last N calendar days (default 7).
//!
//! Only days that have an entry are scored; each of them is evaluated with
//! that day as its own as-of date, so later entries never leak into an
//! earlier day's score. Informational only.

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::ScoringConfig;
use crate::history::History;
use crate::score::compute_life_score;
use crate::score::stability::lag_dates;

pub const WEEK_DAYS: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowSummary {
    /// `None` when no day in the window has an entry.
    pub average: Option<f64>,
    /// Number of days averaged.
    pub days: usize,
    pub window_days: usize,
    /// Per-day scores, newest first.
    pub scores: Vec<(NaiveDate, i64)>,
}

/// Average score over `window_days` days ending at `as_of`.
pub fn average_over(
    history: &History,
    as_of: NaiveDate,
    window_days: usize,
    cfg: &ScoringConfig,
) -> WindowSummary {
    let scores: Vec<(NaiveDate, i64)> = lag_dates(as_of, window_days)
        .filter(|d| history.get(*d).is_some())
        .map(|d| (d, compute_life_score(history, d, cfg).score))
        .collect();

    let days = scores.len();
    let average = if days > 0 {
        Some(scores.iter().map(|(_, s)| *s as f64).sum::<f64>() / days as f64)
    } else {
        None
    };

    WindowSummary {
        average,
        days,
        window_days,
        scores,
    }
}

/// Convenience for the 7-day window.
pub fn weekly_average(history: &History, as_of: NaiveDate, cfg: &ScoringConfig) -> WindowSummary {
    average_over(history, as_of, WEEK_DAYS, cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::DailyEntry;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, day).unwrap()
    }

    #[test]
    fn empty_window_has_no_average() {
        let s = weekly_average(&History::new(), d(10), &ScoringConfig::default());
        assert_eq!(s.days, 0);
        assert_eq!(s.average, None);
    }

    #[test]
    fn averages_only_days_with_entries() {
        let h = History::from_entries([
            DailyEntry::new(d(10), 8, 7.5, 6.0, 7.0, 4.0),
            DailyEntry::new(d(7), 5, 6.0, 3.0, 4.0, 2.0),
            DailyEntry::new(d(1), 9, 8.0, 5.0, 6.0, 3.0), // outside 7 days
        ]);
        let cfg = ScoringConfig::default();
        let s = weekly_average(&h, d(10), &cfg);
        assert_eq!(s.days, 2);
        let a = compute_life_score(&h, d(10), &cfg).score as f64;
        let b = compute_life_score(&h, d(7), &cfg).score as f64;
        assert!((s.average.unwrap() - (a + b) / 2.0).abs() < 1e-12);
        assert_eq!(s.scores[0].0, d(10));
    }

    #[test]
    fn each_day_scored_as_of_itself() {
        let h = History::from_entries([
            DailyEntry::new(d(9), 9, 8.0, 5.0, 6.0, 3.0),
            DailyEntry::new(d(10), 2, 4.0, 0.0, 1.0, 9.0),
        ]);
        let cfg = ScoringConfig::default();
        let s = weekly_average(&h, d(10), &cfg);
        let only_ninth = History::from_entries([DailyEntry::new(d(9), 9, 8.0, 5.0, 6.0, 3.0)]);
        let expected = compute_life_score(&only_ninth, d(9), &cfg).score;
        assert_eq!(s.scores[1], (d(9), expected));
    }
}
