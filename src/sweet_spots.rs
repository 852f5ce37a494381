//! # Sweet Spots
//!
//! Slow, cross-session personalization of each factor's target value.
//!
//! - Runs only once the user's raw log has at least `min_rows` rows.
//! - Per factor, the estimate is the logged value whose days had the highest
//!   mean mood (ties → the smallest such value); with no usable values the
//!   plain column mean is used instead.
//! - `new = old * (1 - alpha) + estimate * alpha`, where `old` is the stored
//!   target or the configured seed.
//! - The result is clamped into the factor's safety bounds and rounded to
//!   two decimals before it is stored.
//!
//! Independent of the optimum estimator in `score::optimum`: different data
//! (raw log vs. history), different storage, no shared state.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::SweetSpotConfig;
use crate::factor::{Factor, PerFactor};
use crate::history::RawLogRow;
use crate::store::{RawLogStore, StoreError, SweetSpotStore};
use crate::user_tag;

/// Persisted per-user targets. Serializes as `{"sleep": .., "activity": .., ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SweetSpotProfile {
    pub targets: PerFactor<f64>,
}

impl SweetSpotProfile {
    pub fn seeded(cfg: &SweetSpotConfig) -> Self {
        Self { targets: cfg.seeds }
    }

    pub fn get(&self, factor: Factor) -> f64 {
        *self.targets.get(factor)
    }
}

/// Estimate the factor value associated with the best mood.
///
/// Rows are grouped by exact factor value; the group with the highest mean
/// mood wins. Returns `None` only when there is nothing to average at all.
pub fn estimate_sweet_spot(rows: &[RawLogRow], factor: Factor) -> Option<f64> {
    let mut pairs: Vec<(f64, f64)> = rows
        .iter()
        .map(|r| (r.factor(factor), r.mood))
        .filter(|(v, m)| v.is_finite() && m.is_finite())
        .collect();

    if pairs.is_empty() {
        let column: Vec<f64> = rows
            .iter()
            .map(|r| r.factor(factor))
            .filter(|v| v.is_finite())
            .collect();
        if column.is_empty() {
            return None;
        }
        return Some(column.iter().sum::<f64>() / column.len() as f64);
    }

    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut best: Option<(f64, f64)> = None; // (value, mean mood)
    for group in pairs.chunk_by(|a, b| a.0 == b.0) {
        let mean = group.iter().map(|(_, m)| m).sum::<f64>() / group.len() as f64;
        match best {
            Some((_, best_mean)) if mean <= best_mean => {}
            _ => best = Some((group[0].0, mean)),
        }
    }
    best.map(|(v, _)| v)
}

/// Exponential smoothing toward `estimate`.
pub fn smooth(old: f64, estimate: f64, alpha: f64) -> f64 {
    old * (1.0 - alpha) + estimate * alpha
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// One adaptation step over `rows` from `previous` (or seeds).
///
/// Every returned target lies within its configured bounds.
pub fn adapt(
    rows: &[RawLogRow],
    previous: Option<&SweetSpotProfile>,
    cfg: &SweetSpotConfig,
) -> SweetSpotProfile {
    let base = previous.copied().unwrap_or_else(|| SweetSpotProfile::seeded(cfg));
    let targets = PerFactor::from_fn(|f| {
        let prev = base.get(f);
        let bounds = cfg.bounds.get(f);
        let Some(estimate) = estimate_sweet_spot(rows, f) else {
            warn!(factor = %f, "no usable values for sweet spot; keeping previous");
            return bounds.clamp(prev);
        };
        let updated = smooth(prev, estimate, cfg.alpha);
        // rounding can step past a non-integral bound
        bounds.clamp(round2(bounds.clamp(updated)))
    });
    SweetSpotProfile { targets }
}

/// Re-estimate and persist the user's sweet spots from their raw log.
///
/// Below `min_rows` this is a logged no-op. Returns only store errors; the
/// outcome is observable through the stored profile.
pub fn recalculate_sweet_spots<S>(
    store: &S,
    user_id: &str,
    cfg: &SweetSpotConfig,
) -> Result<(), StoreError>
where
    S: RawLogStore + SweetSpotStore + ?Sized,
{
    let user = user_tag(user_id);
    let rows = store.load_raw_log(user_id)?;

    if rows.len() < cfg.min_rows {
        info!(%user, rows = rows.len(), min_rows = cfg.min_rows, "not enough data to update sweet spots");
        metrics::counter!("sweet_spot_skipped_total").increment(1);
        return Ok(());
    }

    let previous = store.load_sweet_spots(user_id)?;
    let next = adapt(&rows, previous.as_ref(), cfg);

    for f in Factor::ALL {
        let prev = previous
            .as_ref()
            .map(|p| p.get(f))
            .unwrap_or(*cfg.seeds.get(f));
        info!(
            %user,
            factor = %f,
            prev = format_args!("{prev:.2}"),
            new = format_args!("{:.2}", next.get(f)),
            estimate = ?estimate_sweet_spot(&rows, f),
            "sweet spot updated"
        );
    }

    store.save_sweet_spots(user_id, &next)?;
    metrics::counter!("sweet_spot_updates_total").increment(1);
    info!(%user, profile = ?next.targets, "sweet spots saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn row(mood: f64, sleep: f64, activity: f64, focus: f64, social: f64) -> RawLogRow {
        RawLogRow {
            user_id: "u1".into(),
            date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            mood,
            sleep,
            activity,
            focus,
            social,
        }
    }

    fn log(store: &MemoryStore, n: usize) {
        for i in 0..n {
            let r = row(5.0 + (i % 5) as f64, 6.0 + (i % 4) as f64, 5.0, 6.0, 3.0);
            store.append_raw_log_row(&r).unwrap();
        }
    }

    #[test]
    fn estimate_picks_value_with_highest_mean_mood() {
        let rows = vec![
            row(4.0, 6.0, 5.0, 5.0, 5.0),
            row(9.0, 8.0, 5.0, 5.0, 5.0),
            row(7.0, 8.0, 5.0, 5.0, 5.0),
            row(6.0, 7.0, 5.0, 5.0, 5.0),
        ];
        assert_eq!(estimate_sweet_spot(&rows, Factor::Sleep), Some(8.0));
    }

    #[test]
    fn estimate_ties_prefer_smallest_value() {
        let rows = vec![row(8.0, 9.0, 5.0, 5.0, 5.0), row(8.0, 7.0, 5.0, 5.0, 5.0)];
        assert_eq!(estimate_sweet_spot(&rows, Factor::Sleep), Some(7.0));
    }

    #[test]
    fn estimate_falls_back_to_mean_when_moods_unusable() {
        let rows = vec![row(f64::NAN, 6.0, 5.0, 5.0, 5.0), row(f64::NAN, 8.0, 5.0, 5.0, 5.0)];
        assert_eq!(estimate_sweet_spot(&rows, Factor::Sleep), Some(7.0));
        assert_eq!(estimate_sweet_spot(&[], Factor::Sleep), None);
    }

    #[test]
    fn smoothing_formula() {
        assert!((smooth(8.0, 6.0, 0.3) - 7.4).abs() < 1e-12);
    }

    #[test]
    fn clamps_into_safety_bounds_even_when_smoothing_exceeds() {
        let cfg = SweetSpotConfig::default();
        let rows: Vec<_> = (0..12).map(|_| row(9.0, 12.0, 10.0, 0.0, 10.0)).collect();
        let prev = SweetSpotProfile {
            targets: PerFactor {
                sleep: 11.0,
                activity: 10.0,
                focus: 1.0,
                social: 10.0,
            },
        };
        let next = adapt(&rows, Some(&prev), &cfg);
        for (f, v) in next.targets.iter() {
            assert!(cfg.bounds.get(f).contains(*v), "{f} = {v} out of bounds");
        }
        assert_eq!(next.get(Factor::Sleep), 9.0);
        assert_eq!(next.get(Factor::Focus), 2.0);
    }

    #[test]
    fn rounds_to_two_decimals() {
        let cfg = SweetSpotConfig::default();
        let rows: Vec<_> = (0..10).map(|_| row(7.0, 7.333, 5.0, 6.0, 3.0)).collect();
        let next = adapt(&rows, None, &cfg);
        // 8.0 * 0.7 + 7.333 * 0.3 = 7.7999 → 7.8
        assert_eq!(next.get(Factor::Sleep), 7.8);
    }

    #[test]
    fn nine_rows_is_a_no_op() {
        let store = MemoryStore::new();
        log(&store, 9);
        recalculate_sweet_spots(&store, "u1", &SweetSpotConfig::default()).unwrap();
        assert_eq!(store.load_sweet_spots("u1").unwrap(), None);
    }

    #[test]
    fn nine_rows_leaves_existing_profile_untouched() {
        let store = MemoryStore::new();
        let existing = SweetSpotProfile {
            targets: PerFactor {
                sleep: 7.0,
                activity: 4.0,
                focus: 5.0,
                social: 2.0,
            },
        };
        store.save_sweet_spots("u1", &existing).unwrap();
        log(&store, 9);
        recalculate_sweet_spots(&store, "u1", &SweetSpotConfig::default()).unwrap();
        assert_eq!(store.load_sweet_spots("u1").unwrap(), Some(existing));
    }

    #[test]
    fn ten_rows_creates_profile_from_seeds() {
        let store = MemoryStore::new();
        log(&store, 10);
        let cfg = SweetSpotConfig::default();
        recalculate_sweet_spots(&store, "u1", &cfg).unwrap();
        let p = store.load_sweet_spots("u1").unwrap().expect("profile created");
        // activity/focus/social always logged at their seeds → unchanged
        assert_eq!(p.get(Factor::Activity), 5.0);
        assert_eq!(p.get(Factor::Focus), 6.0);
        assert_eq!(p.get(Factor::Social), 3.0);
        for (f, v) in p.targets.iter() {
            assert!(cfg.bounds.get(f).contains(*v));
        }
    }

    #[test]
    fn other_users_rows_do_not_count() {
        let store = MemoryStore::new();
        log(&store, 9);
        let mut r = row(7.0, 7.0, 5.0, 6.0, 3.0);
        r.user_id = "u2".into();
        store.append_raw_log_row(&r).unwrap();
        recalculate_sweet_spots(&store, "u1", &SweetSpotConfig::default()).unwrap();
        assert_eq!(store.load_sweet_spots("u1").unwrap(), None);
    }
}
