//! Personal optimum and tolerance per factor, learned from recent entries.
//!
//! Window: the most recent `window` entries on/before `as_of` (gaps allowed).
//! Optimum: mean factor value over days whose mood is at least the window's
//! median mood. Tolerance: `max(min_tolerance, std)` over the window's factor
//! values, with zero variance mapped to `zero_variance_tolerance`.
//! Fewer than `min_points` factor or mood values → configured default.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::OptimumConfig;
use crate::factor::Factor;
use crate::history::History;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimalZone {
    pub factor: Factor,
    pub optimal: f64,
    pub tolerance: f64,
    /// `false` when the configured default was used.
    pub personalized: bool,
}

impl OptimalZone {
    fn fallback(factor: Factor, cfg: &OptimumConfig) -> Self {
        let d = cfg.defaults.get(factor);
        Self {
            factor,
            optimal: d.optimal,
            tolerance: d.tolerance,
            personalized: false,
        }
    }
}

pub fn estimate_zone(
    history: &History,
    factor: Factor,
    as_of: NaiveDate,
    cfg: &OptimumConfig,
) -> OptimalZone {
    let recent: Vec<_> = history.recent_up_to(as_of, cfg.window).collect();

    let values: Vec<f64> = recent.iter().filter_map(|e| e.factor(factor)).collect();
    let moods: Vec<f64> = recent.iter().filter_map(|e| e.mood()).collect();

    if values.len() < cfg.min_points || moods.len() < cfg.min_points {
        debug!(
            %factor,
            values = values.len(),
            moods = moods.len(),
            min_points = cfg.min_points,
            "insufficient history for optimum; using default"
        );
        return OptimalZone::fallback(factor, cfg);
    }

    let median_mood = median(&moods);

    let good: Vec<f64> = recent
        .iter()
        .filter(|e| e.mood().is_some_and(|m| m >= median_mood))
        .filter_map(|e| e.factor(factor))
        .collect();
    if good.is_empty() {
        debug!(%factor, "no good-mood days with this factor; using default");
        return OptimalZone::fallback(factor, cfg);
    }
    let optimal = mean(&good);

    let std = std_dev(&values);
    let tolerance = if std > 0.0 {
        std.max(cfg.min_tolerance)
    } else {
        cfg.zero_variance_tolerance.max(cfg.min_tolerance)
    };

    OptimalZone {
        factor,
        optimal,
        tolerance,
        personalized: true,
    }
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Middle element, or the mean of the two middle elements for even counts.
fn median(xs: &[f64]) -> f64 {
    let mut s = xs.to_vec();
    s.sort_by(f64::total_cmp);
    let mid = s.len() / 2;
    if s.len() % 2 == 1 {
        s[mid]
    } else {
        (s[mid - 1] + s[mid]) / 2.0
    }
}

/// Standard deviation of the window's values (divides by n).
fn std_dev(xs: &[f64]) -> f64 {
    let m = mean(xs);
    let var = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64;
    var.sqrt()
}
