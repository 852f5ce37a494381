//! Weighted composite of the four lag-blended factor goodness signals.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::lag::lag_blend;
use super::normalize::goodness;
use super::optimum::{estimate_zone, OptimalZone};
use crate::config::ScoringConfig;
use crate::factor::{Factor, PerFactor};
use crate::history::History;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityResult {
    /// Weighted sum in `[0, 1]`.
    pub value: f64,
    /// Lag-blended goodness per factor.
    pub components: PerFactor<f64>,
    /// Zones used for normalization.
    pub zones: PerFactor<OptimalZone>,
}

/// The lag days ending at `as_of`, newest first (`as_of`, `as_of - 1`, ...).
pub(crate) fn lag_dates(as_of: NaiveDate, n: usize) -> impl Iterator<Item = NaiveDate> {
    (0..n as u64).filter_map(move |k| as_of.checked_sub_days(Days::new(k)))
}

pub fn compute_stability(history: &History, as_of: NaiveDate, cfg: &ScoringConfig) -> StabilityResult {
    let zones = PerFactor::from_fn(|f| estimate_zone(history, f, as_of, &cfg.optimum));

    let days: Vec<_> = lag_dates(as_of, cfg.lag.weights.len())
        .map(|date| history.get(date))
        .collect();

    let components = PerFactor::from_fn(|f: Factor| {
        let zone = zones.get(f);
        let per_day: Vec<Option<f64>> = days
            .iter()
            .map(|&entry| {
                entry
                    .and_then(|e| e.factor(f))
                    .map(|actual| goodness(actual, zone.optimal, zone.tolerance))
            })
            .collect();
        lag_blend(&per_day, &cfg.lag.weights, cfg.lag.missing_day)
    });

    let value = components
        .iter()
        .map(|(f, c)| cfg.stability_weights.get(f) * c)
        .sum::<f64>()
        .clamp(0.0, 1.0);

    StabilityResult {
        value,
        components,
        zones,
    }
}
