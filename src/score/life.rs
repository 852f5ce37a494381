//! Mood blending and the final 0-100 Life Score.
//!
//! observed  = lag blend of `(mood - 1) / 9` over the lag days
//! predicted = stability value
//! mood      = alpha * observed + (1 - alpha) * predicted
//! life      = beta * mood + (1 - beta) * stability
//! score     = round(100 * life), ties away from zero

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::lag::lag_blend;
use super::normalize::mood_unit;
use super::stability::{compute_stability, lag_dates, StabilityResult};
use crate::config::{BandConfig, ScoringConfig};
use crate::history::History;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Low,
    Stable,
    High,
}

impl Band {
    /// Thresholds are inclusive lower bounds of the upper tiers.
    pub fn for_score(score: i64, bands: &BandConfig) -> Self {
        if score >= bands.high_min {
            Band::High
        } else if score >= bands.stable_min {
            Band::Stable
        } else {
            Band::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Band::Low => "low",
            Band::Stable => "stable",
            Band::High => "high",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeScoreResult {
    pub date: NaiveDate,
    pub score: i64,
    pub band: Band,
    /// Blended mood in `[0, 1]`.
    pub mood: f64,
    /// Lag-blended observed mood.
    pub observed_mood: f64,
    /// Stability-derived mood prediction.
    pub predicted_mood: f64,
    pub stability: StabilityResult,
}

/// Predicted mood is taken to be the stability value itself.
pub fn predict_mood(stability: f64) -> f64 {
    stability
}

/// Lag-blended observed mood ending at `as_of`.
pub fn observed_mood(history: &History, as_of: NaiveDate, cfg: &ScoringConfig) -> f64 {
    let per_day: Vec<Option<f64>> = lag_dates(as_of, cfg.lag.weights.len())
        .map(|date| history.get(date).and_then(|e| e.mood()).map(mood_unit))
        .collect();
    lag_blend(&per_day, &cfg.lag.weights, cfg.lag.missing_day)
}

/// `round(100 * raw)`; `f64::round` rounds halves away from zero.
pub fn score_from_raw(raw: f64) -> i64 {
    (100.0 * raw).round() as i64
}

/// Combine an observed mood and a stability result into the final score.
pub fn compose(
    date: NaiveDate,
    observed: f64,
    stability: StabilityResult,
    cfg: &ScoringConfig,
) -> LifeScoreResult {
    let predicted = predict_mood(stability.value);
    let alpha = cfg.blend.alpha;
    let beta = cfg.blend.beta;

    let mood = alpha * observed + (1.0 - alpha) * predicted;
    let raw = beta * mood + (1.0 - beta) * stability.value;
    let score = score_from_raw(raw);

    LifeScoreResult {
        date,
        score,
        band: Band::for_score(score, &cfg.bands),
        mood,
        observed_mood: observed,
        predicted_mood: predicted,
        stability,
    }
}

/// Life Score of `history` evaluated as of `as_of`. Pure.
pub fn compute_life_score(history: &History, as_of: NaiveDate, cfg: &ScoringConfig) -> LifeScoreResult {
    let stability = compute_stability(history, as_of, cfg);
    let observed = observed_mood(history, as_of, cfg);
    compose(as_of, observed, stability, cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor::PerFactor;
    use crate::history::DailyEntry;
    use crate::score::optimum::OptimalZone;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
    }

    fn stability(value: f64) -> StabilityResult {
        let cfg = ScoringConfig::default();
        StabilityResult {
            value,
            components: PerFactor::from_fn(|_| value),
            zones: PerFactor::from_fn(|f| {
                let d = cfg.optimum.defaults.get(f);
                OptimalZone {
                    factor: f,
                    optimal: d.optimal,
                    tolerance: d.tolerance,
                    personalized: false,
                }
            }),
        }
    }

    #[test]
    fn perfect_inputs_score_one_hundred() {
        let r = compose(day(), 1.0, stability(1.0), &ScoringConfig::default());
        assert!((r.mood - 1.0).abs() < 1e-12);
        assert_eq!(r.score, 100);
        assert_eq!(r.band, Band::High);
    }

    #[test]
    fn half_raw_is_stable_not_low() {
        assert_eq!(score_from_raw(0.5), 50);
        let bands = BandConfig::default();
        assert_eq!(Band::for_score(50, &bands), Band::Stable);
        assert_eq!(Band::for_score(49, &bands), Band::Low);
        assert_eq!(Band::for_score(74, &bands), Band::Stable);
        assert_eq!(Band::for_score(75, &bands), Band::High);

        let r = compose(day(), 0.5, stability(0.5), &ScoringConfig::default());
        assert_eq!(r.score, 50);
        assert_eq!(r.band, Band::Stable);
    }

    #[test]
    fn predicted_mood_equals_stability() {
        let r = compose(day(), 0.2, stability(0.8), &ScoringConfig::default());
        assert_eq!(r.predicted_mood, 0.8);
        assert!((r.mood - (0.7 * 0.2 + 0.3 * 0.8)).abs() < 1e-12);
    }

    #[test]
    fn observed_mood_uses_lag_days() {
        let h = History::from_entries([
            DailyEntry::new(day(), 10, 8.0, 5.0, 6.0, 3.0),
            DailyEntry::new(day().pred_opt().unwrap(), 1, 8.0, 5.0, 6.0, 3.0),
        ]);
        let m = observed_mood(&h, day(), &ScoringConfig::default());
        assert!((m - 0.6).abs() < 1e-12);
    }

    #[test]
    fn first_ever_entry_scenario() {
        let h = History::from_entries([DailyEntry::new(day(), 8, 7.5, 6.0, 7.0, 4.0)]);
        let r = compute_life_score(&h, day(), &ScoringConfig::default());
        let observed = 0.6 * 7.0 / 9.0;
        let stab = 0.35 * 0.45 + 0.30 * 0.30 + 0.20 * 0.30 + 0.15 * 0.30;
        let mood = 0.7 * observed + 0.3 * stab;
        let raw = 0.65 * mood + 0.35 * stab;
        assert!((r.stability.value - stab).abs() < 1e-9);
        assert!((r.observed_mood - observed).abs() < 1e-9);
        assert_eq!(r.score, (100.0 * raw).round() as i64);
        assert_eq!(r.score, 40);
        assert_eq!(r.band, Band::Low);
    }
}
