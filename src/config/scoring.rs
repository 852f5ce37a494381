// src/config/scoring.rs
//! Immutable model configuration for the Life Score pipeline.
//!
//! TOML shape (every key optional, missing keys keep the built-in value):
//! ```toml
//! [stability_weights]
//! sleep = 0.35
//! focus = 0.30
//! activity = 0.20
//! social = 0.15
//!
//! [lag]
//! weights = [0.6, 0.3, 0.1]
//! missing_day = "as_zero"
//!
//! [blend]
//! alpha = 0.7
//! beta = 0.65
//! ```
//!
//! Per-factor tables (`stability_weights`, `optimum.defaults`,
//! `sweet_spots.seeds`, `sweet_spots.bounds`) must list all four factors.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::factor::{Factor, PerFactor};

pub const DEFAULT_SCORING_CONFIG_PATH: &str = "config/scoring.toml";
pub const ENV_SCORING_CONFIG_PATH: &str = "AXIS_SCORING_CONFIG";

const WEIGHT_SUM_EPS: f64 = 1e-6;

/// How the lag blender treats a day without an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDayPolicy {
    /// A missing day contributes 0 with its full weight (conflates "no data"
    /// with "worst value"; current behaviour).
    #[default]
    AsZero,
    /// Missing days are dropped and the weights renormalized over present days.
    Renormalize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LagConfig {
    /// Positional weights: `[today, yesterday, 2 days ago, ...]`.
    pub weights: Vec<f64>,
    pub missing_day: MissingDayPolicy,
}

impl Default for LagConfig {
    fn default() -> Self {
        Self {
            weights: vec![0.6, 0.3, 0.1],
            missing_day: MissingDayPolicy::AsZero,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendConfig {
    /// Mood = alpha * observed + (1 - alpha) * predicted.
    pub alpha: f64,
    /// Life = beta * mood + (1 - beta) * stability.
    pub beta: f64,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            alpha: 0.7,
            beta: 0.65,
        }
    }
}

/// Score thresholds; each value is the inclusive lower bound of its band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandConfig {
    pub stable_min: i64,
    pub high_min: i64,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            stable_min: 50,
            high_min: 75,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneDefault {
    pub optimal: f64,
    pub tolerance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimumConfig {
    /// Most recent N entries considered.
    pub window: usize,
    /// Minimum valid factor values and mood values before personalizing.
    pub min_points: usize,
    pub min_tolerance: f64,
    /// Used instead of `min_tolerance` when the window has zero variance.
    pub zero_variance_tolerance: f64,
    pub defaults: PerFactor<ZoneDefault>,
}

impl Default for OptimumConfig {
    fn default() -> Self {
        let zone = |optimal| ZoneDefault {
            optimal,
            tolerance: 2.0,
        };
        Self {
            window: 14,
            min_points: 5,
            min_tolerance: 1.5,
            zero_variance_tolerance: 2.0,
            defaults: PerFactor {
                sleep: zone(8.0),
                activity: zone(5.0),
                focus: zone(6.0),
                social: zone(3.0),
            },
        }
    }
}

/// Inclusive safety range for a sweet spot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, x: f64) -> f64 {
        x.max(self.min).min(self.max)
    }

    pub fn contains(&self, x: f64) -> bool {
        (self.min..=self.max).contains(&x)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweetSpotConfig {
    /// Exponential smoothing factor toward the new estimate.
    pub alpha: f64,
    /// Raw log rows required before the adapter runs.
    pub min_rows: usize,
    pub seeds: PerFactor<f64>,
    pub bounds: PerFactor<Bounds>,
}

impl Default for SweetSpotConfig {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            min_rows: 10,
            seeds: PerFactor {
                sleep: 8.0,
                activity: 5.0,
                focus: 6.0,
                social: 3.0,
            },
            bounds: PerFactor {
                sleep: Bounds::new(6.0, 9.0),
                activity: Bounds::new(2.0, 10.0),
                focus: Bounds::new(2.0, 10.0),
                social: Bounds::new(0.0, 10.0),
            },
        }
    }
}

/// Every tunable of the scoring model. Built once, shared read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub stability_weights: PerFactor<f64>,
    pub lag: LagConfig,
    pub blend: BlendConfig,
    pub bands: BandConfig,
    pub optimum: OptimumConfig,
    pub sweet_spots: SweetSpotConfig,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            stability_weights: PerFactor {
                sleep: 0.35,
                activity: 0.20,
                focus: 0.30,
                social: 0.15,
            },
            lag: LagConfig::default(),
            blend: BlendConfig::default(),
            bands: BandConfig::default(),
            optimum: OptimumConfig::default(),
            sweet_spots: SweetSpotConfig::default(),
        }
    }
}

impl ScoringConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: ScoringConfig = toml::from_str(s).context("parsing scoring config TOML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading scoring config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("loading scoring config from {}", path.display()))
    }

    /// Resolve the config:
    /// 1) $AXIS_SCORING_CONFIG (must exist)
    /// 2) config/scoring.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_SCORING_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_SCORING_CONFIG_PATH} points to non-existent path");
            }
            info!(path = %pb.display(), "scoring config loaded");
            return Self::load_from_file(&pb);
        }
        let default_path = PathBuf::from(DEFAULT_SCORING_CONFIG_PATH);
        if default_path.exists() {
            info!(path = %default_path.display(), "scoring config loaded");
            return Self::load_from_file(&default_path);
        }
        info!("no scoring config file; using built-in defaults");
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        if Factor::ALL
            .iter()
            .any(|f| !self.stability_weights.get(*f).is_finite())
        {
            bail!("stability weights must be finite");
        }
        let sum: f64 = Factor::ALL
            .iter()
            .map(|f| *self.stability_weights.get(*f))
            .sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_EPS {
            bail!("stability weights must sum to 1.0 (got {sum})");
        }
        if Factor::ALL
            .iter()
            .any(|f| *self.stability_weights.get(*f) < 0.0)
        {
            bail!("stability weights must be non-negative");
        }

        if self.lag.weights.is_empty() {
            bail!("lag weights must not be empty");
        }
        if self.lag.weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            bail!("lag weights must be finite and non-negative");
        }

        for (name, v) in [
            ("blend.alpha", self.blend.alpha),
            ("blend.beta", self.blend.beta),
            ("sweet_spots.alpha", self.sweet_spots.alpha),
        ] {
            if !(0.0..=1.0).contains(&v) {
                bail!("{name} must be within [0, 1] (got {v})");
            }
        }

        if self.bands.stable_min > self.bands.high_min {
            bail!(
                "bands.stable_min ({}) exceeds bands.high_min ({})",
                self.bands.stable_min,
                self.bands.high_min
            );
        }

        if self.optimum.window == 0 {
            bail!("optimum.window must be at least 1");
        }
        for (name, v) in [
            ("optimum.min_tolerance", self.optimum.min_tolerance),
            ("optimum.zero_variance_tolerance", self.optimum.zero_variance_tolerance),
        ] {
            if !v.is_finite() || v <= 0.0 {
                bail!("{name} must be finite and positive (got {v})");
            }
        }
        for f in Factor::ALL {
            let d = self.optimum.defaults.get(f);
            if !d.optimal.is_finite() || !d.tolerance.is_finite() || d.tolerance <= 0.0 {
                bail!("default zone for {f} must be finite with a positive tolerance");
            }
            let b = self.sweet_spots.bounds.get(f);
            if !b.min.is_finite() || !b.max.is_finite() || !self.sweet_spots.seeds.get(f).is_finite() {
                bail!("sweet spot seed and bounds for {f} must be finite");
            }
            if b.min > b.max {
                bail!("sweet spot bounds for {f} have min > max");
            }
        }

        Ok(())
    }
}
