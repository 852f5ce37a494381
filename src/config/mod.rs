// src/config/mod.rs
//! Configuration: the immutable scoring model plus process-level settings.

pub mod scoring;

pub use scoring::{
    BandConfig, BlendConfig, Bounds, LagConfig, MissingDayPolicy, OptimumConfig, ScoringConfig,
    SweetSpotConfig, ZoneDefault, ENV_SCORING_CONFIG_PATH,
};

use std::path::PathBuf;

pub const ENV_DATA_DIR: &str = "DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const ENV_LOG_FILTER: &str = "AXIS_LOG";
pub const ENV_LOG_JSON: &str = "AXIS_LOG_JSON";

/// Process settings read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub log_json: bool,
}

impl Settings {
    pub fn from_env() -> Self {
        let data_dir = std::env::var(ENV_DATA_DIR)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let log_json = std::env::var(ENV_LOG_JSON)
            .ok()
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
        Self { data_dir, log_json }
    }
}
