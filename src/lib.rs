// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod factor;
pub mod history;
pub mod metrics;
pub mod rolling;
pub mod score;
pub mod service;
pub mod store;
pub mod sweet_spots;
pub mod validate;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::{ScoringConfig, Settings};
pub use crate::factor::{Factor, PerFactor};
pub use crate::history::{DailyEntry, History, RawLogRow};
pub use crate::score::{compute_life_score, Band, LifeScoreResult, OptimalZone, StabilityResult};
pub use crate::service::LifeService;
pub use crate::store::{FileStore, MemoryStore, StoreError};
pub use crate::sweet_spots::SweetSpotProfile;

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Short, stable tag for a user id so raw ids never reach the logs.
pub fn user_tag(user_id: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(user_id.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Install the tracing subscriber: `$AXIS_LOG` filter (default
/// `axis_life_score=info,warn`), compact or JSON lines. No-op if a global
/// subscriber is already set (e.g. by the deployment runtime).
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_env(config::ENV_LOG_FILTER)
        .unwrap_or_else(|_| EnvFilter::new("axis_life_score=info,warn"));

    let registry = tracing_subscriber::registry().with(filter);
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Build the full router from environment: settings, scoring config, file
/// store under `$DATA_DIR`.
pub fn app() -> anyhow::Result<axum::Router> {
    let settings = Settings::from_env();
    let config = ScoringConfig::load_default()?;
    info!(data_dir = %settings.data_dir.display(), "using file store");
    let store = FileStore::new(settings.data_dir);
    let service = LifeService::new(Arc::new(store), Arc::new(config));
    Ok(router(AppState::new(service)))
}
