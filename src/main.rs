//! Axis Life Score service binary entrypoint.
//! Boots the Axum HTTP server with the file-backed store and Prometheus metrics.

use axis_life_score::{app, init_tracing, metrics::Metrics, Settings};
use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing(Settings::from_env().log_json);

    let router = app()?;
    let router = match Metrics::init() {
        Ok(m) => router.merge(m.router()),
        Err(e) => {
            tracing::warn!(error = %e, "metrics disabled");
            router
        }
    };

    Ok(router.into())
}
