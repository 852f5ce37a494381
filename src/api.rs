use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::history::History;
use crate::rolling::WindowSummary;
use crate::score::LifeScoreResult;
use crate::service::LifeService;
use crate::store::StoreError;
use crate::sweet_spots::SweetSpotProfile;
use crate::user_tag;
use crate::validate::{EntryInput, ValidationError};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LifeService>,
}

impl AppState {
    pub fn new(service: LifeService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/users/{user_id}/entries", post(log_entry))
        .route("/users/{user_id}/score", get(score))
        .route("/users/{user_id}/week", get(week))
        .route("/users/{user_id}/export", get(export))
        .route("/users/{user_id}/sweet-spots", get(sweet_spots))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug)]
pub enum ApiError {
    /// Body is not JSON or does not have the entry shape.
    Body(JsonRejection),
    Validation(ValidationError),
    NoEntry(NaiveDate),
    Store(StoreError),
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::Body(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Body(e) => {
                let msg = e.body_text();
                let field = missing_field(&msg);
                (e.status(), json!({ "error": msg, "field": field }))
            }
            ApiError::Validation(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": e.to_string(), "field": e.field() }),
            ),
            ApiError::NoEntry(date) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("no entry for {date}") }),
            ),
            ApiError::Store(e @ StoreError::InvalidUserId(_)) => {
                (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() }))
            }
            ApiError::Store(e) => {
                warn!(error = %e, corrupt = e.is_corrupt(), "store failure");
                let msg = if e.is_corrupt() {
                    "stored data failed an integrity check"
                } else {
                    "storage unavailable"
                };
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Field named in a serde "missing field `x`" message, if any.
fn missing_field(msg: &str) -> Option<&str> {
    let rest = msg.split_once("missing field `")?.1;
    rest.split_once('`').map(|(field, _)| field)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn log_entry(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Result<Json<EntryInput>, JsonRejection>,
) -> Result<Json<LifeScoreResult>, ApiError> {
    let Json(body) = body?;
    let valid = body.validate().inspect_err(|e| {
        tracing::debug!(user = %user_tag(&user_id), field = e.field(), "rejected entry input");
    })?;
    let result = state.service.log_today(&user_id, valid)?;
    Ok(Json(result))
}

#[derive(Deserialize)]
struct ScoreQuery {
    #[serde(default)]
    as_of: Option<NaiveDate>,
}

async fn score(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(q): Query<ScoreQuery>,
) -> Result<Json<LifeScoreResult>, ApiError> {
    let as_of = q.as_of.unwrap_or_else(today);
    match state.service.score(&user_id, as_of)? {
        Some(r) => Ok(Json(r)),
        None => Err(ApiError::NoEntry(as_of)),
    }
}

async fn week(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<WindowSummary>, ApiError> {
    Ok(Json(state.service.week(&user_id, today())?))
}

async fn export(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<History>, ApiError> {
    Ok(Json(state.service.export(&user_id)?))
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum SweetSpotsOut {
    Established { profile: SweetSpotProfile },
    NotEstablished,
}

async fn sweet_spots(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<SweetSpotsOut>, ApiError> {
    let out = match state.service.sweet_spots(&user_id)? {
        Some(profile) => SweetSpotsOut::Established { profile },
        None => SweetSpotsOut::NotEstablished,
    };
    Ok(Json(out))
}
