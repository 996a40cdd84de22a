//! Reading Routes
//!
//! Ingestion and latest-snapshot endpoints.
//!
//! - GET /api/datos - Latest reading, 404 when nothing has been ingested
//! - POST /api/datos - Append a reading (optional X-API-KEY check)

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use crate::api::dto::{IngestRequest, StatusResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::store::{Reading, DEFAULT_ZONE};

/// Header carrying the producer's shared secret
const API_KEY_HEADER: &str = "X-API-KEY";

/// GET /api/datos
///
/// The most recently appended reading, regardless of zone.
pub async fn get_latest(State(state): State<Arc<AppState>>) -> Response {
    match state.store.snapshot() {
        Some(reading) => Json(reading).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"status": "sin_datos"}))).into_response(),
    }
}

/// POST /api/datos
///
/// Append a reading to the log and overwrite the latest snapshot. Missing
/// `zona` defaults to `"Z1"`, missing `timestamp` to the current UTC time;
/// `ts_server` is always assigned here.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<IngestRequest>,
) -> ApiResult<Json<StatusResponse>> {
    check_api_key(&state, &headers)?;

    let now = Utc::now();
    let reading = Reading {
        zona: req.zona.unwrap_or_else(|| DEFAULT_ZONE.to_string()),
        timestamp: Some(
            req.timestamp
                .unwrap_or_else(|| now.format("%Y-%m-%d %H:%M:%S").to_string()),
        ),
        ts_server: Some(now.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()),
        temperatura: req.temperatura,
        humedad: req.humedad,
    };

    state.store.append(&reading)?;

    tracing::debug!(zona = %reading.zona, "Appended reading");
    Ok(Json(StatusResponse { status: "ok" }))
}

/// Reject the request when a key is configured and the header does not match
fn check_api_key(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let Some(expected) = state.config.api_key.as_deref() else {
        return Ok(());
    };

    let provided = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    if provided == Some(expected) {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}
