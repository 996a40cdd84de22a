//! Export Routes
//!
//! CSV download of the (optionally month-filtered) history for one zone.
//!
//! - GET /api/historial_export?zona=&mes= - CSV attachment

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::dto::{non_empty, ExportParams};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::export::{export_csv, export_filename};
use crate::store::DEFAULT_ZONE;

/// GET /api/historial_export
///
/// Streams the filtered history as a CSV file download named
/// `historial_{zona}_{mes|TODO}.csv`.
pub async fn export(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportParams>,
) -> ApiResult<Response> {
    let zona = non_empty(params.zona).unwrap_or_else(|| DEFAULT_ZONE.to_string());
    let mes = non_empty(params.mes);

    let body = export_csv(
        state.store.as_ref(),
        &state.normalizer,
        &zona,
        mes.as_deref(),
        state.max_scan_lines,
    )?;

    let filename = export_filename(&zona, mes.as_deref());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}
