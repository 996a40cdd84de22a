//! History Routes
//!
//! Raw-tail, summary, and filtered-history endpoints.
//!
//! - GET /api/historial - Last n records in log order
//! - GET /api/historial_resumen - Distinct months and days for filter pickers
//! - GET /api/historial_filtro - Zone/month/day/hour filtered, newest first

use axum::{extract::Query, extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{non_empty, FilterParams, TailParams};
use crate::api::state::AppState;
use crate::query::{filter_history, summary_index, HistoryFilter, Summary, DEFAULT_LIMIT};
use crate::store::{Reading, DEFAULT_ZONE};

/// Default tail size for `GET /api/historial`
const DEFAULT_TAIL: usize = 200;

/// GET /api/historial?n=200
///
/// Last `n` records in append order, newest last.
pub async fn tail(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TailParams>,
) -> Json<Vec<Reading>> {
    let n = params.n.unwrap_or(DEFAULT_TAIL);
    Json(state.store.read_tail(n))
}

/// GET /api/historial_resumen
pub async fn summary(State(state): State<Arc<AppState>>) -> Json<Summary> {
    Json(summary_index(state.store.as_ref(), &state.normalizer))
}

/// GET /api/historial_filtro?zona=&mes=&dia=&hora=&n=
///
/// Filtered records sorted by local instant descending.
pub async fn filtered(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> Json<Vec<Reading>> {
    let filter = HistoryFilter {
        zona: non_empty(params.zona).unwrap_or_else(|| DEFAULT_ZONE.to_string()),
        mes: non_empty(params.mes),
        dia: non_empty(params.dia),
        hora: non_empty(params.hora),
        n: params.n.unwrap_or(DEFAULT_LIMIT),
    };

    Json(filter_history(
        state.store.as_ref(),
        &state.normalizer,
        &filter,
        state.max_scan_lines,
    ))
}
