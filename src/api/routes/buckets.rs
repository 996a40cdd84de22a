//! Bucket Table Route
//!
//! The dashboard's fixed historical grid: 5 trailing calendar days by twelve
//! 2-hour buckets, one last-writer-wins reading per cell.
//!
//! - GET /api/historicos?zona=

use axum::{extract::Query, extract::State, Json};
use std::sync::Arc;

use crate::aggregate::BucketTable;
use crate::api::dto::{non_empty, BucketParams};
use crate::api::state::AppState;
use crate::store::DEFAULT_ZONE;

/// GET /api/historicos
///
/// Recomputed per request from the log; "today" is evaluated in the
/// configured local zone at call time.
pub async fn table(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BucketParams>,
) -> Json<BucketTable> {
    let zona = non_empty(params.zona).unwrap_or_else(|| DEFAULT_ZONE.to_string());
    let today = state.normalizer.today();

    Json(
        state
            .aggregator
            .table(state.store.as_ref(), &state.normalizer, &zona, today),
    )
}
