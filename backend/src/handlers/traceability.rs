//! HTTP handlers for lot traceability

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    services::traceability::{LotTrace, TraceabilityService},
    AppState,
};

/// Full history of one lot: its entry and every exit that drew from it
pub async fn get_lot_trace(
    State(state): State<AppState>,
    Path((medication_code, lot_number)): Path<(String, String)>,
) -> AppResult<Json<LotTrace>> {
    let service = TraceabilityService::new(state.store);
    let trace = service.trace_lot(&medication_code, &lot_number).await?;
    Ok(Json(trace))
}
