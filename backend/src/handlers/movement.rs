//! Stock movement HTTP handlers

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use shared::{EntryRequest, ExitRequest, MovementKindFilter, MovementQuery};

use crate::error::AppResult;
use crate::services::movement::{EntryReceipt, ExitReceipt};
use crate::services::{MovementService, ReportingService};
use crate::AppState;

/// Query parameters for the movement history
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub medication_code: Option<String>,
    pub kind: Option<MovementKindFilter>,
    pub format: Option<String>, // "json" or "csv"
}

/// Record stock received into the pharmacy
pub async fn record_entry(
    State(state): State<AppState>,
    Json(input): Json<EntryRequest>,
) -> AppResult<(StatusCode, Json<EntryReceipt>)> {
    let service = MovementService::new(state.store);
    let receipt = service.record_entry(input).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Record stock leaving the pharmacy
pub async fn record_exit(
    State(state): State<AppState>,
    Json(input): Json<ExitRequest>,
) -> AppResult<(StatusCode, Json<ExitReceipt>)> {
    let service = MovementService::new(state.store);
    let receipt = service.record_exit(input).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Movement history, newest first, as JSON or CSV
pub async fn movement_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Response> {
    let service = MovementService::new(state.store);
    let query = MovementQuery {
        medication_code: params.medication_code.filter(|code| !code.is_empty()),
        kind: params.kind,
    };
    let movements = service.history(&query).await?;

    if params.format.as_deref() == Some("csv") {
        let csv = ReportingService::history_csv(&movements)?;
        return Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"movement_history.csv\"",
                ),
            ],
            csv,
        )
            .into_response());
    }

    Ok(Json(movements).into_response())
}
