//! Inventory HTTP handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use shared::{Lot, MedicationStock};

use crate::error::{AppError, AppResult};
use crate::services::InventoryService;
use crate::AppState;

/// Query parameters for the FEFO lot listing
#[derive(Debug, Deserialize)]
pub struct FefoParams {
    pub medication_code: Option<String>,
}

/// Stock summary for every medication
pub async fn get_inventory_summary(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<MedicationStock>>> {
    let service = InventoryService::new(state.store, state.config.expiry);
    let today = Utc::now().date_naive();
    Ok(Json(service.summary(today).await?))
}

/// Stock position of one medication
pub async fn get_medication_stock(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<MedicationStock>> {
    let service = InventoryService::new(state.store, state.config.expiry);
    let today = Utc::now().date_naive();
    Ok(Json(service.medication_stock(&code, today).await?))
}

/// Active lots in the order the next exit would consume them
pub async fn get_fefo_lots(
    State(state): State<AppState>,
    Query(params): Query<FefoParams>,
) -> AppResult<Json<Vec<Lot>>> {
    let code = params
        .medication_code
        .filter(|code| !code.trim().is_empty())
        .ok_or_else(|| AppError::Validation {
            field: "medication_code".to_string(),
            message: "Medication code is required".to_string(),
            message_es: "La clave del medicamento es obligatoria".to_string(),
        })?;

    let service = InventoryService::new(state.store, state.config.expiry);
    Ok(Json(service.fefo_lots(&code).await?))
}
