//! Medication and staff catalog HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{Medication, StaffMember};

use crate::error::AppResult;
use crate::services::CatalogService;
use crate::AppState;

/// List the formulary
pub async fn list_medications(State(state): State<AppState>) -> AppResult<Json<Vec<Medication>>> {
    let service = CatalogService::new(state.store);
    Ok(Json(service.list_medications().await?))
}

/// Get a medication by code
pub async fn get_medication(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<Medication>> {
    let service = CatalogService::new(state.store);
    Ok(Json(service.get_medication(&code).await?))
}

/// Register a medication
pub async fn create_medication(
    State(state): State<AppState>,
    Json(input): Json<Medication>,
) -> AppResult<(StatusCode, Json<Medication>)> {
    let service = CatalogService::new(state.store);
    let medication = service.create_medication(input).await?;
    Ok((StatusCode::CREATED, Json(medication)))
}

/// List staff
pub async fn list_staff(State(state): State<AppState>) -> AppResult<Json<Vec<StaffMember>>> {
    let service = CatalogService::new(state.store);
    Ok(Json(service.list_staff().await?))
}

/// Register a staff member
pub async fn create_staff(
    State(state): State<AppState>,
    Json(input): Json<StaffMember>,
) -> AppResult<(StatusCode, Json<StaffMember>)> {
    let service = CatalogService::new(state.store);
    let staff = service.create_staff(input).await?;
    Ok((StatusCode::CREATED, Json(staff)))
}
