//! Catalog service for medications and pharmacy staff

use std::sync::Arc;

use shared::{validate_medication_code, validate_staff_id, Medication, StaffMember};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::InventoryStore;

/// Catalog service for reference data used by movements
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn InventoryStore>,
}

impl CatalogService {
    /// Create a new CatalogService instance
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Register a medication in the formulary
    pub async fn create_medication(&self, input: Medication) -> AppResult<Medication> {
        input.validate()?;
        validate_medication_code(&input.code).map_err(|message| AppError::Validation {
            field: "code".to_string(),
            message: message.to_string(),
            message_es: "Clave de medicamento inválida".to_string(),
        })?;

        let medication = self.store.create_medication(input).await?;
        tracing::info!(code = %medication.code, "Medication registered");
        Ok(medication)
    }

    /// List the formulary ordered by code
    pub async fn list_medications(&self) -> AppResult<Vec<Medication>> {
        self.store.list_medications().await
    }

    /// Get a medication by code
    pub async fn get_medication(&self, code: &str) -> AppResult<Medication> {
        self.store
            .get_medication(code)
            .await?
            .ok_or_else(|| AppError::NotFound("Medication".to_string()))
    }

    /// Register a staff member
    pub async fn create_staff(&self, input: StaffMember) -> AppResult<StaffMember> {
        input.validate()?;
        validate_staff_id(&input.id).map_err(|message| AppError::Validation {
            field: "id".to_string(),
            message: message.to_string(),
            message_es: "Identificador de personal inválido".to_string(),
        })?;

        let staff = self.store.create_staff(input).await?;
        tracing::info!(id = %staff.id, "Staff member registered");
        Ok(staff)
    }

    /// List staff ordered by id
    pub async fn list_staff(&self) -> AppResult<Vec<StaffMember>> {
        self.store.list_staff().await
    }
}
