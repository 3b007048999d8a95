//! Inventory service: stock positions and FEFO lot listings

use std::sync::Arc;

use chrono::NaiveDate;
use shared::{fefo_order, ExpiryThresholds, Lot, MedicationStock};

use crate::error::{AppError, AppResult};
use crate::store::InventoryStore;

/// Inventory service for read-only stock views
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
    thresholds: ExpiryThresholds,
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(store: Arc<dyn InventoryStore>, thresholds: ExpiryThresholds) -> Self {
        Self { store, thresholds }
    }

    /// Stock position of every medication in the formulary.
    ///
    /// Totals are always summed from active lots; nothing cached is trusted.
    pub async fn summary(&self, today: NaiveDate) -> AppResult<Vec<MedicationStock>> {
        let medications = self.store.list_medications().await?;

        let mut summary = Vec::with_capacity(medications.len());
        for medication in medications {
            let lots = self.store.list_active_lots(&medication.code).await?;
            summary.push(MedicationStock::from_lots(
                medication,
                &lots,
                today,
                &self.thresholds,
            )?);
        }

        Ok(summary)
    }

    /// Stock position of one medication
    pub async fn medication_stock(&self, code: &str, today: NaiveDate) -> AppResult<MedicationStock> {
        let medication = self
            .store
            .get_medication(code)
            .await?
            .ok_or_else(|| AppError::NotFound("Medication".to_string()))?;
        let lots = self.store.list_active_lots(code).await?;

        Ok(MedicationStock::from_lots(
            medication,
            &lots,
            today,
            &self.thresholds,
        )?)
    }

    /// Active lots in the order the next exit would consume them
    pub async fn fefo_lots(&self, code: &str) -> AppResult<Vec<Lot>> {
        if self.store.get_medication(code).await?.is_none() {
            return Err(AppError::NotFound("Medication".to_string()));
        }

        let lots = self.store.list_active_lots(code).await?;
        Ok(fefo_order(code, &lots))
    }
}
