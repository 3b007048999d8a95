//! Reporting service: flat exports of the movement history

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{LedgerError, Movement, MovementKind, Quantity};

use crate::error::{AppError, AppResult};

/// Reporting service for spreadsheet exports
pub struct ReportingService;

/// One history line as it appears in the export
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRow {
    pub recorded_at: DateTime<Utc>,
    pub movement_type: &'static str,
    pub medication_code: String,
    pub responsible: String,
    pub quantity: Quantity,
    /// "L2:50;L1:20" for exits, the lot number for entries
    pub lots: String,
    pub reason: String,
    pub total_cost: Decimal,
    pub patient: String,
    pub prescription_folio: String,
}

impl TryFrom<&Movement> for HistoryRow {
    type Error = LedgerError;

    fn try_from(movement: &Movement) -> Result<Self, Self::Error> {
        let (lots, reason, patient) = match &movement.kind {
            MovementKind::Entry { lot_number, .. } => (lot_number.clone(), String::new(), None),
            MovementKind::Exit {
                reason,
                patient,
                allocations,
                ..
            } => (
                allocations
                    .iter()
                    .map(|a| format!("{}:{}", a.lot_number, a.quantity))
                    .collect::<Vec<_>>()
                    .join(";"),
                reason.label_es().to_string(),
                patient.as_ref(),
            ),
        };

        Ok(HistoryRow {
            recorded_at: movement.recorded_at,
            movement_type: movement.kind_filter().as_str(),
            medication_code: movement.medication_code.clone(),
            responsible: movement.responsible.clone(),
            quantity: movement.quantity(),
            lots,
            reason,
            total_cost: movement.total_cost()?,
            patient: patient.map(|p| p.name.clone()).unwrap_or_default(),
            prescription_folio: patient
                .map(|p| p.prescription_folio.clone())
                .unwrap_or_default(),
        })
    }
}

impl ReportingService {
    /// Export movements as CSV, one row per movement
    pub fn history_csv(movements: &[Movement]) -> AppResult<String> {
        let rows = movements
            .iter()
            .map(HistoryRow::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::export_to_csv(&rows)
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
