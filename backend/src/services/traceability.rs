//! Lot traceability service
//!
//! Rebuilds the history of a single lot from the movement ledger: the entry
//! that opened it and every exit allocation that drew from it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{
    checked_quantity_sum, ExitReason, LedgerError, LedgerResult, Lot, LotState, Movement,
    MovementKind, MovementQuery, PatientRecord, Quantity,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::InventoryStore;

/// Traceability service for lot history
#[derive(Clone)]
pub struct TraceabilityService {
    store: Arc<dyn InventoryStore>,
}

/// Complete traceability view for a lot
#[derive(Debug, Clone, Serialize)]
pub struct LotTrace {
    pub lot: Lot,
    pub state: LotState,
    pub entry: Option<Movement>,
    /// Exits that drew from this lot, oldest first
    pub consumptions: Vec<LotConsumption>,
    pub consumed_total: Quantity,
}

/// One exit allocation line against a lot
#[derive(Debug, Clone, Serialize)]
pub struct LotConsumption {
    pub movement_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub responsible: String,
    pub reason: ExitReason,
    pub patient: Option<PatientRecord>,
    pub quantity: Quantity,
}

impl TraceabilityService {
    /// Create a new TraceabilityService instance
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Trace a lot by medication code and printed lot number
    pub async fn trace_lot(&self, medication_code: &str, lot_number: &str) -> AppResult<LotTrace> {
        let lot = self
            .store
            .list_lots(medication_code)
            .await?
            .into_iter()
            .find(|lot| lot.lot_number == lot_number)
            .ok_or_else(|| AppError::NotFound("Lot".to_string()))?;

        let movements = self
            .store
            .list_movements(&MovementQuery {
                medication_code: Some(medication_code.to_string()),
                kind: None,
            })
            .await?;

        let entry = movements.iter().find(|m| m.created_lot(lot.id)).cloned();

        // History comes newest first; traceability reads oldest first
        let mut consumptions = Vec::new();
        for movement in movements.iter().rev() {
            if let Some(consumption) = consumption_of(movement, &lot)? {
                consumptions.push(consumption);
            }
        }

        let consumed_total = checked_quantity_sum(consumptions.iter().map(|c| c.quantity))
            .ok_or_else(|| LedgerError::overflow("quantity"))?;
        if consumed_total != lot.consumed() {
            tracing::error!(
                medication = %medication_code,
                lot = %lot_number,
                consumed_total,
                ledger_consumed = lot.consumed(),
                "Movement ledger disagrees with lot stock"
            );
        }

        Ok(LotTrace {
            state: lot.state(),
            lot,
            entry,
            consumptions,
            consumed_total,
        })
    }
}

fn consumption_of(movement: &Movement, lot: &Lot) -> LedgerResult<Option<LotConsumption>> {
    let MovementKind::Exit {
        reason,
        patient,
        allocations,
        ..
    } = &movement.kind
    else {
        return Ok(None);
    };

    let quantity = checked_quantity_sum(
        allocations
            .iter()
            .filter(|a| a.lot_id == lot.id)
            .map(|a| a.quantity),
    )
    .ok_or_else(|| LedgerError::overflow("quantity"))?;
    if quantity == 0 {
        return Ok(None);
    }

    Ok(Some(LotConsumption {
        movement_id: movement.id,
        recorded_at: movement.recorded_at,
        responsible: movement.responsible.clone(),
        reason: *reason,
        patient: patient.clone(),
        quantity,
    }))
}
