//! Movement service: entries and FEFO exits against the stock ledger

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{Allocation, EntryRequest, ExitRequest, Lot, Movement, MovementQuery};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::{EntryCommand, ExitCommand, InventoryStore};

/// Movement service for recording stock entering and leaving the pharmacy
#[derive(Clone)]
pub struct MovementService {
    store: Arc<dyn InventoryStore>,
}

/// Result of a recorded entry
#[derive(Debug, Clone, Serialize)]
pub struct EntryReceipt {
    pub movement: Movement,
    pub lot: Lot,
    /// quantity * unit cost
    pub total_cost: Decimal,
}

/// Result of a recorded exit
#[derive(Debug, Clone, Serialize)]
pub struct ExitReceipt {
    pub movement: Movement,
    /// Lots consumed, earliest expiry first
    pub allocations: Vec<Allocation>,
    pub total_cost: Decimal,
}

impl MovementService {
    /// Create a new MovementService instance
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Record an entry, opening a new lot
    pub async fn record_entry(&self, request: EntryRequest) -> AppResult<EntryReceipt> {
        request.validate()?;
        let new_lot = request.new_lot();
        new_lot.validate()?;
        let total_cost = new_lot.total_cost()?;

        self.require_medication(&request.medication_code).await?;
        self.require_staff(&request.responsible).await?;

        let (movement, lot) = self
            .store
            .record_entry(EntryCommand {
                lot: new_lot,
                responsible: request.responsible,
                procurement: request.procurement.trimmed(),
            })
            .await?;

        tracing::info!(
            medication = %lot.medication_code,
            lot = %lot.lot_number,
            quantity = lot.initial_quantity,
            movement_id = %movement.id,
            "Entry recorded"
        );

        Ok(EntryReceipt {
            total_cost,
            movement,
            lot,
        })
    }

    /// Record an exit, allocating stock FEFO across the medication's lots
    pub async fn record_exit(&self, request: ExitRequest) -> AppResult<ExitReceipt> {
        request.validate()?;
        let patient = request.patient_record()?;

        self.require_medication(&request.medication_code).await?;
        self.require_staff(&request.responsible).await?;

        let command = ExitCommand {
            patient,
            medication_code: request.medication_code,
            quantity: request.quantity,
            responsible: request.responsible,
            reason: request.reason,
        };
        let medication_code = command.medication_code.clone();
        let requested = command.quantity;

        let (movement, allocations) = match self.store.record_exit(command).await {
            Ok(recorded) => recorded,
            Err(AppError::Ledger(err)) => {
                tracing::warn!(
                    medication = %medication_code,
                    requested,
                    error = %err,
                    "Exit rejected"
                );
                return Err(AppError::Ledger(err));
            }
            Err(err) => return Err(err),
        };

        tracing::info!(
            medication = %movement.medication_code,
            requested,
            lots = allocations.len(),
            movement_id = %movement.id,
            "Exit recorded"
        );

        // The planner already checked that this total is representable.
        let total_cost = movement.total_cost()?;

        Ok(ExitReceipt {
            total_cost,
            movement,
            allocations,
        })
    }

    /// Movement history, newest first
    pub async fn history(&self, query: &MovementQuery) -> AppResult<Vec<Movement>> {
        self.store.list_movements(query).await
    }

    async fn require_medication(&self, code: &str) -> AppResult<()> {
        match self.store.get_medication(code).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound("Medication".to_string())),
        }
    }

    async fn require_staff(&self, id: &str) -> AppResult<()> {
        match self.store.get_staff(id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::Validation {
                field: "responsible".to_string(),
                message: format!("Unknown staff member: {}", id),
                message_es: format!("Responsable no registrado: {}", id),
            }),
        }
    }
}
