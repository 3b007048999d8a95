//! In-memory store, used in development and tests

use std::collections::BTreeMap;

use async_trait::async_trait;
use shared::{
    Allocation, FefoAllocator, Lot, LotLedger, Medication, Movement, MovementKind, MovementQuery,
    StaffMember,
};
use tokio::sync::{Mutex, RwLock};

use super::{EntryCommand, ExitCommand, InventoryStore};
use crate::error::{AppError, AppResult};

#[derive(Default)]
struct Catalog {
    medications: BTreeMap<String, Medication>,
    staff: BTreeMap<String, StaffMember>,
}

/// Lots and movements change together, so they share one lock
#[derive(Default)]
struct Ledger {
    lots: LotLedger,
    movements: Vec<Movement>,
}

/// Store keeping everything in process memory.
///
/// The ledger mutex is held across the whole plan-and-commit step of an
/// exit and there is no await point inside it, so two exits can never read
/// the same pre-consumption state.
#[derive(Default)]
pub struct MemoryStore {
    catalog: RwLock<Catalog>,
    ledger: Mutex<Ledger>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn create_medication(&self, medication: Medication) -> AppResult<Medication> {
        let mut catalog = self.catalog.write().await;
        if catalog.medications.contains_key(&medication.code) {
            return Err(AppError::DuplicateEntry("medication code".to_string()));
        }
        catalog
            .medications
            .insert(medication.code.clone(), medication.clone());
        Ok(medication)
    }

    async fn list_medications(&self) -> AppResult<Vec<Medication>> {
        Ok(self.catalog.read().await.medications.values().cloned().collect())
    }

    async fn get_medication(&self, code: &str) -> AppResult<Option<Medication>> {
        Ok(self.catalog.read().await.medications.get(code).cloned())
    }

    async fn create_staff(&self, staff: StaffMember) -> AppResult<StaffMember> {
        let mut catalog = self.catalog.write().await;
        if catalog.staff.contains_key(&staff.id) {
            return Err(AppError::DuplicateEntry("staff id".to_string()));
        }
        catalog.staff.insert(staff.id.clone(), staff.clone());
        Ok(staff)
    }

    async fn list_staff(&self) -> AppResult<Vec<StaffMember>> {
        Ok(self.catalog.read().await.staff.values().cloned().collect())
    }

    async fn get_staff(&self, id: &str) -> AppResult<Option<StaffMember>> {
        Ok(self.catalog.read().await.staff.get(id).cloned())
    }

    async fn record_entry(&self, entry: EntryCommand) -> AppResult<(Movement, Lot)> {
        let mut ledger = self.ledger.lock().await;

        let lot_id = ledger.lots.record_entry(entry.lot)?;
        let lot = ledger
            .lots
            .lot(lot_id)
            .cloned()
            .ok_or_else(|| AppError::Internal("Recorded lot is missing".to_string()))?;

        let movement = Movement::new(
            &lot.medication_code,
            &entry.responsible,
            MovementKind::Entry {
                lot_id,
                lot_number: lot.lot_number.clone(),
                expiry: lot.expiry,
                quantity: lot.initial_quantity,
                unit_cost: lot.unit_cost,
                procurement: entry.procurement,
            },
        );
        ledger.movements.push(movement.clone());

        Ok((movement, lot))
    }

    async fn record_exit(&self, exit: ExitCommand) -> AppResult<(Movement, Vec<Allocation>)> {
        let mut ledger = self.ledger.lock().await;

        let allocations =
            FefoAllocator::new(&mut ledger.lots).allocate_exit(&exit.medication_code, exit.quantity)?;

        let movement = Movement::new(
            &exit.medication_code,
            &exit.responsible,
            MovementKind::Exit {
                requested_quantity: exit.quantity,
                reason: exit.reason,
                patient: exit.patient,
                allocations: allocations.clone(),
            },
        );
        ledger.movements.push(movement.clone());

        Ok((movement, allocations))
    }

    async fn list_active_lots(&self, medication_code: &str) -> AppResult<Vec<Lot>> {
        Ok(self.ledger.lock().await.lots.list_active_lots(medication_code))
    }

    async fn list_lots(&self, medication_code: &str) -> AppResult<Vec<Lot>> {
        Ok(self.ledger.lock().await.lots.lots_for(medication_code))
    }

    async fn list_movements(&self, query: &MovementQuery) -> AppResult<Vec<Movement>> {
        let ledger = self.ledger.lock().await;
        Ok(ledger
            .movements
            .iter()
            .rev()
            .filter(|m| {
                query
                    .medication_code
                    .as_deref()
                    .map_or(true, |code| m.medication_code == code)
            })
            .filter(|m| query.kind.map_or(true, |kind| m.kind_filter() == kind))
            .cloned()
            .collect())
    }
}
