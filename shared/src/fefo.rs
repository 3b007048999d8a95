//! FEFO (First-Expire-First-Out) exit allocation
//!
//! Planning is a pure function over a snapshot of lots, so the same
//! algorithm runs against the in-memory ledger, inside a database
//! transaction, and in the browser to preview a suggestion.

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::LotLedger;
use crate::models::{Allocation, Lot};
use crate::types::Quantity;
use crate::validation::{checked_amount_sum, checked_quantity_sum, validate_quantity};

/// Active lots of a medication in FEFO order
pub fn fefo_order(medication_code: &str, lots: &[Lot]) -> Vec<Lot> {
    let mut active: Vec<Lot> = lots
        .iter()
        .filter(|lot| lot.is_active() && lot.medication_code == medication_code)
        .cloned()
        .collect();
    active.sort_by(Lot::fefo_cmp);
    active
}

/// Work out which lots an exit would consume without touching any of them.
///
/// Fails with `NoActiveLot` when the medication has no stock at all and with
/// `InsufficientStock` when the active lots run out before the request is met.
/// A plan whose stock or cost totals cannot be represented is rejected here,
/// before anything is committed.
pub fn plan_exit(
    medication_code: &str,
    lots: &[Lot],
    requested: Quantity,
) -> LedgerResult<Vec<Allocation>> {
    validate_quantity(requested).map_err(|m| LedgerError::validation("quantity", m))?;

    let ordered = fefo_order(medication_code, lots);
    if ordered.is_empty() {
        return Err(LedgerError::NoActiveLot {
            medication_code: medication_code.to_string(),
        });
    }

    let mut still_needed = requested;
    let mut allocations = Vec::new();

    for lot in &ordered {
        if still_needed == 0 {
            break;
        }
        let take = lot.remaining.min(still_needed);
        allocations.push(Allocation {
            lot_id: lot.id,
            lot_number: lot.lot_number.clone(),
            expiry: lot.expiry,
            unit_cost: lot.unit_cost,
            quantity: take,
        });
        still_needed -= take;
    }

    if still_needed > 0 {
        let available = checked_quantity_sum(ordered.iter().map(|lot| lot.remaining))
            .ok_or_else(|| LedgerError::overflow("quantity"))?;
        return Err(LedgerError::InsufficientStock {
            requested,
            available,
        });
    }

    checked_amount_sum(allocations.iter().map(Allocation::cost))
        .ok_or_else(|| LedgerError::overflow("unit_cost"))?;

    Ok(allocations)
}

/// Allocates exits against a ledger and commits the consumption
pub struct FefoAllocator<'a> {
    ledger: &'a mut LotLedger,
}

impl<'a> FefoAllocator<'a> {
    pub fn new(ledger: &'a mut LotLedger) -> Self {
        Self { ledger }
    }

    /// Suggested allocation for an exit, without committing anything
    pub fn preview(&self, medication_code: &str, requested: Quantity) -> LedgerResult<Vec<Allocation>> {
        plan_exit(
            medication_code,
            &self.ledger.list_active_lots(medication_code),
            requested,
        )
    }

    /// Allocate and commit an exit. Either every allocation line is applied
    /// to the ledger or none is.
    pub fn allocate_exit(
        &mut self,
        medication_code: &str,
        requested: Quantity,
    ) -> LedgerResult<Vec<Allocation>> {
        let allocations = self.preview(medication_code, requested)?;
        self.commit(&allocations)?;
        Ok(allocations)
    }

    /// Apply a plan line by line. If any line fails, the lines already
    /// applied are restored and the ledger is left as it was.
    pub fn commit(&mut self, allocations: &[Allocation]) -> LedgerResult<()> {
        let mut applied: Vec<&Allocation> = Vec::with_capacity(allocations.len());
        for allocation in allocations {
            if let Err(err) = self
                .ledger
                .apply_consumption(allocation.lot_id, allocation.quantity)
            {
                for done in applied.iter().rev() {
                    self.ledger.revert_consumption(done.lot_id, done.quantity);
                }
                return Err(err);
            }
            applied.push(allocation);
        }
        Ok(())
    }
}
