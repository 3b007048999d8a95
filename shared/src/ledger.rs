//! Lot ledger: the single owner of per-lot remaining stock
//!
//! Remaining quantities change only through [`LotLedger::record_entry`] and
//! [`LotLedger::apply_consumption`]. Totals shown anywhere else are sums over
//! the ledger's lots and are never stored separately.

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Lot, NewLot};
use crate::types::{LotId, Quantity};
use crate::validation::checked_quantity_sum;

/// In-memory lot ledger
#[derive(Debug, Clone, Default)]
pub struct LotLedger {
    lots: HashMap<LotId, Lot>,
    /// Lot ids per medication code, in entry order
    by_medication: BTreeMap<String, Vec<LotId>>,
}

impl LotLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new lot from an entry. The lot starts with its full quantity.
    ///
    /// The medication's total stock must stay representable after the entry;
    /// otherwise nothing is recorded.
    pub fn record_entry(&mut self, entry: NewLot) -> LedgerResult<LotId> {
        entry.validate()?;

        if self
            .find_lot(&entry.medication_code, &entry.lot_number)
            .is_some()
        {
            return Err(LedgerError::DuplicateLot {
                medication_code: entry.medication_code,
                lot_number: entry.lot_number,
            });
        }

        self.available(&entry.medication_code)?
            .checked_add(entry.quantity)
            .ok_or_else(|| LedgerError::overflow("quantity"))?;

        let id = Uuid::new_v4();
        self.by_medication
            .entry(entry.medication_code.clone())
            .or_default()
            .push(id);
        self.lots.insert(id, entry.into_lot(id));

        Ok(id)
    }

    /// Lots of a medication with remaining stock. Callers must not rely on
    /// the order; FEFO ordering is the allocator's job.
    pub fn list_active_lots(&self, medication_code: &str) -> Vec<Lot> {
        self.lots_iter(medication_code)
            .filter(|lot| lot.is_active())
            .cloned()
            .collect()
    }

    /// Every lot of a medication, exhausted ones included
    pub fn lots_for(&self, medication_code: &str) -> Vec<Lot> {
        self.lots_iter(medication_code).cloned().collect()
    }

    /// Take `quantity` units out of a lot.
    ///
    /// This is a safety net behind the allocator, which never asks for more
    /// than it has already checked.
    pub fn apply_consumption(&mut self, lot_id: LotId, quantity: Quantity) -> LedgerResult<()> {
        if quantity <= 0 {
            return Err(LedgerError::validation(
                "quantity",
                "Consumed quantity must be positive",
            ));
        }

        let lot = self
            .lots
            .get_mut(&lot_id)
            .ok_or(LedgerError::LotNotFound(lot_id))?;

        if quantity > lot.remaining {
            return Err(LedgerError::InsufficientStock {
                requested: quantity,
                available: lot.remaining,
            });
        }

        lot.remaining -= quantity;
        Ok(())
    }

    /// Undo a consumption applied in the same, still uncommitted, exit
    pub(crate) fn revert_consumption(&mut self, lot_id: LotId, quantity: Quantity) {
        if let Some(lot) = self.lots.get_mut(&lot_id) {
            lot.remaining = lot.remaining.saturating_add(quantity).min(lot.initial_quantity);
        }
    }

    pub fn lot(&self, lot_id: LotId) -> Option<&Lot> {
        self.lots.get(&lot_id)
    }

    pub fn find_lot(&self, medication_code: &str, lot_number: &str) -> Option<&Lot> {
        self.lots_iter(medication_code)
            .find(|lot| lot.lot_number == lot_number)
    }

    /// Total stock of a medication: the sum of remaining over its lots
    pub fn available(&self, medication_code: &str) -> LedgerResult<Quantity> {
        checked_quantity_sum(self.lots_iter(medication_code).map(|lot| lot.remaining))
            .ok_or_else(|| LedgerError::overflow("quantity"))
    }

    pub fn medication_codes(&self) -> impl Iterator<Item = &str> {
        self.by_medication.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    fn lots_iter<'a>(&'a self, medication_code: &str) -> impl Iterator<Item = &'a Lot> + 'a {
        self.by_medication
            .get(medication_code)
            .into_iter()
            .flatten()
            .filter_map(|id| self.lots.get(id))
    }
}
