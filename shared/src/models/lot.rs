//! Lot models

use std::cmp::Ordering;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::types::{LotId, Quantity};
use crate::validation::{
    checked_line_cost, validate_lot_number, validate_medication_code, validate_quantity,
    validate_unit_cost,
};

/// A batch of one medication with its own expiry and stock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Lot {
    pub id: LotId,
    pub medication_code: String,
    /// Lot number printed by the manufacturer
    pub lot_number: String,
    pub expiry: NaiveDate,
    pub initial_quantity: Quantity,
    pub remaining: Quantity,
    pub unit_cost: Decimal,
}

/// Lifecycle of a lot. There is no way back from `Exhausted`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LotState {
    Active,
    Exhausted,
}

impl Lot {
    pub fn state(&self) -> LotState {
        if self.remaining > 0 {
            LotState::Active
        } else {
            LotState::Exhausted
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == LotState::Active
    }

    /// Quantity already dispensed from this lot
    pub fn consumed(&self) -> Quantity {
        self.initial_quantity - self.remaining
    }

    /// Value of the remaining stock at purchase cost
    pub fn stock_value(&self) -> LedgerResult<Decimal> {
        checked_line_cost(self.remaining, self.unit_cost)
            .ok_or_else(|| LedgerError::overflow("unit_cost"))
    }

    /// Days until expiry; negative once the lot has expired
    pub fn days_to_expiry(&self, today: NaiveDate) -> i64 {
        (self.expiry - today).num_days()
    }

    /// FEFO order: earliest expiry first, lot number breaks ties
    pub fn fefo_cmp(&self, other: &Lot) -> Ordering {
        self.expiry
            .cmp(&other.expiry)
            .then_with(|| self.lot_number.cmp(&other.lot_number))
    }
}

/// Data needed to open a new lot from an entry movement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewLot {
    pub medication_code: String,
    pub lot_number: String,
    pub expiry: NaiveDate,
    pub quantity: Quantity,
    pub unit_cost: Decimal,
}

impl NewLot {
    pub fn validate(&self) -> LedgerResult<()> {
        validate_medication_code(&self.medication_code)
            .map_err(|m| LedgerError::validation("medication_code", m))?;
        validate_lot_number(&self.lot_number)
            .map_err(|m| LedgerError::validation("lot_number", m))?;
        validate_quantity(self.quantity).map_err(|m| LedgerError::validation("quantity", m))?;
        validate_unit_cost(self.unit_cost).map_err(|m| LedgerError::validation("unit_cost", m))?;
        self.total_cost()?;
        Ok(())
    }

    /// Purchase total of the entry
    pub fn total_cost(&self) -> LedgerResult<Decimal> {
        checked_line_cost(self.quantity, self.unit_cost)
            .ok_or_else(|| LedgerError::overflow("unit_cost"))
    }

    /// Materialize the lot with its full quantity remaining
    pub fn into_lot(self, id: LotId) -> Lot {
        Lot {
            id,
            medication_code: self.medication_code,
            lot_number: self.lot_number,
            expiry: self.expiry,
            initial_quantity: self.quantity,
            remaining: self.quantity,
            unit_cost: self.unit_cost,
        }
    }
}
