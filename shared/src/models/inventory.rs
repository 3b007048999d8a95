//! Inventory summary models and expiry classification

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Lot, Medication};
use crate::error::{LedgerError, LedgerResult};
use crate::types::Quantity;
use crate::validation::{checked_amount_sum, checked_quantity_sum};

/// Traffic-light status of the nearest expiry of a medication
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    Ok,
    Warning,
    Critical,
}

impl ExpiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpiryStatus::Ok => "ok",
            ExpiryStatus::Warning => "warning",
            ExpiryStatus::Critical => "critical",
        }
    }
}

/// Day thresholds used to classify expiry risk
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpiryThresholds {
    /// At or below this many days the stock is critical (expired included)
    pub critical_days: i64,
    pub warning_days: i64,
}

impl Default for ExpiryThresholds {
    fn default() -> Self {
        Self {
            critical_days: 30,
            warning_days: 90,
        }
    }
}

impl ExpiryThresholds {
    pub fn classify(&self, days_to_expiry: i64) -> ExpiryStatus {
        if days_to_expiry <= self.critical_days {
            ExpiryStatus::Critical
        } else if days_to_expiry <= self.warning_days {
            ExpiryStatus::Warning
        } else {
            ExpiryStatus::Ok
        }
    }
}

/// Stock position of one medication, derived from its active lots
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MedicationStock {
    pub medication: Medication,
    /// Sum of remaining quantities over active lots
    pub total_available: Quantity,
    pub active_lots: usize,
    pub nearest_expiry: Option<NaiveDate>,
    pub days_to_expiry: Option<i64>,
    /// `None` when there is no stock to classify
    pub expiry_status: Option<ExpiryStatus>,
    pub stock_value: Decimal,
}

impl MedicationStock {
    /// Summarize a medication from its lots. Exhausted lots are ignored, so
    /// the total is always the sum over active lots.
    pub fn from_lots(
        medication: Medication,
        lots: &[Lot],
        today: NaiveDate,
        thresholds: &ExpiryThresholds,
    ) -> LedgerResult<Self> {
        let active: Vec<&Lot> = lots
            .iter()
            .filter(|lot| lot.is_active() && lot.medication_code == medication.code)
            .collect();

        let total_available = checked_quantity_sum(active.iter().map(|lot| lot.remaining))
            .ok_or_else(|| LedgerError::overflow("quantity"))?;
        let stock_value = checked_amount_sum(active.iter().map(|lot| lot.stock_value().ok()))
            .ok_or_else(|| LedgerError::overflow("unit_cost"))?;
        let nearest_expiry = active.iter().map(|lot| lot.expiry).min();
        let days_to_expiry = nearest_expiry.map(|expiry| (expiry - today).num_days());

        Ok(Self {
            medication,
            total_available,
            active_lots: active.len(),
            nearest_expiry,
            days_to_expiry,
            expiry_status: days_to_expiry.map(|days| thresholds.classify(days)),
            stock_value,
        })
    }
}
