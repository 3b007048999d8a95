//! Movement ledger models: entries, exits and their FEFO allocations

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::NewLot;
use crate::error::{LedgerError, LedgerResult};
use crate::types::{LotId, MovementId, MovementKindFilter, Quantity};
use crate::validation::{checked_amount_sum, checked_line_cost};

/// An immutable ledger event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Movement {
    pub id: MovementId,
    pub medication_code: String,
    /// Staff id of the person who signed off the movement
    pub responsible: String,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: MovementKind,
}

/// Payload of a movement. Entries and exits carry different data, so each
/// variant holds only what applies to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MovementKind {
    Entry {
        lot_id: LotId,
        lot_number: String,
        expiry: NaiveDate,
        quantity: Quantity,
        unit_cost: Decimal,
        procurement: Procurement,
    },
    Exit {
        requested_quantity: Quantity,
        reason: ExitReason,
        /// Present only for patient administration exits
        patient: Option<PatientRecord>,
        allocations: Vec<Allocation>,
    },
}

/// Quantity taken from one lot by an exit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Allocation {
    pub lot_id: LotId,
    pub lot_number: String,
    pub expiry: NaiveDate,
    pub unit_cost: Decimal,
    pub quantity: Quantity,
}

impl Allocation {
    pub fn cost(&self) -> Option<Decimal> {
        checked_line_cost(self.quantity, self.unit_cost)
    }
}

/// Why stock left the pharmacy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    #[serde(alias = "Administración a Paciente")]
    PatientAdministration,
    #[serde(alias = "Merma")]
    Waste,
    #[serde(alias = "Devolución")]
    Return,
    #[serde(alias = "Inventario")]
    InventoryAdjustment,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::PatientAdministration => "patient_administration",
            ExitReason::Waste => "waste",
            ExitReason::Return => "return",
            ExitReason::InventoryAdjustment => "inventory_adjustment",
        }
    }

    /// Label used on the pharmacy's paper forms
    pub fn label_es(&self) -> &'static str {
        match self {
            ExitReason::PatientAdministration => "Administración a Paciente",
            ExitReason::Waste => "Merma",
            ExitReason::Return => "Devolución",
            ExitReason::InventoryAdjustment => "Inventario",
        }
    }

    pub fn records_patient(&self) -> bool {
        matches!(self, ExitReason::PatientAdministration)
    }
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitReason::PatientAdministration => write!(f, "Patient Administration"),
            ExitReason::Waste => write!(f, "Waste"),
            ExitReason::Return => write!(f, "Return"),
            ExitReason::InventoryAdjustment => write!(f, "Inventory Adjustment"),
        }
    }
}

/// Purchasing paperwork attached to an entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct Procurement {
    #[serde(alias = "laboratorio")]
    #[validate(length(min = 1, message = "Laboratory is required"))]
    pub laboratory: String,
    #[serde(alias = "proveedor")]
    #[validate(length(min = 1, message = "Supplier is required"))]
    pub supplier: String,
    #[serde(alias = "pedido")]
    #[validate(length(min = 1, message = "Purchase order is required"))]
    pub purchase_order: String,
    #[serde(alias = "factura")]
    #[validate(length(min = 1, message = "Invoice is required"))]
    pub invoice: String,
}

impl Procurement {
    /// Copy with surrounding whitespace removed from every field
    pub fn trimmed(&self) -> Self {
        Self {
            laboratory: self.laboratory.trim().to_string(),
            supplier: self.supplier.trim().to_string(),
            purchase_order: self.purchase_order.trim().to_string(),
            invoice: self.invoice.trim().to_string(),
        }
    }
}

/// Patient and prescription data recorded when a dose is administered
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct PatientRecord {
    #[serde(alias = "nombre")]
    #[validate(length(min = 1, message = "Patient name is required"))]
    pub name: String,
    #[serde(alias = "edad")]
    #[validate(range(max = 130, message = "Patient age is out of range"))]
    pub age: u32,
    #[serde(alias = "diagnostico")]
    #[validate(length(min = 1, message = "Diagnosis is required"))]
    pub diagnosis: String,
    #[serde(alias = "dosis")]
    #[validate(length(min = 1, message = "Dose is required"))]
    pub dose: String,
    #[serde(alias = "frecuencia")]
    #[validate(length(min = 1, message = "Frequency is required"))]
    pub frequency: String,
    #[serde(alias = "doctor")]
    #[validate(length(min = 1, message = "Prescribing physician is required"))]
    pub physician: String,
    #[serde(alias = "folioReceta")]
    #[validate(length(min = 1, message = "Prescription folio is required"))]
    pub prescription_folio: String,
}

impl PatientRecord {
    /// Copy with surrounding whitespace removed from every text field
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            age: self.age,
            diagnosis: self.diagnosis.trim().to_string(),
            dose: self.dose.trim().to_string(),
            frequency: self.frequency.trim().to_string(),
            physician: self.physician.trim().to_string(),
            prescription_folio: self.prescription_folio.trim().to_string(),
        }
    }
}

impl Movement {
    /// Create a movement stamped with a fresh id and the current time
    pub fn new(medication_code: &str, responsible: &str, kind: MovementKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            medication_code: medication_code.to_string(),
            responsible: responsible.to_string(),
            recorded_at: Utc::now(),
            kind,
        }
    }

    pub fn kind_filter(&self) -> MovementKindFilter {
        match self.kind {
            MovementKind::Entry { .. } => MovementKindFilter::Entry,
            MovementKind::Exit { .. } => MovementKindFilter::Exit,
        }
    }

    /// Units moved: the entered quantity or the requested exit quantity
    pub fn quantity(&self) -> Quantity {
        match &self.kind {
            MovementKind::Entry { quantity, .. } => *quantity,
            MovementKind::Exit {
                requested_quantity, ..
            } => *requested_quantity,
        }
    }

    /// Purchase value of the units moved
    pub fn total_cost(&self) -> LedgerResult<Decimal> {
        let total = match &self.kind {
            MovementKind::Entry {
                quantity,
                unit_cost,
                ..
            } => checked_line_cost(*quantity, *unit_cost),
            MovementKind::Exit { allocations, .. } => {
                checked_amount_sum(allocations.iter().map(Allocation::cost))
            }
        };
        total.ok_or_else(|| LedgerError::overflow("unit_cost"))
    }

    /// Allocation lines of an exit (empty for entries)
    pub fn allocations(&self) -> &[Allocation] {
        match &self.kind {
            MovementKind::Entry { .. } => &[],
            MovementKind::Exit { allocations, .. } => allocations,
        }
    }

    /// Whether this is the entry that created the given lot
    pub fn created_lot(&self, lot_id: LotId) -> bool {
        matches!(&self.kind, MovementKind::Entry { lot_id: id, .. } if *id == lot_id)
    }
}

/// Entry request as submitted from the receiving form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EntryRequest {
    #[validate(length(min = 1, message = "Medication code is required"))]
    pub medication_code: String,
    #[validate(length(min = 1, message = "Lot number is required"))]
    pub lot_number: String,
    pub expiry: NaiveDate,
    #[validate(range(
        min = 1,
        max = 1_000_000_000,
        message = "Quantity must be between 1 and 1000000000"
    ))]
    pub quantity: i64,
    pub unit_cost: Decimal,
    #[validate(length(min = 1, message = "Responsible staff member is required"))]
    pub responsible: String,
    #[validate]
    pub procurement: Procurement,
}

impl EntryRequest {
    pub fn new_lot(&self) -> NewLot {
        NewLot {
            medication_code: self.medication_code.clone(),
            lot_number: self.lot_number.clone(),
            expiry: self.expiry,
            quantity: self.quantity,
            unit_cost: self.unit_cost,
        }
    }
}

/// Exit request as submitted from the dispensing form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExitRequest {
    #[validate(length(min = 1, message = "Medication code is required"))]
    pub medication_code: String,
    #[validate(range(
        min = 1,
        max = 1_000_000_000,
        message = "Quantity must be between 1 and 1000000000"
    ))]
    pub quantity: i64,
    #[validate(length(min = 1, message = "Responsible staff member is required"))]
    pub responsible: String,
    pub reason: ExitReason,
    /// Required for patient administration, ignored for every other reason
    pub patient: Option<PatientRecord>,
}

impl ExitRequest {
    /// Patient record to keep with the exit.
    ///
    /// Patient administration exits must carry a complete record; any
    /// problem with it is reported on the `patient` field. Other reasons
    /// never keep patient data.
    pub fn patient_record(&self) -> LedgerResult<Option<PatientRecord>> {
        if !self.reason.records_patient() {
            return Ok(None);
        }
        let record = self
            .patient
            .as_ref()
            .map(PatientRecord::trimmed)
            .ok_or_else(|| {
                LedgerError::validation(
                    "patient",
                    "Patient data is required for patient administration",
                )
            })?;
        record.validate().map_err(|errors| match LedgerError::from(errors) {
            LedgerError::Validation { message, .. } => LedgerError::validation("patient", message),
            other => other,
        })?;
        Ok(Some(record))
    }
}
