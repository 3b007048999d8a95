//! Errors raised by the lot ledger and the FEFO allocator

use thiserror::Error;
use uuid::Uuid;

use crate::types::Quantity;

/// Error kinds of the stock core.
///
/// Every variant is returned to the immediate caller; the core never retries
/// and never leaves a partially applied mutation behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Lot {lot_number} already exists for medication {medication_code}")]
    DuplicateLot {
        medication_code: String,
        lot_number: String,
    },

    #[error("No active lots for medication {medication_code}")]
    NoActiveLot { medication_code: String },

    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock {
        requested: Quantity,
        available: Quantity,
    },

    #[error("Lot {0} not found")]
    LotNotFound(Uuid),
}

impl LedgerError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        LedgerError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// An amount derived from `field` left the representable range
    pub fn overflow(field: &str) -> Self {
        Self::validation(field, "Amount exceeds the supported range")
    }
}

impl From<validator::ValidationErrors> for LedgerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        use validator::ValidationErrorsKind;

        // Report the first field alphabetically so the response is stable.
        // Errors inside a nested struct are reported on the outer field.
        let mut fields: Vec<_> = errors.errors().iter().collect();
        fields.sort_by_key(|(field, _)| **field);

        match fields.first() {
            Some((field, ValidationErrorsKind::Field(errs))) => {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("{} is invalid", field));
                LedgerError::validation(field, message)
            }
            Some((field, ValidationErrorsKind::Struct(nested))) => {
                match LedgerError::from((**nested).clone()) {
                    LedgerError::Validation { message, .. } => LedgerError::validation(field, message),
                    other => other,
                }
            }
            Some((field, ValidationErrorsKind::List(_))) => {
                LedgerError::validation(field, format!("{} is invalid", field))
            }
            None => LedgerError::validation("request", errors.to_string()),
        }
    }
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
