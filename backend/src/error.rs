//! Error handling for the Hospital Pharmacy Inventory
//!
//! Provides consistent error responses in English and Spanish

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::LedgerError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_es: String,
    },

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Stock ledger errors
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Ledger(LedgerError::from(errors))
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_es: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    /// Stable machine-readable code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::DuplicateEntry(_) => "DUPLICATE_ENTRY",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Ledger(err) => match err {
                LedgerError::Validation { .. } => "VALIDATION_ERROR",
                LedgerError::DuplicateLot { .. } => "DUPLICATE_LOT",
                LedgerError::NoActiveLot { .. } => "NO_ACTIVE_LOT",
                LedgerError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
                LedgerError::LotNotFound(_) => "LOT_NOT_FOUND",
            },
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::DatabaseError(_) | AppError::MigrationError(_) => "DATABASE_ERROR",
            AppError::Internal(_) | AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::DuplicateEntry(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Ledger(err) => match err {
                LedgerError::Validation { .. } => StatusCode::BAD_REQUEST,
                LedgerError::DuplicateLot { .. } => StatusCode::CONFLICT,
                LedgerError::NoActiveLot { .. } | LedgerError::InsufficientStock { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                // Only reachable if the allocator and ledger disagree
                LedgerError::LotNotFound(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Configuration(_)
            | AppError::DatabaseError(_)
            | AppError::MigrationError(_)
            | AppError::Internal(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> ErrorDetail {
        let code = self.code().to_string();
        match self {
            AppError::Validation {
                field,
                message,
                message_es,
            } => ErrorDetail {
                code,
                message_en: message.clone(),
                message_es: message_es.clone(),
                field: Some(field.clone()),
                details: None,
            },
            AppError::DuplicateEntry(field) => ErrorDetail {
                code,
                message_en: format!("A record with this {} already exists", field),
                message_es: format!("Ya existe un registro con este {}", field),
                field: Some(field.clone()),
                details: None,
            },
            AppError::NotFound(resource) => ErrorDetail {
                code,
                message_en: format!("{} not found", resource),
                message_es: format!("No se encontró {}", resource),
                field: None,
                details: None,
            },
            AppError::Ledger(err) => ledger_detail(code, err),
            AppError::Configuration(msg) => ErrorDetail {
                code,
                message_en: format!("Configuration error: {}", msg),
                message_es: format!("Error de configuración: {}", msg),
                field: None,
                details: None,
            },
            AppError::DatabaseError(_) | AppError::MigrationError(_) => ErrorDetail {
                code,
                message_en: "A database error occurred".to_string(),
                message_es: "Ocurrió un error en la base de datos".to_string(),
                field: None,
                details: None,
            },
            AppError::Internal(msg) => ErrorDetail {
                code,
                message_en: msg.clone(),
                message_es: "Error interno del servidor".to_string(),
                field: None,
                details: None,
            },
            AppError::InternalError(_) => ErrorDetail {
                code,
                message_en: "An internal server error occurred".to_string(),
                message_es: "Error interno del servidor".to_string(),
                field: None,
                details: None,
            },
        }
    }
}

fn ledger_detail(code: String, err: &LedgerError) -> ErrorDetail {
    match err {
        LedgerError::Validation { field, message } => ErrorDetail {
            code,
            message_en: message.clone(),
            message_es: format!("Dato inválido: {}", message),
            field: Some(field.clone()),
            details: None,
        },
        LedgerError::DuplicateLot {
            medication_code,
            lot_number,
        } => ErrorDetail {
            code,
            message_en: err.to_string(),
            message_es: format!(
                "El lote {} ya existe para el medicamento {}",
                lot_number, medication_code
            ),
            field: Some("lot_number".to_string()),
            details: None,
        },
        LedgerError::NoActiveLot { medication_code } => ErrorDetail {
            code,
            message_en: err.to_string(),
            message_es: format!(
                "No hay lotes activos para el medicamento {}",
                medication_code
            ),
            field: None,
            details: None,
        },
        LedgerError::InsufficientStock {
            requested,
            available,
        } => ErrorDetail {
            code,
            message_en: err.to_string(),
            message_es: format!(
                "La cantidad ({}) excede la existencia total ({})",
                requested, available
            ),
            field: Some("quantity".to_string()),
            details: Some(serde_json::json!({
                "requested": requested,
                "available": available,
            })),
        },
        LedgerError::LotNotFound(_) => ErrorDetail {
            code,
            message_en: err.to_string(),
            message_es: "No se encontró el lote".to_string(),
            field: None,
            details: None,
        },
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (
            status,
            Json(ErrorResponse {
                error: self.detail(),
            }),
        )
            .into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
