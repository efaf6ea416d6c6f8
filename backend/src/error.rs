//! Error handling for the Crop Lifecycle Platform
//!
//! Provides consistent error responses in English and Spanish

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{CatalogKind, LifecycleError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Input errors
    #[error("Invalid date format for {field}: '{value}'")]
    InvalidDateFormat { field: String, value: String },

    #[error("Sowing date is required")]
    MissingSowingDate,

    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_es: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Referential integrity errors
    #[error("Duplicate name: {kind} '{name}' already exists")]
    DuplicateName { kind: String, name: String },

    #[error("{kind} {code} is referenced by {count} cultivation management records")]
    ReferencedByLedger {
        kind: String,
        code: i64,
        count: i64,
    },

    #[error("Dangling reference: {field} = {id} does not exist")]
    DanglingReference { field: String, id: i64 },

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(kind: CatalogKind) -> Self {
        AppError::NotFound(kind.label().to_string())
    }

    pub fn duplicate_name(kind: CatalogKind, name: &str) -> Self {
        AppError::DuplicateName {
            kind: kind.label().to_string(),
            name: name.to_string(),
        }
    }

    pub fn referenced_by_ledger(kind: &str, code: i64, count: i64) -> Self {
        AppError::ReferencedByLedger {
            kind: kind.to_string(),
            code,
            count,
        }
    }

    /// Map a UNIQUE constraint violation to `on_conflict`
    ///
    /// Covers a concurrent writer that commits between our existence check
    /// and our insert. Other database errors pass through unchanged.
    pub fn unique_violation_or(err: sqlx::Error, on_conflict: impl FnOnce() -> AppError) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => on_conflict(),
            _ => AppError::DatabaseError(err),
        }
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::InvalidDateFormat { field, value } => AppError::InvalidDateFormat {
                field: field.to_string(),
                value,
            },
            LifecycleError::MissingSowingDate => AppError::MissingSowingDate,
            LifecycleError::MissingField { field } => AppError::Validation {
                field: field.to_string(),
                message: format!("{} is required", field),
                message_es: format!("El campo {} es obligatorio", field),
            },
            LifecycleError::DateOutOfRange { field } => AppError::Validation {
                field: field.to_string(),
                message: format!("{} is outside the supported calendar range", field),
                message_es: format!("{} está fuera del rango de fechas admitido", field),
            },
        }
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
}

impl AppError {
    /// Stable machine-readable code of the error
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidDateFormat { .. } => "INVALID_DATE_FORMAT",
            AppError::MissingSowingDate => "MISSING_SOWING_DATE",
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::DuplicateName { .. } => "DUPLICATE_NAME",
            AppError::ReferencedByLedger { .. } => "REFERENCED_BY_LEDGER",
            AppError::DanglingReference { .. } => "DANGLING_REFERENCE",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidDateFormat { .. }
            | AppError::MissingSowingDate
            | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateName { .. } | AppError::ReferencedByLedger { .. } => {
                StatusCode::CONFLICT
            }
            AppError::DanglingReference { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DatabaseError(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> ErrorDetail {
        let (message_en, message_es, field) = match self {
            AppError::InvalidDateFormat { field, value } => (
                format!("'{}' is not a valid date (expected YYYY-MM-DD)", value),
                format!("'{}' no es una fecha válida (formato AAAA-MM-DD)", value),
                Some(field.clone()),
            ),
            AppError::MissingSowingDate => (
                "Sowing date is required".to_string(),
                "Ingrese la fecha de siembra".to_string(),
                Some("sown_on".to_string()),
            ),
            AppError::Validation { field, message, message_es } => {
                (message.clone(), message_es.clone(), Some(field.clone()))
            }
            AppError::NotFound(resource) => (
                format!("{} not found", resource),
                format!("No se encontró {}", resource),
                None,
            ),
            AppError::DuplicateName { kind, name } => (
                format!("{} '{}' already exists", kind, name),
                format!("Ya existe {} '{}'", kind, name),
                Some("name".to_string()),
            ),
            AppError::ReferencedByLedger { kind, code, count } => (
                format!(
                    "{} {} cannot be deleted: {} cultivation management records reference it",
                    kind, code, count
                ),
                format!(
                    "No se puede eliminar {} {}: {} registros de manejo de cultivo lo usan",
                    kind, code, count
                ),
                None,
            ),
            AppError::DanglingReference { field, id } => (
                format!("{} {} does not exist", field, id),
                format!("{} {} no existe", field, id),
                Some(field.clone()),
            ),
            AppError::DatabaseError(_) => (
                "A database error occurred".to_string(),
                "Ocurrió un error en la base de datos".to_string(),
                None,
            ),
            AppError::Internal(msg) => (
                msg.clone(),
                "Error interno del servidor".to_string(),
                None,
            ),
        };

        ErrorDetail {
            code: self.code().to_string(),
            message_en,
            message_es,
            field,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }

        (status, Json(ErrorResponse { error: self.detail() })).into_response()
    }
}

/// Result type alias for services and handlers
pub type AppResult<T> = Result<T, AppError>;
