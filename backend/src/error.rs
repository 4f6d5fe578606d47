//! Error handling for the Inventario Comercial backend
//!
//! Every failure is surfaced synchronously as a JSON body with a stable code
//! and a Spanish message; storage-level duplicate-key and referenced-row
//! failures are translated into conflicts instead of leaking driver codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Credenciales inválidas")]
    InvalidCredentials,

    // Validation errors
    #[error("Datos de entrada inválidos")]
    Validation { errors: Vec<FieldError> },

    #[error("Error de validación: {0}")]
    ValidationError(String),

    // Conflicts
    #[error("Registro duplicado: {0}")]
    DuplicateEntry(String),

    #[error("Conflicto: {0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    // Business logic errors
    #[error("{0}")]
    InsufficientStock(String),

    #[error("Transición de estado inválida: {0}")]
    InvalidStateTransition(String),

    // Database errors
    #[error("Error de base de datos: {0}")]
    DatabaseError(sqlx::Error),

    // Internal errors
    #[error("Error interno del servidor: {0}")]
    Internal(String),
}

/// One entry of the field-level validation error list
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut detalles: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        detalles.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::Validation { errors: detalles }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            match db_err.code().as_deref() {
                // unique_violation
                Some("23505") => return AppError::DuplicateEntry("Registro duplicado".to_string()),
                // foreign_key_violation
                Some("23503") => {
                    return AppError::Conflict(
                        "Existen registros relacionados que impiden la operación".to_string(),
                    )
                }
                _ => {}
            }
        }
        AppError::DatabaseError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "INVALID_CREDENTIALS".to_string(),
                    message: "Credenciales inválidas".to_string(),
                    details: None,
                },
            ),
            AppError::Validation { errors } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: "Datos de entrada inválidos".to_string(),
                    details: Some(errors.clone()),
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: msg.clone(),
                    details: None,
                },
            ),
            AppError::DuplicateEntry(msg) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "DUPLICATE_ENTRY".to_string(),
                    message: msg.clone(),
                    details: None,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "CONFLICT".to_string(),
                    message: msg.clone(),
                    details: None,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message: msg.clone(),
                    details: None,
                },
            ),
            AppError::InsufficientStock(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INSUFFICIENT_STOCK".to_string(),
                    message: msg.clone(),
                    details: None,
                },
            ),
            AppError::InvalidStateTransition(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INVALID_STATE_TRANSITION".to_string(),
                    message: msg.clone(),
                    details: None,
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message: "Error interno del servidor".to_string(),
                    details: None,
                },
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "Error interno del servidor".to_string(),
                    details: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers and services
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Entrada {
        #[validate(length(min = 1, max = 50, message = "El código es requerido"))]
        codigo: String,
    }

    #[test]
    fn validation_errors_become_field_list() {
        let entrada = Entrada { codigo: String::new() };
        let err: AppError = entrada.validate().unwrap_err().into();
        match err {
            AppError::Validation { errors } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "codigo");
                assert_eq!(errors[0].message, "El código es requerido");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn duplicate_entry_responde_conflicto() {
        let response =
            AppError::DuplicateEntry("El código del artículo ya está registrado".to_string())
                .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn insufficient_stock_responde_bad_request() {
        let response =
            AppError::InsufficientStock("Existencia insuficiente".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
