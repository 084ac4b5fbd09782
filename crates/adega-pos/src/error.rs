//! # Service Error Type
//!
//! Unified error type returned by every service operation.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Adega POS                              │
//! │                                                                         │
//! │  Frontend                    Rust services                              │
//! │  ────────                    ─────────────                              │
//! │                                                                         │
//! │  finalizeTab(...)                                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐   │
//! │  │  Service method → PosResult<T>                                   │   │
//! │  │         │                                                        │   │
//! │  │  DbError::QueryFailed ──────── logged, generic message ──┐       │   │
//! │  │  DbError::Rule(CoreError) ──── kind() → code ────────────┤       │   │
//! │  │  CoreError / ValidationError ─ kind() → code ────────────┤       │   │
//! │  │                                                          ▼       │   │
//! │  │                                                  PosError ──────►│   │
//! │  └──────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  catch (e) { e.code === "CONFLICT" → toast(e.message) }                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Errors are not retried. The operator sees the message and decides.

use adega_core::{CoreError, ErrorKind, ValidationError};
use adega_db::DbError;
use serde::Serialize;

/// Result alias for service operations.
pub type PosResult<T> = Result<T, PosError>;

/// Error returned from service operations.
///
/// ## Serialization
/// ```json
/// {
///   "code": "CONFLICT",
///   "message": "Insufficient stock for Heineken 600ml: available 0, requested 1"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PosError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Referenced record does not exist
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Not allowed in the current state (register closed, out of stock, ...)
    Conflict,

    /// The database failed
    BackendError,

    /// Anything else
    Internal,
}

impl PosError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        PosError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        PosError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        PosError::new(ErrorCode::ValidationError, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        PosError::new(ErrorCode::Conflict, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PosError::new(ErrorCode::Internal, message)
    }

    fn backend(message: &str) -> Self {
        PosError::new(ErrorCode::BackendError, message)
    }
}

impl From<ErrorKind> for ErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Validation => ErrorCode::ValidationError,
            ErrorKind::Conflict => ErrorCode::Conflict,
            ErrorKind::NotFound => ErrorCode::NotFound,
        }
    }
}

/// Converts domain errors using their [`ErrorKind`].
impl From<CoreError> for PosError {
    fn from(err: CoreError) -> Self {
        PosError::new(err.kind().into(), err.to_string())
    }
}

impl From<ValidationError> for PosError {
    fn from(err: ValidationError) -> Self {
        PosError::validation(err.to_string())
    }
}

/// Converts database errors.
///
/// Infrastructure failures are logged in full and reduced to a generic
/// message.
impl From<DbError> for PosError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Rule(core) => core.into(),
            DbError::NotFound { entity, id } => PosError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                PosError::conflict(format!("{} '{}' already exists", field, value))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!("Foreign key violation: {}", message);
                PosError::conflict("Record is referenced by other records")
            }
            DbError::CheckViolation { message } => {
                tracing::warn!("Check constraint violation: {}", message);
                PosError::validation("Value rejected by the database")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                PosError::backend("Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                PosError::backend("Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                PosError::backend("Database operation failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                PosError::backend("Database is busy, try again")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                PosError::backend("Database operation failed")
            }
        }
    }
}

impl std::fmt::Display for PosError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for PosError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_errors_keep_their_kind() {
        let err: PosError = DbError::Rule(CoreError::SessionRequired {
            operator_id: "op".into(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::Conflict);

        let err: PosError = DbError::Rule(CoreError::NoActiveSession {
            operator_id: "op".into(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err: PosError = CoreError::from(ValidationError::Required {
            field: "payment method".into(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_backend_errors_are_generic() {
        let err: PosError = DbError::QueryFailed("disk I/O error at page 42".into()).into();
        assert_eq!(err.code, ErrorCode::BackendError);
        assert!(!err.message.contains("page 42"));
    }

    #[test]
    fn test_serialization() {
        let err = PosError::conflict("Caixa fechado");
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"code":"CONFLICT","message":"Caixa fechado"}"#);
    }
}
