//! # Error Types
//!
//! Domain-specific error types for adega-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  adega-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Malformed or missing input                      │
//! │                                                                         │
//! │  adega-db errors                                                        │
//! │  └── DbError          - Persistence failures (+ CoreError raised        │
//! │                         inside a transaction)                           │
//! │                                                                         │
//! │  adega-pos errors                                                       │
//! │  └── PosError         - What the operator sees (code + message)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → PosError → UI toast      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `CoreError` belongs to exactly one [`ErrorKind`]: the operator is
//! told the input was wrong, the current state forbids the action, or the
//! referenced record is gone.

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Error Kind
// =============================================================================

/// Coarse classification of a domain error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or missing input. Nothing was written.
    Validation,
    /// The action is not allowed in the current state.
    Conflict,
    /// The referenced record does not exist (or no longer exists).
    NotFound,
}

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    #[error("Cash session not found: {0}")]
    SessionNotFound(String),

    /// The operator has no open cash session.
    ///
    /// ## When This Occurs
    /// - Loading the summary before opening the register
    #[error("No active cash session for operator {operator_id}")]
    NoActiveSession { operator_id: String },

    /// The action needs an open cash session and the operator has none.
    ///
    /// ## When This Occurs
    /// - Quick sale add or finalize with the register closed
    /// - Tab finalization with the register closed
    /// - Recording a manual movement with the register closed
    #[error("Cash register must be open for operator {operator_id}")]
    SessionRequired { operator_id: String },

    /// The operator already has an open cash session.
    #[error("Operator {operator_id} already has an open cash session")]
    SessionAlreadyOpen { operator_id: String },

    /// Closing a session that is already closed.
    #[error("Cash session {session_id} is already closed")]
    SessionClosed { session_id: String },

    /// Insufficient stock to add the requested quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to tab (qty: 1)
    ///      │
    ///      ▼
    /// Check stock: available=0
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Heineken 600ml", available: 0, requested: 1 }
    ///      │
    ///      ▼
    /// UI shows: "Produto sem estoque"
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// The sale is finalized and can no longer change.
    #[error("Sale {sale_id} is {status}, cannot perform operation")]
    SaleNotOpen { sale_id: String, status: String },

    /// Cancelling a tab that still has line items.
    #[error("Sale {sale_id} still has {items} line item(s)")]
    SaleNotEmpty { sale_id: String, items: usize },

    /// Finalizing a sale with no line items.
    #[error("Cannot finalize a sale without items")]
    EmptySale,

    /// The sale total moved after the payment was settled against it.
    #[error("Sale {sale_id} total changed from {settled} to {current} during payment")]
    TotalChanged {
        sale_id: String,
        settled: String,
        current: String,
    },

    /// The product has no line on this sale.
    #[error("Product {product_id} is not on sale {sale_id}")]
    ItemNotInSale { sale_id: String, product_id: String },

    #[error("Product {0} is not in the cart")]
    ItemNotInCart(String),

    /// Product still referenced by sale lines, cannot be deleted.
    #[error("Product {0} is referenced by sales and cannot be deleted")]
    ProductInUse(String),

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns the classification used by the UI layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::ProductNotFound(_)
            | CoreError::SaleNotFound(_)
            | CoreError::SessionNotFound(_)
            | CoreError::NoActiveSession { .. }
            | CoreError::ItemNotInSale { .. }
            | CoreError::ItemNotInCart(_) => ErrorKind::NotFound,

            CoreError::SessionAlreadyOpen { .. }
            | CoreError::SessionRequired { .. }
            | CoreError::SessionClosed { .. }
            | CoreError::InsufficientStock { .. }
            | CoreError::SaleNotOpen { .. }
            | CoreError::SaleNotEmpty { .. }
            | CoreError::EmptySale
            | CoreError::TotalChanged { .. }
            | CoreError::ProductInUse(_) => ErrorKind::Conflict,

            CoreError::QuantityTooLarge { .. } | CoreError::Validation(_) => {
                ErrorKind::Validation
            }
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any write is attempted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., not a number, not a UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Cash tendered does not cover the sale total.
    #[error("Amount tendered {tendered} is less than the total {total}")]
    InsufficientTender { total: String, tendered: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Heineken 600ml".to_string(),
            available: 0,
            requested: 1,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Heineken 600ml: available 0, requested 1"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "payment method".to_string(),
        };
        assert_eq!(err.to_string(), "payment method is required");

        let err = ValidationError::MustNotBeNegative {
            field: "opening amount".to_string(),
        };
        assert_eq!(err.to_string(), "opening amount must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            CoreError::InsufficientStock {
                product: "x".into(),
                available: 0,
                requested: 1
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            CoreError::SessionClosed {
                session_id: "s".into()
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            CoreError::NoActiveSession {
                operator_id: "op".into()
            }
            .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            CoreError::SessionRequired {
                operator_id: "op".into()
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(CoreError::EmptySale.kind(), ErrorKind::Conflict);
    }
}
