//! # Tender
//!
//! Payment validation and change calculation at finalization.
//!
//! ```text
//! PaymentRequest { method, tendered }
//!      │
//!      ├── method missing ─────────────────────► Validation("payment method is required")
//!      │
//!      ├── Cash, tendered missing ─────────────► Validation("amount tendered is required")
//!      ├── Cash, tendered < total ─────────────► Validation(InsufficientTender)
//!      ├── Cash, tendered ≥ total ─────────────► change = tendered − total
//!      │
//!      └── Pix / cards ────────────────────────► change = 0 (tendered ignored)
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::PaymentMethod;

/// What the operator picked on the payment dialog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentRequest {
    pub method: Option<PaymentMethod>,
    /// Cash handed over by the customer. Only meaningful for cash.
    pub tendered: Option<Money>,
}

impl PaymentRequest {
    pub fn cash(tendered: Money) -> Self {
        PaymentRequest {
            method: Some(PaymentMethod::Cash),
            tendered: Some(tendered),
        }
    }

    pub fn with_method(method: PaymentMethod) -> Self {
        PaymentRequest {
            method: Some(method),
            tendered: None,
        }
    }
}

/// Outcome of a valid payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Settlement {
    pub method: PaymentMethod,
    pub total: Money,
    pub tendered: Option<Money>,
    pub change: Money,
}

impl Settlement {
    /// Re-checks the tender rule for a settlement built elsewhere.
    pub fn verify(&self) -> CoreResult<()> {
        if self.method != PaymentMethod::Cash {
            return Ok(());
        }
        match self.tendered {
            None => Err(ValidationError::Required {
                field: "amount tendered".to_string(),
            }
            .into()),
            Some(tendered) if tendered < self.total => Err(ValidationError::InsufficientTender {
                total: self.total.to_string(),
                tendered: tendered.to_string(),
            }
            .into()),
            Some(_) => Ok(()),
        }
    }
}

/// Validates `request` against `total` and computes the change.
///
/// ## Example
/// ```rust
/// use adega_core::money::Money;
/// use adega_core::tender::{settle, PaymentRequest};
///
/// let s = settle(Money::from_cents(3550), &PaymentRequest::cash(Money::from_cents(5000))).unwrap();
/// assert_eq!(s.change.cents(), 1450);
/// ```
pub fn settle(total: Money, request: &PaymentRequest) -> CoreResult<Settlement> {
    let method = request.method.ok_or_else(|| ValidationError::Required {
        field: "payment method".to_string(),
    })?;

    if method != PaymentMethod::Cash {
        return Ok(Settlement {
            method,
            total,
            tendered: None,
            change: Money::zero(),
        });
    }

    let tendered = request.tendered.ok_or_else(|| ValidationError::Required {
        field: "amount tendered".to_string(),
    })?;

    if tendered < total {
        return Err(ValidationError::InsufficientTender {
            total: total.to_string(),
            tendered: tendered.to_string(),
        }
        .into());
    }

    Ok(Settlement {
        method,
        total,
        tendered: Some(tendered),
        change: tendered.saturating_sub(total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_cash_change() {
        let s = settle(
            Money::from_cents(3550),
            &PaymentRequest::cash(Money::from_cents(5000)),
        )
        .unwrap();
        assert_eq!(s.method, PaymentMethod::Cash);
        assert_eq!(s.change.cents(), 1450);
        assert_eq!(s.tendered, Some(Money::from_cents(5000)));
    }

    #[test]
    fn test_cash_exact() {
        let s = settle(
            Money::from_cents(2000),
            &PaymentRequest::cash(Money::from_cents(2000)),
        )
        .unwrap();
        assert!(s.change.is_zero());
    }

    #[test]
    fn test_cash_insufficient() {
        let err = settle(
            Money::from_cents(3550),
            &PaymentRequest::cash(Money::from_cents(3000)),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InsufficientTender { .. })
        ));
    }

    #[test]
    fn test_cash_without_tender() {
        let request = PaymentRequest {
            method: Some(PaymentMethod::Cash),
            tendered: None,
        };
        assert!(matches!(
            settle(Money::from_cents(100), &request),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));
    }

    #[test]
    fn test_missing_method() {
        assert!(matches!(
            settle(Money::from_cents(100), &PaymentRequest::default()),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));
    }

    #[test]
    fn test_non_cash_has_no_change() {
        let request = PaymentRequest {
            method: Some(PaymentMethod::Pix),
            tendered: Some(Money::from_cents(99999)),
        };
        let s = settle(Money::from_cents(2000), &request).unwrap();
        assert!(s.change.is_zero());
        assert_eq!(s.tendered, None);
    }

    #[test]
    fn test_verify_rejects_underpaid_cash() {
        let mut s = settle(
            Money::from_cents(1200),
            &PaymentRequest::cash(Money::from_cents(1200)),
        )
        .unwrap();
        assert!(s.verify().is_ok());

        s.total = Money::from_cents(3600);
        assert!(matches!(
            s.verify(),
            Err(CoreError::Validation(ValidationError::InsufficientTender { .. }))
        ));

        s.tendered = None;
        assert!(s.verify().is_err());
    }
}
