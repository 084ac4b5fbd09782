//! # Domain Types
//!
//! Core domain types used throughout Adega POS.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │    Product      │   │      Sale       │   │  SaleLineItem   │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id (UUID)      │◄──│  operator_id    │◄──│  sale_id (FK)   │        │
//! │  │  category_id    │   │  status         │   │  product_id     │        │
//! │  │  price_cents    │   │  total_cents    │   │  quantity       │        │
//! │  │  stock          │   │  payment_method │   │  unit_price     │        │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘        │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │  CashSession    │   │    Movement     │   │ PaymentMethod   │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  operator_id    │   │  operator_id    │   │  Cash           │        │
//! │  │  opening_cents  │   │  kind (in/out)  │   │  Pix            │        │
//! │  │  status         │   │  amount_cents   │   │  CreditCard     │        │
//! │  │  closing_cents  │   │  description    │   │  DebitCard      │        │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Monetary columns are stored as `*_cents` integers and exposed as
//! [`Money`] through accessor methods. Columns named `*_name` on the row
//! structs are joined from other tables and are read-only.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Catalog
// =============================================================================

/// A product category ("Cervejas", "Destilados", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub name: String,

    pub category_id: Option<String>,

    /// Joined from `categories.name`.
    pub category_name: Option<String>,

    /// Purchase cost in centavos.
    pub cost_cents: i64,

    /// Sale price in centavos. Snapshotted onto line items when sold.
    pub price_cents: i64,

    /// Units on hand. Never negative.
    pub stock: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sale price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the purchase cost as Money.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// Checks if `quantity` units can be taken from stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

/// Fields for creating or replacing a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInput {
    pub name: String,
    pub category_id: Option<String>,
    pub cost_cents: i64,
    pub price_cents: i64,
    pub stock: i64,
}

/// An operator's display profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Profile {
    /// Same value as the operator id.
    pub id: String,
    pub display_name: String,
}

// =============================================================================
// Cash Session
// =============================================================================

/// Lifecycle of a cash-register session. `Open → Closed`, terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Open,
    Closed,
}

impl SessionStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Open => "open",
            SessionStatus::Closed => "closed",
        }
    }
}

/// One operator's cash-register shift ("caixa").
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashSession {
    pub id: String,
    pub operator_id: String,
    pub opening_cents: i64,
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    pub status: SessionStatus,
    pub closing_cents: Option<i64>,
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl CashSession {
    #[inline]
    pub fn opening_amount(&self) -> Money {
        Money::from_cents(self.opening_cents)
    }

    #[inline]
    pub fn closing_amount(&self) -> Option<Money> {
        self.closing_cents.map(Money::from_cents)
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }
}

/// Direction of a cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Cash entering the drawer (opening float, "suprimento").
    In,
    /// Cash leaving the drawer ("sangria", closing).
    Out,
}

/// A cash entry or exit recorded against an operator.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Movement {
    pub id: String,
    pub operator_id: String,
    pub kind: MovementKind,
    pub description: String,
    pub amount_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Movement {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale. `Open → Finalized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Tab still taking items.
    Open,
    /// Paid. Immutable from here on.
    Finalized,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Open
    }
}

impl SaleStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Open => "open",
            SaleStatus::Finalized => "finalized",
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was settled.
///
/// Sales store the method as raw text so that values written by older
/// clients survive a round trip. [`PaymentMethod::from_stored`] maps the
/// stored text back; anything it cannot map is reported as unclassified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash. The only method that takes a tender and gives change.
    Cash,
    /// Instant bank transfer.
    Pix,
    CreditCard,
    DebitCard,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Pix,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
    ];

    /// Canonical stored value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Pix => "pix",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
        }
    }

    /// Receipt / report label.
    pub const fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::CreditCard => "Cartão de Crédito",
            PaymentMethod::DebitCard => "Cartão de Débito",
        }
    }

    /// Maps a stored value to a method. `None` means unclassified.
    pub fn from_stored(raw: Option<&str>) -> Option<PaymentMethod> {
        raw.and_then(|value| value.parse().ok())
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    /// Accepts the canonical values and the legacy Portuguese spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" | "dinheiro" => Ok(PaymentMethod::Cash),
            "pix" => Ok(PaymentMethod::Pix),
            "credit_card" | "cartao_credito" => Ok(PaymentMethod::CreditCard),
            "debit_card" | "cartao_debito" => Ok(PaymentMethod::DebitCard),
            "" => Err(ValidationError::Required {
                field: "payment method".to_string(),
            }),
            _ => Err(ValidationError::NotAllowed {
                field: "payment method".to_string(),
                allowed: PaymentMethod::ALL
                    .iter()
                    .map(|m| m.as_str().to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale: either an open tab ("comanda") or a finalized checkout.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub operator_id: String,
    pub customer_name: Option<String>,
    pub tab_number: Option<i64>,
    pub status: SaleStatus,
    /// Always the sum of the line subtotals.
    pub total_cents: i64,
    /// Raw stored value, see [`PaymentMethod::from_stored`].
    pub payment_method: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == SaleStatus::Open
    }

    /// Parsed payment method, `None` when missing or unrecognized.
    pub fn method(&self) -> Option<PaymentMethod> {
        PaymentMethod::from_stored(self.payment_method.as_deref())
    }
}

/// A sale joined with the operator's display name, for listings.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleRecord {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub sale: Sale,
    pub operator_name: Option<String>,
}

/// One product line on a sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleLineItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Joined from `products.name`.
    pub product_name: Option<String>,
    pub quantity: i64,
    /// Product price at the time the line was created.
    pub unit_price_cents: i64,
    /// `quantity * unit_price_cents`.
    pub subtotal_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleLineItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

/// A sale together with its lines.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleWithItems {
    pub sale: Sale,
    pub items: Vec<SaleLineItem>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_parse_aliases() {
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("dinheiro".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("PIX".parse::<PaymentMethod>().unwrap(), PaymentMethod::Pix);
        assert_eq!(
            "cartao_credito".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::CreditCard
        );
        assert_eq!(
            "debit_card".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::DebitCard
        );
    }

    #[test]
    fn test_payment_method_parse_rejects() {
        assert!(matches!(
            "".parse::<PaymentMethod>(),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            "cheque".parse::<PaymentMethod>(),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_payment_method_from_stored() {
        assert_eq!(PaymentMethod::from_stored(Some("pix")), Some(PaymentMethod::Pix));
        assert_eq!(PaymentMethod::from_stored(Some("voucher")), None);
        assert_eq!(PaymentMethod::from_stored(None), None);
    }

    #[test]
    fn test_payment_method_serde_matches_as_str() {
        for method in PaymentMethod::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.as_str()));
        }
    }

    #[test]
    fn test_sale_status_default() {
        assert_eq!(SaleStatus::default(), SaleStatus::Open);
    }

    #[test]
    fn test_product_can_sell() {
        let now = Utc::now();
        let product = Product {
            id: "p1".into(),
            name: "Heineken 600ml".into(),
            category_id: None,
            category_name: None,
            cost_cents: 700,
            price_cents: 1200,
            stock: 2,
            created_at: now,
            updated_at: now,
        };
        assert!(product.can_sell(2));
        assert!(!product.can_sell(3));
        assert_eq!(product.price().cents(), 1200);
    }
}
