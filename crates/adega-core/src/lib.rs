//! # adega-core: Pure Business Logic for Adega POS
//!
//! Everything the store's rules decide, with no database, network or clock
//! access. The I/O crates call in here to validate and compute.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Adega POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                    Web frontend                                 │    │
//! │  │   Caixa ──► Comandas ──► Caixa Rápido ──► Produtos ──► Vendas   │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                adega-pos (services, watchers)                   │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │               ★ adega-core (THIS CRATE) ★                       │    │
//! │  │                                                                 │    │
//! │  │   types   money   cart   ledger   tender   report   catalog     │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                 adega-db (SQLite, repositories)                 │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, CashSession, Movement, ...)
//! - [`money`] - Money in integer centavos
//! - [`error`] - Domain error types
//! - [`validation`] - Input checks and amount parsing
//! - [`cart`] - Quick-sale cart
//! - [`ledger`] - Cash session reconciliation
//! - [`tender`] - Payment validation and change
//! - [`report`] - Sales report and dashboard aggregation
//! - [`catalog`] - Product filtering
//!
//! ## Example Usage
//!
//! ```rust
//! use adega_core::money::Money;
//! use adega_core::tender::{settle, PaymentRequest};
//!
//! let total = Money::from_cents(3550);
//! let settlement = settle(total, &PaymentRequest::cash(Money::from_cents(5000))).unwrap();
//! assert_eq!(settlement.change.to_string(), "R$ 14,50");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod ledger;
pub mod money;
pub mod report;
pub mod tender;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct products in a single cart or tab.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single product on one line.
///
/// ## Business Reason
/// Catches typos like 1000 instead of 10 at the counter.
pub const MAX_ITEM_QUANTITY: i64 = 999;
