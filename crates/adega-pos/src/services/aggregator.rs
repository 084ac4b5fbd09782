//! # Sale Aggregator
//!
//! The capability shared by the two ways of selling.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         SaleAggregator                                  │
//! │                                                                         │
//! │        ┌───────────────────────┐        ┌───────────────────────┐       │
//! │        │  QuickSale            │        │  TabSale              │       │
//! │        │  (caixa rápido)       │        │  (comanda)            │       │
//! │        ├───────────────────────┤        ├───────────────────────┤       │
//! │  add   │  cart only, checks    │        │  stock −qty + line    │       │
//! │        │  stock, takes none    │        │  in one transaction   │       │
//! │  −/rm  │  cart only            │        │  stock restored       │       │
//! │  final │  settle, then one tx: │        │  settle, then flip    │       │
//! │        │  stock + sale + lines │        │  status + method      │       │
//! │        └───────────────────────┘        └───────────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use adega_core::tender::{PaymentRequest, Settlement};
use adega_core::{Money, SaleWithItems};
use async_trait::async_trait;
use serde::Serialize;

use crate::error::PosResult;

/// What finalization hands back to the payment dialog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub sale: SaleWithItems,
    pub settlement: Settlement,
}

impl Receipt {
    /// Change owed to the customer (zero unless paid in cash).
    pub fn change(&self) -> Money {
        self.settlement.change
    }
}

/// Add, adjust and pay for a sale in progress.
#[async_trait]
pub trait SaleAggregator: Send + Sync {
    /// Adds `quantity` units of a product.
    async fn add_item(&self, product_id: &str, quantity: i64) -> PosResult<()>;

    /// Adds one unit ("+" button).
    async fn increment(&self, product_id: &str) -> PosResult<()> {
        self.add_item(product_id, 1).await
    }

    /// Takes one unit off; the line disappears at zero.
    async fn decrement(&self, product_id: &str) -> PosResult<()>;

    /// Drops the whole line.
    async fn remove(&self, product_id: &str) -> PosResult<()>;

    /// Current total.
    async fn total(&self) -> PosResult<Money>;

    /// Validates the payment against the total and records the sale.
    async fn finalize(&self, payment: &PaymentRequest) -> PosResult<Receipt>;
}
