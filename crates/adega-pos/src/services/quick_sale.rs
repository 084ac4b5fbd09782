//! # Quick Sale ("Caixa Rápido")
//!
//! Walk-up sales paid on the spot. Items live in an in-memory [`Cart`]
//! until finalization; stock is only taken when the sale is written.
//!
//! ## Thread Safety
//! The cart sits behind a `Mutex`. The lock is never held across an
//! `.await`: finalization snapshots the lines, writes, then clears.

use std::sync::{Mutex, MutexGuard};

use adega_core::cart::{Cart, CartLine};
use adega_core::tender::{settle, PaymentRequest};
use adega_core::{CoreError, Money};
use adega_db::Database;
use async_trait::async_trait;
use tracing::{debug, info};

use super::aggregator::{Receipt, SaleAggregator};
use crate::context::OperatorContext;
use crate::error::PosResult;

/// One operator's quick-sale counter.
#[derive(Debug)]
pub struct QuickSale {
    db: Database,
    ctx: OperatorContext,
    cart: Mutex<Cart>,
}

impl QuickSale {
    pub fn new(db: Database, ctx: OperatorContext) -> Self {
        QuickSale {
            db,
            ctx,
            cart: Mutex::new(Cart::new()),
        }
    }

    /// Copy of the current lines, in the order they were added.
    pub fn lines(&self) -> Vec<CartLine> {
        self.cart().lines().to_vec()
    }

    pub fn is_empty(&self) -> bool {
        self.cart().is_empty()
    }

    /// Drops every line without selling.
    pub fn clear(&self) {
        self.cart().clear();
    }

    fn cart(&self) -> MutexGuard<'_, Cart> {
        // A panic while holding the lock cannot leave the cart half-updated.
        self.cart.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn require_session(&self) -> PosResult<()> {
        if self.db.cash_sessions().current(self.ctx.id()).await?.is_none() {
            return Err(CoreError::SessionRequired {
                operator_id: self.ctx.operator_id.clone(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl SaleAggregator for QuickSale {
    /// Checks the register is open and the stock covers what will be in the
    /// cart, then adds to the cart. Nothing is written.
    async fn add_item(&self, product_id: &str, quantity: i64) -> PosResult<()> {
        self.require_session().await?;

        let product = self
            .db
            .products()
            .get(product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        self.cart().add_item(&product, quantity)?;
        debug!(product_id = %product_id, quantity, "Added to quick-sale cart");
        Ok(())
    }

    async fn decrement(&self, product_id: &str) -> PosResult<()> {
        self.cart().decrement(product_id)?;
        Ok(())
    }

    async fn remove(&self, product_id: &str) -> PosResult<()> {
        self.cart().remove_item(product_id)?;
        Ok(())
    }

    async fn total(&self) -> PosResult<Money> {
        Ok(self.cart().total())
    }

    /// Validates the payment, then writes the whole sale in one
    /// transaction. The cart is cleared only on success.
    async fn finalize(&self, payment: &PaymentRequest) -> PosResult<Receipt> {
        let (lines, total) = {
            let cart = self.cart();
            (cart.lines().to_vec(), cart.total())
        };

        let settlement = settle(total, payment)?;
        if lines.is_empty() {
            return Err(CoreError::EmptySale.into());
        }

        let sale = self
            .db
            .sales()
            .checkout(self.ctx.id(), &lines, settlement.method)
            .await?;

        self.cart().clear();
        info!(
            sale_id = %sale.sale.id,
            change = %settlement.change,
            "Quick sale paid"
        );
        Ok(Receipt { sale, settlement })
    }
}
