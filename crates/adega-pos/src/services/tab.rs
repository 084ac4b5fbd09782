//! # Tabs ("Comandas")
//!
//! A tab is an open sale that stays on the board while the customer
//! drinks. Every item change is written immediately (stock included), so
//! all counters see the same tab.
//!
//! ## Tab Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TabService::open_tab("Carlos", 12) ──► TabSale handle                  │
//! │                                              │                          │
//! │            ┌─────────────────────────────────┤                          │
//! │            ▼                                 ▼                          │
//! │   add_item / increment /              finalize(payment)                 │
//! │   decrement / remove                  ├── settle (tender)               │
//! │   (one tx each, stock moves)          └── status → finalized            │
//! │            │                                                            │
//! │            ▼ all lines gone?                                            │
//! │   TabService::cancel_empty() ──► row deleted                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use adega_core::tender::{settle, PaymentRequest};
use adega_core::{CoreError, Money, Sale, SaleWithItems};
use adega_db::Database;
use async_trait::async_trait;
use tracing::info;

use super::aggregator::{Receipt, SaleAggregator};
use crate::context::OperatorContext;
use crate::error::PosResult;

/// Tab board operations.
#[derive(Debug, Clone)]
pub struct TabService {
    db: Database,
}

impl TabService {
    pub fn new(db: Database) -> Self {
        TabService { db }
    }

    /// Creates an empty tab and returns a handle to work on it.
    pub async fn open_tab(
        &self,
        ctx: &OperatorContext,
        customer_name: Option<&str>,
        tab_number: Option<i64>,
    ) -> PosResult<TabSale> {
        let sale = self
            .db
            .sales()
            .open_tab(ctx.id(), customer_name, tab_number)
            .await?;
        Ok(TabSale::new(self.db.clone(), ctx.clone(), sale.id))
    }

    /// Handle on an existing tab.
    pub fn tab(&self, ctx: &OperatorContext, sale_id: impl Into<String>) -> TabSale {
        TabSale::new(self.db.clone(), ctx.clone(), sale_id.into())
    }

    /// Open tabs, oldest first.
    pub async fn list_open_tabs(&self) -> PosResult<Vec<Sale>> {
        Ok(self.db.sales().list_open().await?)
    }

    /// One tab with its lines and product names.
    pub async fn load_tab(&self, sale_id: &str) -> PosResult<SaleWithItems> {
        self.db
            .sales()
            .with_items(sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()).into())
    }

    /// Deletes a tab that has no lines.
    pub async fn cancel_empty(&self, sale_id: &str) -> PosResult<()> {
        self.db.sales().cancel_empty(sale_id).await?;
        Ok(())
    }
}

/// Works on one tab as `ctx`.
#[derive(Debug, Clone)]
pub struct TabSale {
    db: Database,
    ctx: OperatorContext,
    sale_id: String,
}

impl TabSale {
    fn new(db: Database, ctx: OperatorContext, sale_id: String) -> Self {
        TabSale { db, ctx, sale_id }
    }

    pub fn sale_id(&self) -> &str {
        &self.sale_id
    }

    pub async fn load(&self) -> PosResult<SaleWithItems> {
        TabService::new(self.db.clone()).load_tab(&self.sale_id).await
    }
}

#[async_trait]
impl SaleAggregator for TabSale {
    async fn add_item(&self, product_id: &str, quantity: i64) -> PosResult<()> {
        self.db
            .sales()
            .add_item(&self.sale_id, product_id, quantity)
            .await?;
        Ok(())
    }

    async fn decrement(&self, product_id: &str) -> PosResult<()> {
        self.db
            .sales()
            .decrement_item(&self.sale_id, product_id)
            .await?;
        Ok(())
    }

    async fn remove(&self, product_id: &str) -> PosResult<()> {
        self.db.sales().remove_item(&self.sale_id, product_id).await?;
        Ok(())
    }

    async fn total(&self) -> PosResult<Money> {
        let sale = self
            .db
            .sales()
            .get(&self.sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(self.sale_id.clone()))?;
        Ok(sale.total())
    }

    /// Settles against the tab's current total, then marks it paid.
    ///
    /// The finalizing operator's register must be open and the sale is
    /// attributed to them. If the tab changed between reading the total and
    /// writing, the payment is rejected with a conflict and nothing changes.
    async fn finalize(&self, payment: &PaymentRequest) -> PosResult<Receipt> {
        let total = self.total().await?;
        let settlement = settle(total, payment)?;

        let sales = self.db.sales();
        sales
            .finalize(&self.sale_id, self.ctx.id(), &settlement)
            .await?;
        let sale = sales
            .with_items(&self.sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(self.sale_id.clone()))?;

        info!(
            sale_id = %self.sale_id,
            change = %settlement.change,
            "Tab paid"
        );
        Ok(Receipt { sale, settlement })
    }
}
