//! # Sale Repository
//!
//! Tabs ("comandas"), their line items, and quick-sale checkout.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  TAB                                                                    │
//! │  1. open_tab()            → Sale { status: Open, total: 0 }             │
//! │  2. add_item()            → stock −qty, line +qty        ┐ each one     │
//! │     decrement_item()      → stock +1,   line −1 / delete │ transaction  │
//! │     remove_item()         → stock +qty, line deleted     ┘              │
//! │  3. finalize()            → Sale { status: Finalized, payment_method }  │
//! │     cancel_empty()        → row deleted (only with zero lines)          │
//! │                                                                         │
//! │  QUICK SALE                                                             │
//! │  checkout(lines)          → stock −qty for every line, sale inserted    │
//! │                             as Finalized, lines inserted. One tx.       │
//! │                                                                         │
//! │  sales.total_cents is maintained by triggers on sale_items.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Guard
//! Stock is taken with a conditional update:
//! ```sql
//! UPDATE products SET stock = stock - ?qty WHERE id = ? AND stock >= ?qty
//! ```
//! Zero rows affected means another counter got there first, and the whole
//! transaction is rolled back with `InsufficientStock`.

use adega_core::cart::CartLine;
use adega_core::tender::Settlement;
use adega_core::validation::{normalize_optional, validate_cart_size, validate_quantity};
use adega_core::{
    CoreError, Money, PaymentMethod, Sale, SaleLineItem, SaleStatus, SaleWithItems,
    MAX_ITEM_QUANTITY,
};
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::cash_session::fetch_open_session;
use super::product::fetch_product;
use super::{new_id, now};
use crate::error::DbResult;
use crate::events::{ChangeEvent, ChangeFeed, ChangeKind, Collection};

const SELECT_SALE: &str = "SELECT id, operator_id, customer_name, tab_number, status, \
     total_cents, payment_method, created_at, updated_at FROM sales";

const SELECT_ITEM: &str = "SELECT i.id, i.sale_id, i.product_id, p.name AS product_name, \
     i.quantity, i.unit_price_cents, i.subtotal_cents, i.created_at \
     FROM sale_items i LEFT JOIN products p ON p.id = i.product_id";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        SaleRepository { pool, feed }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn get(&self, id: &str) -> DbResult<Option<Sale>> {
        let mut conn = self.pool.acquire().await?;
        fetch_sale(&mut conn, id).await
    }

    /// Line items of a sale with product names, oldest first.
    pub async fn items(&self, sale_id: &str) -> DbResult<Vec<SaleLineItem>> {
        let mut conn = self.pool.acquire().await?;
        fetch_items(&mut conn, sale_id).await
    }

    /// A sale with its line items, or `None` if it does not exist.
    pub async fn with_items(&self, id: &str) -> DbResult<Option<SaleWithItems>> {
        let mut conn = self.pool.acquire().await?;
        let Some(sale) = fetch_sale(&mut conn, id).await? else {
            return Ok(None);
        };
        let items = fetch_items(&mut conn, id).await?;
        Ok(Some(SaleWithItems { sale, items }))
    }

    /// Open tabs, oldest first.
    pub async fn list_open(&self) -> DbResult<Vec<Sale>> {
        let sql = format!("{SELECT_SALE} WHERE status = 'open' ORDER BY created_at, rowid");
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(sales)
    }

    pub async fn count_open(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE status = 'open'")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Finalized sales of `operator_id` updated at or after `since`.
    pub async fn finalized_since(
        &self,
        operator_id: &str,
        since: DateTime<Utc>,
    ) -> DbResult<Vec<Sale>> {
        let mut conn = self.pool.acquire().await?;
        finalized_sales_since(&mut conn, operator_id, since).await
    }

    // =========================================================================
    // Tab writes
    // =========================================================================

    /// Creates an empty open tab.
    pub async fn open_tab(
        &self,
        operator_id: &str,
        customer_name: Option<&str>,
        tab_number: Option<i64>,
    ) -> DbResult<Sale> {
        let now = now();
        let sale = Sale {
            id: new_id(),
            operator_id: operator_id.to_string(),
            customer_name: normalize_optional(customer_name),
            tab_number,
            status: SaleStatus::Open,
            total_cents: 0,
            payment_method: None,
            created_at: now,
            updated_at: now,
        };

        let mut conn = self.pool.acquire().await?;
        insert_sale(&mut conn, &sale).await?;

        self.feed
            .publish([ChangeEvent::new(Collection::Sales, ChangeKind::Insert, &sale.id)]);
        info!(sale_id = %sale.id, tab_number = ?tab_number, "Tab opened");
        Ok(sale)
    }

    /// Adds `quantity` units of a product to an open sale.
    ///
    /// Takes stock and merges into the product's line (or creates one at the
    /// product's current price) in one transaction.
    pub async fn add_item(
        &self,
        sale_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<SaleLineItem> {
        validate_quantity(quantity).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        require_open_sale(&mut tx, sale_id).await?;
        let product = fetch_product(&mut tx, product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        let existing = fetch_line(&mut tx, sale_id, product_id).await?;
        if let Some(line) = &existing {
            let merged = line.quantity + quantity;
            if merged > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: merged,
                    max: MAX_ITEM_QUANTITY,
                }
                .into());
            }
        } else {
            let lines: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM sale_items WHERE sale_id = ?1")
                    .bind(sale_id)
                    .fetch_one(&mut *tx)
                    .await?;
            validate_cart_size(lines as usize).map_err(CoreError::from)?;
        }

        take_stock(&mut tx, product_id, &product.name, product.stock, quantity).await?;

        let now = now();
        let (line_id, kind) = match existing {
            Some(line) => {
                let merged = line.quantity + quantity;
                sqlx::query(
                    "UPDATE sale_items SET quantity = ?2, subtotal_cents = ?2 * unit_price_cents \
                     WHERE id = ?1",
                )
                .bind(&line.id)
                .bind(merged)
                .execute(&mut *tx)
                .await?;
                (line.id, ChangeKind::Update)
            }
            None => {
                let id = new_id();
                sqlx::query(
                    "INSERT INTO sale_items (id, sale_id, product_id, quantity, unit_price_cents, \
                     subtotal_cents, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .bind(&id)
                .bind(sale_id)
                .bind(product_id)
                .bind(quantity)
                .bind(product.price_cents)
                .bind(product.price().multiply_quantity(quantity).cents())
                .bind(now)
                .execute(&mut *tx)
                .await?;
                (id, ChangeKind::Insert)
            }
        };

        touch_sale(&mut tx, sale_id, now).await?;
        let line = fetch_line(&mut tx, sale_id, product_id)
            .await?
            .ok_or_else(|| CoreError::ItemNotInSale {
                sale_id: sale_id.to_string(),
                product_id: product_id.to_string(),
            })?;

        tx.commit().await?;

        self.feed.publish([
            ChangeEvent::new(Collection::Products, ChangeKind::Update, product_id),
            ChangeEvent::new(Collection::SaleItems, kind, &line_id),
            ChangeEvent::new(Collection::Sales, ChangeKind::Update, sale_id),
        ]);
        debug!(sale_id = %sale_id, product_id = %product_id, quantity, "Item added to sale");
        Ok(line)
    }

    /// Takes one unit off a line and returns it to stock.
    ///
    /// Returns the updated line, or `None` when the line was deleted.
    pub async fn decrement_item(
        &self,
        sale_id: &str,
        product_id: &str,
    ) -> DbResult<Option<SaleLineItem>> {
        let mut tx = self.pool.begin().await?;

        require_open_sale(&mut tx, sale_id).await?;
        let line = require_line(&mut tx, sale_id, product_id).await?;

        return_stock(&mut tx, product_id, 1).await?;

        let (remaining, kind) = if line.quantity <= 1 {
            delete_line(&mut tx, &line.id).await?;
            (None, ChangeKind::Delete)
        } else {
            sqlx::query(
                "UPDATE sale_items SET quantity = quantity - 1, \
                 subtotal_cents = (quantity - 1) * unit_price_cents WHERE id = ?1",
            )
            .bind(&line.id)
            .execute(&mut *tx)
            .await?;
            let updated = fetch_line(&mut tx, sale_id, product_id).await?;
            (updated, ChangeKind::Update)
        };

        touch_sale(&mut tx, sale_id, now()).await?;
        tx.commit().await?;

        self.feed.publish([
            ChangeEvent::new(Collection::Products, ChangeKind::Update, product_id),
            ChangeEvent::new(Collection::SaleItems, kind, &line.id),
            ChangeEvent::new(Collection::Sales, ChangeKind::Update, sale_id),
        ]);
        debug!(sale_id = %sale_id, product_id = %product_id, "Item decremented");
        Ok(remaining)
    }

    /// Deletes a whole line and returns its quantity to stock.
    pub async fn remove_item(&self, sale_id: &str, product_id: &str) -> DbResult<SaleLineItem> {
        let mut tx = self.pool.begin().await?;

        require_open_sale(&mut tx, sale_id).await?;
        let line = require_line(&mut tx, sale_id, product_id).await?;

        return_stock(&mut tx, product_id, line.quantity).await?;
        delete_line(&mut tx, &line.id).await?;
        touch_sale(&mut tx, sale_id, now()).await?;

        tx.commit().await?;

        self.feed.publish([
            ChangeEvent::new(Collection::Products, ChangeKind::Update, product_id),
            ChangeEvent::new(Collection::SaleItems, ChangeKind::Delete, &line.id),
            ChangeEvent::new(Collection::Sales, ChangeKind::Update, sale_id),
        ]);
        debug!(sale_id = %sale_id, product_id = %product_id, "Item removed");
        Ok(line)
    }

    /// Marks an open sale as paid by `operator_id`.
    ///
    /// The finalizing operator must have an open cash session, and the sale
    /// is attributed to them so it lands in the drawer that took the money.
    /// `settlement` must have been computed against the sale's current
    /// total: if a line changed since, nothing is written and the caller
    /// gets `TotalChanged`.
    pub async fn finalize(
        &self,
        sale_id: &str,
        operator_id: &str,
        settlement: &Settlement,
    ) -> DbResult<Sale> {
        settlement.verify()?;

        let mut tx = self.pool.begin().await?;

        require_session(&mut tx, operator_id).await?;
        let current = require_open_sale(&mut tx, sale_id).await?;

        if count_lines(&mut tx, sale_id).await? == 0 {
            return Err(CoreError::EmptySale.into());
        }
        if current.total() != settlement.total {
            return Err(total_changed(sale_id, settlement.total, current.total()));
        }

        let result = sqlx::query(
            "UPDATE sales SET status = 'finalized', operator_id = ?2, payment_method = ?3, \
             updated_at = ?4 WHERE id = ?1 AND status = 'open' AND total_cents = ?5",
        )
        .bind(sale_id)
        .bind(operator_id)
        .bind(settlement.method.as_str())
        .bind(now())
        .bind(settlement.total.cents())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let sale = fetch_sale(&mut tx, sale_id)
                .await?
                .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;
            if !sale.is_open() {
                return Err(not_open(sale_id, sale.status));
            }
            return Err(total_changed(sale_id, settlement.total, sale.total()));
        }

        let sale = fetch_sale(&mut tx, sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;
        tx.commit().await?;

        self.feed
            .publish([ChangeEvent::new(Collection::Sales, ChangeKind::Update, sale_id)]);
        info!(
            sale_id = %sale_id,
            operator_id = %operator_id,
            total = %sale.total(),
            method = %settlement.method,
            "Sale finalized"
        );
        Ok(sale)
    }

    /// Deletes an open sale that has no line items.
    pub async fn cancel_empty(&self, sale_id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        require_open_sale(&mut tx, sale_id).await?;

        let lines = count_lines(&mut tx, sale_id).await?;
        if lines > 0 {
            return Err(CoreError::SaleNotEmpty {
                sale_id: sale_id.to_string(),
                items: lines as usize,
            }
            .into());
        }

        sqlx::query("DELETE FROM sales WHERE id = ?1 AND status = 'open'")
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        self.feed
            .publish([ChangeEvent::new(Collection::Sales, ChangeKind::Delete, sale_id)]);
        info!(sale_id = %sale_id, "Empty tab cancelled");
        Ok(())
    }

    // =========================================================================
    // Quick sale
    // =========================================================================

    /// Writes a quick sale in one transaction: stock for every line, the
    /// sale as finalized, then its lines.
    ///
    /// Unit prices come from the cart lines (frozen when added), not from
    /// the current catalog.
    pub async fn checkout(
        &self,
        operator_id: &str,
        lines: &[CartLine],
        method: PaymentMethod,
    ) -> DbResult<SaleWithItems> {
        if lines.is_empty() {
            return Err(CoreError::EmptySale.into());
        }

        let mut tx = self.pool.begin().await?;

        require_session(&mut tx, operator_id).await?;

        for line in lines {
            let product = fetch_product(&mut tx, &line.product_id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;
            take_stock(
                &mut tx,
                &line.product_id,
                &product.name,
                product.stock,
                line.quantity,
            )
            .await?;
        }

        let now = now();
        let sale = Sale {
            id: new_id(),
            operator_id: operator_id.to_string(),
            customer_name: None,
            tab_number: None,
            status: SaleStatus::Finalized,
            total_cents: 0,
            payment_method: Some(method.as_str().to_string()),
            created_at: now,
            updated_at: now,
        };
        insert_sale(&mut tx, &sale).await?;

        for line in lines {
            sqlx::query(
                "INSERT INTO sale_items (id, sale_id, product_id, quantity, unit_price_cents, \
                 subtotal_cents, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(new_id())
            .bind(&sale.id)
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(line.subtotal().cents())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        let sale = fetch_sale(&mut tx, &sale.id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(sale.id.clone()))?;
        let items = fetch_items(&mut tx, &sale.id).await?;

        tx.commit().await?;

        let mut events: Vec<ChangeEvent> = lines
            .iter()
            .map(|l| ChangeEvent::new(Collection::Products, ChangeKind::Update, &l.product_id))
            .collect();
        events.extend(
            items
                .iter()
                .map(|i| ChangeEvent::new(Collection::SaleItems, ChangeKind::Insert, &i.id)),
        );
        events.push(ChangeEvent::new(Collection::Sales, ChangeKind::Insert, &sale.id));
        self.feed.publish(events);

        info!(
            sale_id = %sale.id,
            total = %sale.total(),
            method = %method,
            lines = items.len(),
            "Quick sale completed"
        );
        Ok(SaleWithItems { sale, items })
    }
}

// =============================================================================
// Connection-level helpers (usable inside any transaction)
// =============================================================================

pub(crate) async fn fetch_sale(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Sale>> {
    let sql = format!("{SELECT_SALE} WHERE id = ?1");
    let sale = sqlx::query_as::<_, Sale>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(sale)
}

pub(crate) async fn fetch_items(
    conn: &mut SqliteConnection,
    sale_id: &str,
) -> DbResult<Vec<SaleLineItem>> {
    let sql = format!("{SELECT_ITEM} WHERE i.sale_id = ?1 ORDER BY i.created_at, i.rowid");
    let items = sqlx::query_as::<_, SaleLineItem>(&sql)
        .bind(sale_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

/// Finalized sales of an operator whose `updated_at` is at or after `since`.
pub(crate) async fn finalized_sales_since(
    conn: &mut SqliteConnection,
    operator_id: &str,
    since: DateTime<Utc>,
) -> DbResult<Vec<Sale>> {
    let sql = format!(
        "{SELECT_SALE} WHERE operator_id = ?1 AND status = 'finalized' AND updated_at >= ?2 \
         ORDER BY created_at DESC, rowid DESC"
    );
    let sales = sqlx::query_as::<_, Sale>(&sql)
        .bind(operator_id)
        .bind(since)
        .fetch_all(conn)
        .await?;
    Ok(sales)
}

async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO sales (id, operator_id, customer_name, tab_number, status, total_cents, \
         payment_method, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(&sale.id)
    .bind(&sale.operator_id)
    .bind(&sale.customer_name)
    .bind(sale.tab_number)
    .bind(sale.status)
    .bind(sale.total_cents)
    .bind(&sale.payment_method)
    .bind(sale.created_at)
    .bind(sale.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

async fn fetch_line(
    conn: &mut SqliteConnection,
    sale_id: &str,
    product_id: &str,
) -> DbResult<Option<SaleLineItem>> {
    let sql = format!("{SELECT_ITEM} WHERE i.sale_id = ?1 AND i.product_id = ?2");
    let line = sqlx::query_as::<_, SaleLineItem>(&sql)
        .bind(sale_id)
        .bind(product_id)
        .fetch_optional(conn)
        .await?;
    Ok(line)
}

async fn require_line(
    conn: &mut SqliteConnection,
    sale_id: &str,
    product_id: &str,
) -> DbResult<SaleLineItem> {
    fetch_line(conn, sale_id, product_id).await?.ok_or_else(|| {
        CoreError::ItemNotInSale {
            sale_id: sale_id.to_string(),
            product_id: product_id.to_string(),
        }
        .into()
    })
}

async fn require_open_sale(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<Sale> {
    let sale = fetch_sale(conn, sale_id)
        .await?
        .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;
    if !sale.is_open() {
        return Err(not_open(sale_id, sale.status));
    }
    Ok(sale)
}

async fn require_session(conn: &mut SqliteConnection, operator_id: &str) -> DbResult<()> {
    if fetch_open_session(conn, operator_id).await?.is_none() {
        return Err(CoreError::SessionRequired {
            operator_id: operator_id.to_string(),
        }
        .into());
    }
    Ok(())
}

async fn count_lines(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items WHERE sale_id = ?1")
        .bind(sale_id)
        .fetch_one(conn)
        .await?;
    Ok(count)
}

/// Conditional stock decrement. `seen_stock` is only used for the error.
async fn take_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    product_name: &str,
    seen_stock: i64,
    quantity: i64,
) -> DbResult<()> {
    let result = sqlx::query(
        "UPDATE products SET stock = stock - ?2, updated_at = ?3 WHERE id = ?1 AND stock >= ?2",
    )
    .bind(product_id)
    .bind(quantity)
    .bind(now())
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(CoreError::InsufficientStock {
            product: product_name.to_string(),
            available: seen_stock,
            requested: quantity,
        }
        .into());
    }
    Ok(())
}

async fn return_stock(conn: &mut SqliteConnection, product_id: &str, quantity: i64) -> DbResult<()> {
    sqlx::query("UPDATE products SET stock = stock + ?2, updated_at = ?3 WHERE id = ?1")
        .bind(product_id)
        .bind(quantity)
        .bind(now())
        .execute(conn)
        .await?;
    Ok(())
}

async fn delete_line(conn: &mut SqliteConnection, line_id: &str) -> DbResult<()> {
    sqlx::query("DELETE FROM sale_items WHERE id = ?1")
        .bind(line_id)
        .execute(conn)
        .await?;
    Ok(())
}

async fn touch_sale(
    conn: &mut SqliteConnection,
    sale_id: &str,
    at: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query("UPDATE sales SET updated_at = ?2 WHERE id = ?1")
        .bind(sale_id)
        .bind(at)
        .execute(conn)
        .await?;
    Ok(())
}

fn not_open(sale_id: &str, status: SaleStatus) -> crate::error::DbError {
    CoreError::SaleNotOpen {
        sale_id: sale_id.to_string(),
        status: status.as_str().to_string(),
    }
    .into()
}

fn total_changed(sale_id: &str, settled: Money, current: Money) -> crate::error::DbError {
    CoreError::TotalChanged {
        sale_id: sale_id.to_string(),
        settled: settled.to_string(),
        current: current.to_string(),
    }
    .into()
}

// =============================================================================
// Unit Tests
// =============================================================================
