//! Read-only queries behind the sales report and dashboard.
//!
//! Timestamps are stored as RFC 3339 text in UTC, so range filters are
//! plain string comparisons.

use adega_core::report::{DateRange, StoreCounters};
use adega_core::{Money, SaleRecord, SaleWithItems};
use sqlx::SqlitePool;
use tracing::debug;

use super::sale::{fetch_items, fetch_sale};
use crate::error::DbResult;

const SELECT_RECORD: &str = "SELECT s.id, s.operator_id, s.customer_name, s.tab_number, \
     s.status, s.total_cents, s.payment_method, s.created_at, s.updated_at, \
     pr.display_name AS operator_name \
     FROM sales s LEFT JOIN profiles pr ON pr.id = s.operator_id";

#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Finalized sales whose finalization time falls inside `range`,
    /// newest first, with the operator's display name.
    pub async fn finalized_between(&self, range: &DateRange) -> DbResult<Vec<SaleRecord>> {
        let sql = format!(
            "{SELECT_RECORD} WHERE s.status = 'finalized' \
             AND s.updated_at >= ?1 AND s.updated_at <= ?2 \
             ORDER BY s.updated_at DESC, s.rowid DESC"
        );
        let records = sqlx::query_as::<_, SaleRecord>(&sql)
            .bind(range.from)
            .bind(range.to)
            .fetch_all(&self.pool)
            .await?;

        debug!(
            from = %range.from,
            to = %range.to,
            count = records.len(),
            "Loaded finalized sales"
        );
        Ok(records)
    }

    /// Store-wide counters for the dashboard.
    pub async fn counters(&self) -> DbResult<StoreCounters> {
        let mut conn = self.pool.acquire().await?;

        let all_time: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_cents), 0) FROM sales WHERE status = 'finalized'",
        )
        .fetch_one(&mut *conn)
        .await?;

        let (product_count, stock_units): (i64, i64) =
            sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(stock), 0) FROM products")
                .fetch_one(&mut *conn)
                .await?;

        let open_tabs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE status = 'open'")
            .fetch_one(&mut *conn)
            .await?;

        let open_sessions: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM cash_sessions WHERE status = 'open'")
                .fetch_one(&mut *conn)
                .await?;

        Ok(StoreCounters {
            all_time_sales: Money::from_cents(all_time),
            product_count,
            stock_units,
            open_tabs,
            open_sessions,
        })
    }

    /// One sale with its line items, for the report's detail view.
    pub async fn sale_details(&self, sale_id: &str) -> DbResult<Option<SaleWithItems>> {
        let mut conn = self.pool.acquire().await?;
        let Some(sale) = fetch_sale(&mut conn, sale_id).await? else {
            return Ok(None);
        };
        let items = fetch_items(&mut conn, sale_id).await?;
        Ok(Some(SaleWithItems { sale, items }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{product, test_db};
    use adega_core::cart::CartLine;
    use adega_core::PaymentMethod;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_finalized_between_and_counters() {
        let db = test_db().await;
        let beer = product(&db, "Skol", 500, 10).await;
        db.profiles().upsert("op", "Ana").await.unwrap();
        db.cash_sessions().open("op", Money::zero()).await.unwrap();

        let line = CartLine {
            product_id: beer.id.clone(),
            name: beer.name.clone(),
            unit_price_cents: 500,
            quantity: 2,
        };
        let done = db
            .sales()
            .checkout("op", &[line], PaymentMethod::Pix)
            .await
            .unwrap();
        // an open tab is never reported
        db.sales().open_tab("op", None, Some(3)).await.unwrap();

        let now = Utc::now();
        let range = DateRange::new(now - Duration::hours(1), now + Duration::hours(1)).unwrap();
        let records = db.reports().finalized_between(&range).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sale.id, done.sale.id);
        assert_eq!(records[0].operator_name.as_deref(), Some("Ana"));

        let past = DateRange::new(now - Duration::days(2), now - Duration::days(1)).unwrap();
        assert!(db.reports().finalized_between(&past).await.unwrap().is_empty());

        let counters = db.reports().counters().await.unwrap();
        assert_eq!(counters.all_time_sales.cents(), 1000);
        assert_eq!(counters.product_count, 1);
        assert_eq!(counters.stock_units, 8);
        assert_eq!(counters.open_tabs, 1);
        assert_eq!(counters.open_sessions, 1);

        let details = db
            .reports()
            .sale_details(&done.sale.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(details.items.len(), 1);
        assert!(db.reports().sale_details("nope").await.unwrap().is_none());
    }
}
