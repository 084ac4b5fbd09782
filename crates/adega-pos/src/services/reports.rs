//! # Reports
//!
//! The sales report ("Vendas") and the dashboard.
//!
//! Calendar days are the store's local days, using the configured UTC
//! offset.

use adega_core::report::{DashboardStats, DateRange, SalesReport};
use adega_core::{CoreError, SaleWithItems};
use adega_db::Database;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use tracing::debug;

use crate::error::PosResult;

#[derive(Debug, Clone)]
pub struct ReportService {
    db: Database,
    offset: FixedOffset,
    recent: usize,
}

impl ReportService {
    /// `recent` is how many of the day's sales the dashboard lists.
    pub fn new(db: Database, offset: FixedOffset, recent: usize) -> Self {
        ReportService { db, offset, recent }
    }

    /// Finalized sales in `[from, to]`, newest first, with totals.
    pub async fn sales_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> PosResult<SalesReport> {
        let range = DateRange::new(from, to)?;
        self.sales_in(range).await
    }

    /// Finalized sales on the local calendar days `first..=last`.
    pub async fn sales_on_days(&self, first: NaiveDate, last: NaiveDate) -> PosResult<SalesReport> {
        let range = DateRange::local_days(first, last, self.offset)?;
        self.sales_in(range).await
    }

    /// Today's date at the store.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }

    /// Dashboard KPIs for the local calendar `day`.
    pub async fn dashboard(&self, day: NaiveDate) -> PosResult<DashboardStats> {
        let range = DateRange::local_day(day, self.offset);
        let reports = self.db.reports();

        let counters = reports.counters().await?;
        let today = reports.finalized_between(&range).await?;

        debug!(%day, sales = today.len(), "Dashboard loaded");
        Ok(DashboardStats::new(counters, today, self.recent))
    }

    /// One sale with its lines, for the report's detail view.
    pub async fn sale_details(&self, sale_id: &str) -> PosResult<SaleWithItems> {
        self.db
            .reports()
            .sale_details(sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()).into())
    }

    async fn sales_in(&self, range: DateRange) -> PosResult<SalesReport> {
        let sales = self.db.reports().finalized_between(&range).await?;
        Ok(SalesReport::new(range, sales))
    }
}
