//! # Reports
//!
//! Aggregations behind the sales report and the dashboard.
//!
//! Date windows are computed here from a calendar day and the store's UTC
//! offset, then handed to the database layer as UTC instants.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::ledger::PaymentBreakdown;
use crate::money::Money;
use crate::types::SaleRecord;

// =============================================================================
// Time Windows
// =============================================================================

/// An inclusive UTC time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "String")]
    pub from: DateTime<Utc>,
    #[ts(as = "String")]
    pub to: DateTime<Utc>,
}

impl DateRange {
    /// Builds a range, rejecting `from > to`.
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> CoreResult<Self> {
        if from > to {
            return Err(ValidationError::InvalidFormat {
                field: "date range".to_string(),
                reason: "start is after end".to_string(),
            }
            .into());
        }
        Ok(DateRange { from, to })
    }

    /// The whole calendar `day` in the store's local time.
    ///
    /// ```rust
    /// use adega_core::report::DateRange;
    /// use chrono::{FixedOffset, NaiveDate};
    ///
    /// let brt = FixedOffset::west_opt(3 * 3600).unwrap();
    /// let day = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
    /// let range = DateRange::local_day(day, brt);
    /// assert_eq!(range.from.to_rfc3339(), "2026-10-17T03:00:00+00:00");
    /// ```
    pub fn local_day(day: NaiveDate, offset: FixedOffset) -> Self {
        let start_local = day.and_time(NaiveTime::MIN);
        // Fixed offsets have exactly one mapping.
        let from = offset
            .from_local_datetime(&start_local)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&start_local));
        let to = from + Duration::days(1) - Duration::microseconds(1);
        DateRange { from, to }
    }

    /// Both calendar days inclusive, local time.
    pub fn local_days(first: NaiveDate, last: NaiveDate, offset: FixedOffset) -> CoreResult<Self> {
        let from = DateRange::local_day(first, offset).from;
        let to = DateRange::local_day(last, offset).to;
        DateRange::new(from, to)
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from <= at && at <= self.to
    }
}

// =============================================================================
// Sales Totals
// =============================================================================

/// Grand total and per-method totals of a list of finalized sales.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesTotals {
    pub count: usize,
    pub total: Money,
    pub by_method: PaymentBreakdown,
}

impl SalesTotals {
    pub fn from_records(records: &[SaleRecord]) -> Self {
        let by_method = PaymentBreakdown::from_sales(records.iter().map(|r| &r.sale));
        SalesTotals {
            count: records.len(),
            total: by_method.total(),
            by_method,
        }
    }

    /// Average ticket, zero when there are no sales.
    pub fn average_ticket(&self) -> Money {
        if self.count == 0 {
            return Money::zero();
        }
        Money::from_cents(self.total.cents() / self.count as i64)
    }
}

/// Sales report over a date range.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesReport {
    pub range: DateRange,
    /// Newest first.
    pub sales: Vec<SaleRecord>,
    pub totals: SalesTotals,
}

impl SalesReport {
    pub fn new(range: DateRange, sales: Vec<SaleRecord>) -> Self {
        let totals = SalesTotals::from_records(&sales);
        SalesReport {
            range,
            sales,
            totals,
        }
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// Store-wide counters, as read from the database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoreCounters {
    /// Σ totals of every finalized sale.
    pub all_time_sales: Money,
    pub product_count: i64,
    /// Σ stock over all products.
    pub stock_units: i64,
    pub open_tabs: i64,
    pub open_sessions: i64,
}

/// The dashboard KPIs.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    pub counters: StoreCounters,
    pub today: SalesTotals,
    /// The day's most recent sales, newest first.
    pub recent_sales: Vec<SaleRecord>,
}

impl DashboardStats {
    /// Builds the dashboard from the counters and the day's sales.
    ///
    /// `today_sales` must be newest first; only the first `recent` are kept
    /// for display but all of them count towards the day's totals.
    pub fn new(counters: StoreCounters, today_sales: Vec<SaleRecord>, recent: usize) -> Self {
        let today = SalesTotals::from_records(&today_sales);
        let mut recent_sales = today_sales;
        recent_sales.truncate(recent);
        DashboardStats {
            counters,
            today,
            recent_sales,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
