//! # Session Ledger Math
//!
//! Derives the financial summary of an open cash session from the sales
//! and movements recorded since it was opened. The summary is a pure
//! projection: it is recomputed on every load and never stored.
//!
//! ## Reconciliation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Finalized sales (since opened_at)      Movements (since opened_at)     │
//! │  ─────────────────────────────────      ───────────────────────────     │
//! │  R$ 35,50  cash                         in   R$ 100,00  Abertura        │
//! │  R$ 20,00  pix                          out  R$  10,00  Sangria         │
//! │      │                                        │                         │
//! │      ▼                                        ▼                         │
//! │  total_sales  = 55,50                   total_in  = 100,00              │
//! │  cash         = 35,50                   total_out =  10,00              │
//! │                                                                         │
//! │  physical_balance = cash + in − out          = 125,50  (drawer count)   │
//! │  closing_amount   = total_sales + in − out   = 145,50  (recorded)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `physical_balance` is what should be in the drawer. `closing_amount` is
//! the value written when the session is closed and counts every payment
//! method, not only cash.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{CashSession, Movement, MovementKind, PaymentMethod, Sale, SaleStatus};

/// Description of the movement written when a session opens.
pub const OPENING_DESCRIPTION: &str = "Abertura de caixa";

/// Description of the movement written when a session closes.
pub const CLOSING_DESCRIPTION: &str = "Fechamento de caixa";

// =============================================================================
// Payment Breakdown
// =============================================================================

/// Sales totals split by payment method.
///
/// Sales with a missing or unrecognized method land in `unclassified`, so
/// the buckets always add up to the grand total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentBreakdown {
    pub cash: Money,
    pub pix: Money,
    pub credit_card: Money,
    pub debit_card: Money,
    pub unclassified: Money,
}

impl PaymentBreakdown {
    /// Adds `amount` to the bucket for `method`.
    pub fn record(&mut self, method: Option<PaymentMethod>, amount: Money) {
        let bucket = match method {
            Some(PaymentMethod::Cash) => &mut self.cash,
            Some(PaymentMethod::Pix) => &mut self.pix,
            Some(PaymentMethod::CreditCard) => &mut self.credit_card,
            Some(PaymentMethod::DebitCard) => &mut self.debit_card,
            None => &mut self.unclassified,
        };
        *bucket += amount;
    }

    /// Total for one method.
    pub fn get(&self, method: PaymentMethod) -> Money {
        match method {
            PaymentMethod::Cash => self.cash,
            PaymentMethod::Pix => self.pix,
            PaymentMethod::CreditCard => self.credit_card,
            PaymentMethod::DebitCard => self.debit_card,
        }
    }

    /// Sum of every bucket.
    pub fn total(&self) -> Money {
        self.cash + self.pix + self.credit_card + self.debit_card + self.unclassified
    }

    /// Breakdown of the finalized sales in `sales`. Open sales are ignored.
    pub fn from_sales<'a, I>(sales: I) -> Self
    where
        I: IntoIterator<Item = &'a Sale>,
    {
        let mut breakdown = PaymentBreakdown::default();
        for sale in sales
            .into_iter()
            .filter(|s| s.status == SaleStatus::Finalized)
        {
            breakdown.record(sale.method(), sale.total());
        }
        breakdown
    }
}

// =============================================================================
// Ledger Totals
// =============================================================================

/// Totals of one session window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerTotals {
    pub total_sales: Money,
    pub by_method: PaymentBreakdown,
    pub total_in: Money,
    pub total_out: Money,
    pub sale_count: usize,
}

impl LedgerTotals {
    /// Computes the totals from already-filtered sales and movements.
    pub fn compute(sales: &[Sale], movements: &[Movement]) -> Self {
        let by_method = PaymentBreakdown::from_sales(sales);

        let mut total_in = Money::zero();
        let mut total_out = Money::zero();
        for movement in movements {
            match movement.kind {
                MovementKind::In => total_in += movement.amount(),
                MovementKind::Out => total_out += movement.amount(),
            }
        }

        LedgerTotals {
            total_sales: by_method.total(),
            by_method,
            total_in,
            total_out,
            sale_count: sales
                .iter()
                .filter(|s| s.status == SaleStatus::Finalized)
                .count(),
        }
    }

    /// Expected cash in the drawer: `cash + in − out`.
    pub fn physical_balance(&self) -> Money {
        self.by_method.cash + self.total_in - self.total_out
    }

    /// Value recorded on close: `total_sales + in − out`.
    pub fn closing_amount(&self) -> Money {
        self.total_sales + self.total_in - self.total_out
    }
}

// =============================================================================
// Session Summary
// =============================================================================

/// The running summary shown on the register screen.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionSummary {
    pub session: CashSession,
    pub totals: LedgerTotals,
    pub physical_balance: Money,
    pub closing_amount: Money,
    pub movements: Vec<Movement>,
}

impl SessionSummary {
    pub fn new(session: CashSession, sales: &[Sale], movements: Vec<Movement>) -> Self {
        let totals = LedgerTotals::compute(sales, &movements);
        SessionSummary {
            session,
            physical_balance: totals.physical_balance(),
            closing_amount: totals.closing_amount(),
            totals,
            movements,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
