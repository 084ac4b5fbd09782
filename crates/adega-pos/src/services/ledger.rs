//! # Session Ledger
//!
//! The cash register screen ("Caixa"): open the drawer with a float,
//! watch the running totals, record cash in/out, close.
//!
//! ## Register Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌────────────┐   open_session(100,00)   ┌────────────┐                │
//! │   │   closed   │ ───────────────────────► │    open    │                │
//! │   │ (no row)   │                          │            │ ◄─┐            │
//! │   └────────────┘                          └─────┬──────┘   │            │
//! │                                                 │          │            │
//! │                          record_movement(out, "Sangria")   │            │
//! │                          load_summary()  ───────┼──────────┘            │
//! │                                                 │                       │
//! │                                  close_session()│                       │
//! │                                                 ▼                       │
//! │                                           ┌────────────┐                │
//! │                                           │   closed   │  terminal      │
//! │                                           └────────────┘                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use adega_core::ledger::SessionSummary;
use adega_core::validation::parse_amount;
use adega_core::{CashSession, Money, Movement, MovementKind};
use adega_db::Database;
use tracing::debug;

use crate::context::OperatorContext;
use crate::error::PosResult;

/// Cash session operations for one store.
#[derive(Debug, Clone)]
pub struct LedgerService {
    db: Database,
}

impl LedgerService {
    pub fn new(db: Database) -> Self {
        LedgerService { db }
    }

    /// Opens the operator's register with `opening` in the drawer.
    ///
    /// ## Errors
    /// - `ValidationError` for a negative amount
    /// - `Conflict` when the operator already has an open session
    pub async fn open_session(
        &self,
        ctx: &OperatorContext,
        opening: Money,
    ) -> PosResult<CashSession> {
        let session = self.db.cash_sessions().open(ctx.id(), opening).await?;
        Ok(session)
    }

    /// Same as [`open_session`](Self::open_session) with the amount as typed
    /// ("100,50", "R$ 100.50").
    pub async fn open_session_text(
        &self,
        ctx: &OperatorContext,
        opening: &str,
    ) -> PosResult<CashSession> {
        let amount = parse_amount("opening amount", opening)?;
        self.open_session(ctx, amount).await
    }

    /// The operator's open session, if any.
    pub async fn current_session(&self, ctx: &OperatorContext) -> PosResult<Option<CashSession>> {
        Ok(self.db.cash_sessions().current(ctx.id()).await?)
    }

    /// Running totals since the session opened.
    ///
    /// `NotFound` when the operator has no open session.
    pub async fn load_summary(&self, ctx: &OperatorContext) -> PosResult<SessionSummary> {
        let summary = self.db.cash_sessions().summary(ctx.id()).await?;
        debug!(
            operator_id = %ctx.id(),
            physical = %summary.physical_balance,
            "Session summary"
        );
        Ok(summary)
    }

    /// Closes the session, recording `total_sales + in − out` as the closing
    /// amount.
    pub async fn close_session(
        &self,
        ctx: &OperatorContext,
        session_id: &str,
    ) -> PosResult<CashSession> {
        Ok(self.db.cash_sessions().close(ctx.id(), session_id).await?)
    }

    /// Manual cash-in ("suprimento") or cash-out ("sangria").
    pub async fn record_movement(
        &self,
        ctx: &OperatorContext,
        kind: MovementKind,
        description: &str,
        amount: Money,
    ) -> PosResult<Movement> {
        let movement = self
            .db
            .movements()
            .record(ctx.id(), kind, description, amount)
            .await?;
        Ok(movement)
    }

    /// Text-amount variant of [`record_movement`](Self::record_movement).
    pub async fn record_movement_text(
        &self,
        ctx: &OperatorContext,
        kind: MovementKind,
        description: &str,
        amount: &str,
    ) -> PosResult<Movement> {
        let amount = parse_amount("amount", amount)?;
        self.record_movement(ctx, kind, description, amount).await
    }
}
