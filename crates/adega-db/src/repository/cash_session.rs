//! # Cash Session Repository
//!
//! Opening, summarizing and closing an operator's register session.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  open(operator, amount)                    one transaction              │
//! │  ├── no other open session?  (else SessionAlreadyOpen)                  │
//! │  ├── INSERT cash_sessions (status open, opened_at = t)                  │
//! │  └── INSERT movements (in, "Abertura de caixa", amount, created_at = t) │
//! │                                                                         │
//! │  summary(operator)                         read snapshot                │
//! │  ├── finalized sales with updated_at ≥ opened_at                        │
//! │  └── movements with created_at ≥ opened_at                              │
//! │                                                                         │
//! │  close(operator, session)                  one transaction              │
//! │  ├── session open?  (else SessionClosed)                                │
//! │  ├── closing = total_sales + in − out  (computed inside the tx)         │
//! │  ├── INSERT movements (out, "Fechamento de caixa", closing)             │
//! │  └── UPDATE cash_sessions SET status closed, closing, closed_at         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use adega_core::ledger::{SessionSummary, CLOSING_DESCRIPTION, OPENING_DESCRIPTION};
use adega_core::validation::validate_opening_amount;
use adega_core::{CashSession, CoreError, Money, Movement, MovementKind, SessionStatus};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::movement::{insert_movement, movements_since};
use super::sale::finalized_sales_since;
use super::{new_id, now};
use crate::error::{DbError, DbResult};
use crate::events::{ChangeEvent, ChangeFeed, ChangeKind, Collection};

const SELECT_SESSION: &str = "SELECT id, operator_id, opening_cents, opened_at, status, \
     closing_cents, closed_at FROM cash_sessions";

#[derive(Debug, Clone)]
pub struct CashSessionRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl CashSessionRepository {
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        CashSessionRepository { pool, feed }
    }

    /// Opens a session and records the opening float as an `in` movement.
    pub async fn open(&self, operator_id: &str, opening: Money) -> DbResult<CashSession> {
        validate_opening_amount(opening).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        if fetch_open_session(&mut tx, operator_id).await?.is_some() {
            return Err(already_open(operator_id));
        }

        let opened_at = now();
        let session = CashSession {
            id: new_id(),
            operator_id: operator_id.to_string(),
            opening_cents: opening.cents(),
            opened_at,
            status: SessionStatus::Open,
            closing_cents: None,
            closed_at: None,
        };

        sqlx::query(
            "INSERT INTO cash_sessions (id, operator_id, opening_cents, opened_at, status) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&session.id)
        .bind(&session.operator_id)
        .bind(session.opening_cents)
        .bind(session.opened_at)
        .bind(session.status)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            // Lost a race against another open() for the same operator.
            DbError::UniqueViolation { .. } => already_open(operator_id),
            other => other,
        })?;

        let movement = Movement {
            id: new_id(),
            operator_id: operator_id.to_string(),
            kind: MovementKind::In,
            description: OPENING_DESCRIPTION.to_string(),
            amount_cents: opening.cents(),
            created_at: opened_at,
        };
        insert_movement(&mut tx, &movement).await?;

        tx.commit().await?;

        self.feed.publish([
            ChangeEvent::new(Collection::CashSessions, ChangeKind::Insert, &session.id),
            ChangeEvent::new(Collection::Movements, ChangeKind::Insert, &movement.id),
        ]);
        info!(
            session_id = %session.id,
            operator_id = %operator_id,
            opening = %opening,
            "Cash session opened"
        );
        Ok(session)
    }

    /// The operator's open session, if any.
    pub async fn current(&self, operator_id: &str) -> DbResult<Option<CashSession>> {
        let mut conn = self.pool.acquire().await?;
        fetch_open_session(&mut conn, operator_id).await
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<CashSession>> {
        let sql = format!("{SELECT_SESSION} WHERE id = ?1");
        let session = sqlx::query_as::<_, CashSession>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(session)
    }

    /// Number of open sessions across all operators.
    pub async fn count_open(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM cash_sessions WHERE status = 'open'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Running summary of the operator's open session.
    ///
    /// Reads inside one transaction so sales and movements come from the
    /// same snapshot.
    pub async fn summary(&self, operator_id: &str) -> DbResult<SessionSummary> {
        let mut tx = self.pool.begin().await?;
        let summary = load_summary(&mut tx, operator_id).await?;
        tx.commit().await?;

        debug!(
            session_id = %summary.session.id,
            total_sales = %summary.totals.total_sales,
            "Loaded session summary"
        );
        Ok(summary)
    }

    /// Closes the session, recording the closing amount as an `out` movement.
    pub async fn close(&self, operator_id: &str, session_id: &str) -> DbResult<CashSession> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("{SELECT_SESSION} WHERE id = ?1 AND operator_id = ?2");
        let session = sqlx::query_as::<_, CashSession>(&sql)
            .bind(session_id)
            .bind(operator_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::SessionNotFound(session_id.to_string()))?;

        if !session.is_open() {
            return Err(CoreError::SessionClosed {
                session_id: session_id.to_string(),
            }
            .into());
        }

        let sales = finalized_sales_since(&mut tx, operator_id, session.opened_at).await?;
        let movements = movements_since(&mut tx, operator_id, session.opened_at).await?;
        let summary = SessionSummary::new(session, &sales, movements);
        let closing = summary.closing_amount;

        let closed_at = now();
        let movement = Movement {
            id: new_id(),
            operator_id: operator_id.to_string(),
            kind: MovementKind::Out,
            description: CLOSING_DESCRIPTION.to_string(),
            amount_cents: closing.cents(),
            created_at: closed_at,
        };
        insert_movement(&mut tx, &movement).await?;

        let result = sqlx::query(
            "UPDATE cash_sessions SET status = 'closed', closing_cents = ?2, closed_at = ?3 \
             WHERE id = ?1 AND status = 'open'",
        )
        .bind(session_id)
        .bind(closing.cents())
        .bind(closed_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::SessionClosed {
                session_id: session_id.to_string(),
            }
            .into());
        }

        tx.commit().await?;

        self.feed.publish([
            ChangeEvent::new(Collection::Movements, ChangeKind::Insert, &movement.id),
            ChangeEvent::new(Collection::CashSessions, ChangeKind::Update, session_id),
        ]);
        info!(
            session_id = %session_id,
            operator_id = %operator_id,
            closing = %closing,
            "Cash session closed"
        );

        let mut closed = summary.session;
        closed.status = SessionStatus::Closed;
        closed.closing_cents = Some(closing.cents());
        closed.closed_at = Some(closed_at);
        Ok(closed)
    }
}

pub(crate) async fn fetch_open_session(
    conn: &mut SqliteConnection,
    operator_id: &str,
) -> DbResult<Option<CashSession>> {
    let sql = format!("{SELECT_SESSION} WHERE operator_id = ?1 AND status = 'open'");
    let session = sqlx::query_as::<_, CashSession>(&sql)
        .bind(operator_id)
        .fetch_optional(conn)
        .await?;
    Ok(session)
}

async fn load_summary(conn: &mut SqliteConnection, operator_id: &str) -> DbResult<SessionSummary> {
    let session = fetch_open_session(conn, operator_id)
        .await?
        .ok_or_else(|| CoreError::NoActiveSession {
            operator_id: operator_id.to_string(),
        })?;

    let sales = finalized_sales_since(conn, operator_id, session.opened_at).await?;
    let movements = movements_since(conn, operator_id, session.opened_at).await?;
    Ok(SessionSummary::new(session, &sales, movements))
}

fn already_open(operator_id: &str) -> DbError {
    CoreError::SessionAlreadyOpen {
        operator_id: operator_id.to_string(),
    }
    .into()
}
