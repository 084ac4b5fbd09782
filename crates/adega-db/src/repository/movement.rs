//! # Movement Repository
//!
//! Manual cash entries ("suprimento") and exits ("sangria").
//!
//! The opening and closing movements are written by
//! [`super::cash_session`] inside the session transactions.

use adega_core::validation::{validate_description, validate_movement_amount};
use adega_core::{CoreError, Money, Movement, MovementKind};
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use super::cash_session::fetch_open_session;
use super::{new_id, now};
use crate::error::DbResult;
use crate::events::{ChangeEvent, ChangeFeed, ChangeKind, Collection};

const SELECT_MOVEMENT: &str =
    "SELECT id, operator_id, kind, description, amount_cents, created_at FROM movements";

#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl MovementRepository {
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        MovementRepository { pool, feed }
    }

    /// Records a manual movement. The operator must have an open session.
    pub async fn record(
        &self,
        operator_id: &str,
        kind: MovementKind,
        description: &str,
        amount: Money,
    ) -> DbResult<Movement> {
        validate_description(description).map_err(CoreError::from)?;
        validate_movement_amount(amount).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        if fetch_open_session(&mut tx, operator_id).await?.is_none() {
            return Err(CoreError::SessionRequired {
                operator_id: operator_id.to_string(),
            }
            .into());
        }

        let movement = Movement {
            id: new_id(),
            operator_id: operator_id.to_string(),
            kind,
            description: description.trim().to_string(),
            amount_cents: amount.cents(),
            created_at: now(),
        };
        insert_movement(&mut tx, &movement).await?;

        tx.commit().await?;

        self.feed.publish([ChangeEvent::new(
            Collection::Movements,
            ChangeKind::Insert,
            &movement.id,
        )]);
        info!(
            operator_id = %operator_id,
            kind = ?kind,
            amount = %amount,
            "Cash movement recorded"
        );
        Ok(movement)
    }

    /// Movements of `operator_id` created at or after `since`, newest first.
    pub async fn list_since(
        &self,
        operator_id: &str,
        since: DateTime<Utc>,
    ) -> DbResult<Vec<Movement>> {
        let mut conn = self.pool.acquire().await?;
        movements_since(&mut conn, operator_id, since).await
    }
}

pub(crate) async fn insert_movement(
    conn: &mut SqliteConnection,
    movement: &Movement,
) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO movements (id, operator_id, kind, description, amount_cents, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(&movement.id)
    .bind(&movement.operator_id)
    .bind(movement.kind)
    .bind(&movement.description)
    .bind(movement.amount_cents)
    .bind(movement.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub(crate) async fn movements_since(
    conn: &mut SqliteConnection,
    operator_id: &str,
    since: DateTime<Utc>,
) -> DbResult<Vec<Movement>> {
    let sql = format!(
        "{SELECT_MOVEMENT} WHERE operator_id = ?1 AND created_at >= ?2 \
         ORDER BY created_at DESC, rowid DESC"
    );
    let movements = sqlx::query_as::<_, Movement>(&sql)
        .bind(operator_id)
        .bind(since)
        .fetch_all(conn)
        .await?;
    Ok(movements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::test_support::test_db;

    #[tokio::test]
    async fn test_record_requires_open_session() {
        let db = test_db().await;
        let err = db
            .movements()
            .record("op", MovementKind::Out, "Sangria", Money::from_cents(1000))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Rule(CoreError::SessionRequired { .. })
        ));
    }

    #[tokio::test]
    async fn test_record_validates() {
        let db = test_db().await;
        db.cash_sessions()
            .open("op", Money::from_cents(5000))
            .await
            .unwrap();

        let repo = db.movements();
        assert!(matches!(
            repo.record("op", MovementKind::Out, "", Money::from_cents(100)).await,
            Err(DbError::Rule(CoreError::Validation(_)))
        ));
        assert!(matches!(
            repo.record("op", MovementKind::In, "Troco", Money::zero()).await,
            Err(DbError::Rule(CoreError::Validation(_)))
        ));

        let m = repo
            .record("op", MovementKind::In, " Troco ", Money::from_cents(2000))
            .await
            .unwrap();
        assert_eq!(m.description, "Troco");

        let since = db.cash_sessions().current("op").await.unwrap().unwrap().opened_at;
        let listed = repo.list_since("op", since).await.unwrap();
        // opening movement + this one
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, m.id);
    }
}
