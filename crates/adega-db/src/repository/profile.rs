//! Operator profile repository (display names for reports).

use adega_core::Profile;
use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::events::{ChangeEvent, ChangeFeed, ChangeKind, Collection};

#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        ProfileRepository { pool, feed }
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Profile>> {
        let profile =
            sqlx::query_as::<_, Profile>("SELECT id, display_name FROM profiles WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(profile)
    }

    /// Inserts or renames a profile.
    pub async fn upsert(&self, id: &str, display_name: &str) -> DbResult<Profile> {
        sqlx::query(
            "INSERT INTO profiles (id, display_name) VALUES (?1, ?2) \
             ON CONFLICT(id) DO UPDATE SET display_name = excluded.display_name",
        )
        .bind(id)
        .bind(display_name.trim())
        .execute(&self.pool)
        .await?;

        self.feed
            .publish([ChangeEvent::new(Collection::Profiles, ChangeKind::Update, id)]);
        Ok(Profile {
            id: id.to_string(),
            display_name: display_name.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::test_support::test_db;

    #[tokio::test]
    async fn test_upsert_renames() {
        let db = test_db().await;
        db.profiles().upsert("op-1", "Ana").await.unwrap();
        db.profiles().upsert("op-1", "Ana Paula").await.unwrap();

        let profile = db.profiles().get("op-1").await.unwrap().unwrap();
        assert_eq!(profile.display_name, "Ana Paula");
        assert!(db.profiles().get("op-2").await.unwrap().is_none());
    }
}
