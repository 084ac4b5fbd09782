//! Category repository.

use adega_core::validation::validate_product_name;
use adega_core::{Category, CoreError};
use sqlx::SqlitePool;
use tracing::debug;

use super::new_id;
use crate::error::{DbError, DbResult};
use crate::events::{ChangeEvent, ChangeFeed, ChangeKind, Collection};

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        CategoryRepository { pool, feed }
    }

    /// All categories ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories ORDER BY name COLLATE NOCASE",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    pub async fn create(&self, name: &str) -> DbResult<Category> {
        validate_product_name(name).map_err(CoreError::from)?;

        let category = Category {
            id: new_id(),
            name: name.trim().to_string(),
        };
        debug!(id = %category.id, name = %category.name, "Creating category");

        sqlx::query("INSERT INTO categories (id, name) VALUES (?1, ?2)")
            .bind(&category.id)
            .bind(&category.name)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { .. } => DbError::duplicate("category", &category.name),
                other => other,
            })?;

        self.feed.publish([ChangeEvent::new(
            Collection::Categories,
            ChangeKind::Insert,
            &category.id,
        )]);
        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::test_db;

    #[tokio::test]
    async fn test_list_ordered_and_duplicate() {
        let db = test_db().await;
        let repo = db.categories();
        repo.create("Vinhos").await.unwrap();
        repo.create("Cervejas").await.unwrap();

        let names: Vec<_> = repo.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Cervejas", "Vinhos"]);

        assert!(repo.create("Vinhos").await.unwrap_err().is_unique_violation());
    }
}
