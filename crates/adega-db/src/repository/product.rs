//! # Product Repository
//!
//! Catalog CRUD. Every read joins the category name.
//!
//! Stock is never written here outside of create/update: sale operations
//! adjust it inside their own transactions (see [`super::sale`]).

use adega_core::catalog::validate_product;
use adega_core::{CoreError, Product, ProductInput, ValidationError};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::{new_id, now};
use crate::error::{DbError, DbResult};
use crate::events::{ChangeEvent, ChangeFeed, ChangeKind, Collection};

const SELECT_PRODUCT: &str = "SELECT p.id, p.name, p.category_id, c.name AS category_name, \
     p.cost_cents, p.price_cents, p.stock, p.created_at, p.updated_at \
     FROM products p LEFT JOIN categories c ON c.id = p.category_id";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let all = repo.list().await?;
/// let one = repo.get("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        ProductRepository { pool, feed }
    }

    /// All products ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!("{SELECT_PRODUCT} ORDER BY p.name COLLATE NOCASE, p.id");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_product(&mut conn, id).await
    }

    /// Creates a product after validating the form.
    pub async fn create(&self, input: &ProductInput) -> DbResult<Product> {
        validate_product(input).map_err(CoreError::from)?;

        let id = new_id();
        let now = now();

        debug!(id = %id, name = %input.name, "Creating product");

        sqlx::query(
            "INSERT INTO products (id, name, category_id, cost_cents, price_cents, stock, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        )
        .bind(&id)
        .bind(input.name.trim())
        .bind(&input.category_id)
        .bind(input.cost_cents)
        .bind(input.price_cents)
        .bind(input.stock)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| unknown_category(e.into()))?;

        self.feed
            .publish([ChangeEvent::new(Collection::Products, ChangeKind::Insert, &id)]);
        info!(id = %id, name = %input.name, "Product created");

        self.get(&id)
            .await?
            .ok_or_else(|| DbError::Internal("Failed to read back created product".into()))
    }

    /// Replaces every editable field of a product.
    pub async fn update(&self, id: &str, input: &ProductInput) -> DbResult<Product> {
        validate_product(input).map_err(CoreError::from)?;

        let result = sqlx::query(
            "UPDATE products SET name = ?2, category_id = ?3, cost_cents = ?4, price_cents = ?5, \
             stock = ?6, updated_at = ?7 WHERE id = ?1",
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.category_id)
        .bind(input.cost_cents)
        .bind(input.price_cents)
        .bind(input.stock)
        .bind(now())
        .execute(&self.pool)
        .await
        .map_err(|e| unknown_category(e.into()))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(id.to_string()).into());
        }

        self.feed
            .publish([ChangeEvent::new(Collection::Products, ChangeKind::Update, id)]);
        info!(id = %id, "Product updated");

        self.get(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
    }

    /// Deletes a product that no sale line references.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => {
                    DbError::Rule(CoreError::ProductInUse(id.to_string()))
                }
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(id.to_string()).into());
        }

        self.feed
            .publish([ChangeEvent::new(Collection::Products, ChangeKind::Delete, id)]);
        info!(id = %id, "Product deleted");
        Ok(())
    }

    /// Number of products and total units on hand.
    pub async fn stock_totals(&self) -> DbResult<(i64, i64)> {
        let row: (i64, i64) =
            sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(stock), 0) FROM products")
                .fetch_one(&self.pool)
                .await?;
        Ok(row)
    }
}

/// Loads one product on an existing connection or transaction.
pub(crate) async fn fetch_product(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Product>> {
    let sql = format!("{SELECT_PRODUCT} WHERE p.id = ?1");
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(product)
}

fn unknown_category(err: DbError) -> DbError {
    match err {
        DbError::ForeignKeyViolation { .. } => DbError::Rule(
            ValidationError::InvalidFormat {
                field: "category".to_string(),
                reason: "unknown category".to_string(),
            }
            .into(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{product, test_db};

    fn input(name: &str) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            category_id: None,
            cost_cents: 300,
            price_cents: 600,
            stock: 12,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_ordered() {
        let db = test_db().await;
        product(&db, "Vodka Smirnoff", 4990, 5).await;
        product(&db, "cerveja Brahma", 450, 48).await;

        let names: Vec<_> = db
            .products()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["cerveja Brahma", "Vodka Smirnoff"]);
    }

    #[tokio::test]
    async fn test_category_name_joined() {
        let db = test_db().await;
        let cat = db.categories().create("Cervejas").await.unwrap();

        let mut form = input("Heineken 600ml");
        form.category_id = Some(cat.id.clone());
        let created = db.products().create(&form).await.unwrap();

        assert_eq!(created.category_name.as_deref(), Some("Cervejas"));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid() {
        let db = test_db().await;
        let mut form = input("  ");
        assert!(matches!(
            db.products().create(&form).await,
            Err(DbError::Rule(CoreError::Validation(_)))
        ));

        form.name = "Gelo".into();
        form.category_id = Some("missing".into());
        assert!(matches!(
            db.products().create(&form).await,
            Err(DbError::Rule(CoreError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn test_update_and_missing() {
        let db = test_db().await;
        let p = product(&db, "Gelo 5kg", 1000, 10).await;

        let mut form = input("Gelo 10kg");
        form.price_cents = 1800;
        let updated = db.products().update(&p.id, &form).await.unwrap();
        assert_eq!(updated.name, "Gelo 10kg");
        assert_eq!(updated.price_cents, 1800);

        assert!(matches!(
            db.products().update("nope", &form).await,
            Err(DbError::Rule(CoreError::ProductNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        let p = product(&db, "Gelo 5kg", 1000, 10).await;

        db.products().delete(&p.id).await.unwrap();
        assert!(db.products().get(&p.id).await.unwrap().is_none());
        assert!(matches!(
            db.products().delete(&p.id).await,
            Err(DbError::Rule(CoreError::ProductNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_stock_totals() {
        let db = test_db().await;
        product(&db, "A", 100, 3).await;
        product(&db, "B", 100, 7).await;
        assert_eq!(db.products().stock_totals().await.unwrap(), (2, 10));
    }
}
