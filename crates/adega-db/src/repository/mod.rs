//! # Repository Module
//!
//! Data access layer for Adega POS entities.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  adega-pos service                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Repository (THIS MODULE)                                               │
//! │  ├── ProductRepository      catalog CRUD                                │
//! │  ├── CategoryRepository     category list                               │
//! │  ├── ProfileRepository      operator display names                      │
//! │  ├── SaleRepository         tabs, line items, quick-sale checkout       │
//! │  ├── CashSessionRepository  open / summary / close                      │
//! │  ├── MovementRepository     manual cash in / out                        │
//! │  └── ReportRepository       read-only aggregates                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqlitePool ──► COMMIT ──► ChangeFeed                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Compound writes (stock + line item, session + movement) run in a single
//! transaction. Business checks inside a transaction return
//! `DbError::Rule(CoreError)` and roll everything back.

pub mod cash_session;
pub mod category;
pub mod movement;
pub mod product;
pub mod profile;
pub mod report;
pub mod sale;

use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

/// Current time at microsecond precision, the resolution stored on disk.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// New UUID v4 primary key.
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    use adega_core::{Product, ProductInput};

    use crate::{Database, DbConfig};

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn product(db: &Database, name: &str, price_cents: i64, stock: i64) -> Product {
        db.products()
            .create(&ProductInput {
                name: name.to_string(),
                category_id: None,
                cost_cents: price_cents / 2,
                price_cents,
                stock,
            })
            .await
            .unwrap()
    }
}
