//! # adega-db: Database Layer for Adega POS
//!
//! Every read and write the POS makes goes through this crate: SQLite via
//! sqlx, one repository per collection, and a change feed that fires after
//! each committed write.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Adega POS Data Flow                              │
//! │                                                                         │
//! │  adega-pos service (finalize_tab)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     adega-db (THIS CRATE)                       │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐    │    │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │    │    │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │    │    │
//! │  │   │               │    │ SaleRepo      │    │              │    │    │
//! │  │   │ SqlitePool    │◄───│ CashSession   │    │ 0001_initial │    │    │
//! │  │   │ ChangeFeed    │    │ Movement ...  │    │              │    │    │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘    │    │
//! │  └───────────┼─────────────────────────────────────────────────────┘    │
//! │              │ broadcast after COMMIT                                   │
//! │              ▼                                                          │
//! │  watchers in adega-pos reload their screen                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`events`] - Change notifications
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use adega_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("adega.db")).await?;
//! let session = db.cash_sessions().open("op-1", Money::from_cents(10000)).await?;
//! let tab = db.sales().open_tab("op-1", Some("Carlos"), Some(12)).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod events;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use events::{ChangeEvent, ChangeFeed, ChangeKind, Collection};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::cash_session::CashSessionRepository;
pub use repository::category::CategoryRepository;
pub use repository::movement::MovementRepository;
pub use repository::product::ProductRepository;
pub use repository::profile::ProfileRepository;
pub use repository::report::ReportRepository;
pub use repository::sale::SaleRepository;
