//! # adega-pos: Service Layer for Adega POS
//!
//! What the web frontend calls. Owns startup (config, logging, database)
//! and hands out one service per screen.
//!
//! ## Module Organization
//! ```text
//! adega_pos/
//! ├── lib.rs          ◄─── You are here (Pos: startup + service access)
//! ├── config.rs       ◄─── AppConfig (TOML file + ADEGA_* env)
//! ├── telemetry.rs    ◄─── tracing subscriber
//! ├── context.rs      ◄─── OperatorContext (who is acting)
//! ├── error.rs        ◄─── PosError { code, message }
//! ├── watch.rs        ◄─── reload-on-change watchers
//! └── services/
//!     ├── ledger.rs      ◄─── cash sessions and movements
//!     ├── aggregator.rs  ◄─── SaleAggregator trait
//!     ├── quick_sale.rs  ◄─── in-memory cart, paid on the spot
//!     ├── tab.rs         ◄─── comandas
//!     ├── catalog.rs     ◄─── products and categories
//!     └── reports.rs     ◄─── sales report and dashboard
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. AppConfig::load()       defaults ← adega.toml ← ADEGA_* env         │
//! │  2. init_tracing()          EnvFilter (RUST_LOG wins)                   │
//! │  3. Database::new()         SQLite, WAL, migrations                     │
//! │  4. Pos { db, config }      services are cheap clones over the pool     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let pos = Pos::start(AppConfig::load(None)?).await?;
//! let ctx = OperatorContext::new("op-1");
//!
//! pos.ledger().open_session_text(&ctx, "100,00").await?;
//! let tab = pos.tabs().open_tab(&ctx, Some("Carlos"), Some(12)).await?;
//! tab.add_item(&product_id, 2).await?;
//! tab.finalize(&PaymentRequest::with_method(PaymentMethod::Pix)).await?;
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod services;
pub mod telemetry;
pub mod watch;

use adega_core::ledger::SessionSummary;
use adega_core::report::DashboardStats;
use adega_db::Database;
use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use tracing::info;

pub use config::{AppConfig, ConfigError};
pub use context::OperatorContext;
pub use error::{ErrorCode, PosError, PosResult};
pub use services::{
    CatalogService, LedgerService, QuickSale, Receipt, ReportService, SaleAggregator, TabSale,
    TabService,
};
pub use watch::{watch_reload, WatchHandle};

/// The running application: database plus configuration.
#[derive(Debug, Clone)]
pub struct Pos {
    db: Database,
    config: AppConfig,
}

impl Pos {
    /// Initializes logging, opens the database and runs migrations.
    pub async fn start(config: AppConfig) -> PosResult<Self> {
        telemetry::init_tracing(&config.log_filter);

        let db_config = config
            .db_config()
            .map_err(|e| PosError::internal(e.to_string()))?;
        info!(path = ?db_config.database_path, store = %config.store_name, "Starting Adega POS");

        let db = Database::new(db_config).await?;
        Ok(Pos::new(db, config))
    }

    /// Wraps an already-open database (tests, seeding).
    pub fn new(db: Database, config: AppConfig) -> Self {
        Pos { db, config }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn ledger(&self) -> LedgerService {
        LedgerService::new(self.db.clone())
    }

    pub fn tabs(&self) -> TabService {
        TabService::new(self.db.clone())
    }

    /// A fresh, empty quick-sale counter for `ctx`.
    pub fn quick_sale(&self, ctx: &OperatorContext) -> QuickSale {
        QuickSale::new(self.db.clone(), ctx.clone())
    }

    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.db.clone())
    }

    pub fn reports(&self) -> ReportService {
        ReportService::new(self.db.clone(), self.store_offset(), self.config.recent_sales)
    }

    /// Live register summary for `ctx`, reloaded on sales, movements and
    /// session changes.
    pub async fn watch_session_summary(
        &self,
        ctx: &OperatorContext,
    ) -> WatchHandle<SessionSummary> {
        let ledger = self.ledger();
        let ctx = ctx.clone();
        watch_reload(self.db.subscribe(), watch::SESSION_COLLECTIONS, move || {
            let ledger = ledger.clone();
            let ctx = ctx.clone();
            async move { ledger.load_summary(&ctx).await }
        })
        .await
    }

    /// Live dashboard for the local calendar `day`.
    pub async fn watch_dashboard(&self, day: NaiveDate) -> WatchHandle<DashboardStats> {
        let reports = self.reports();
        watch_reload(self.db.subscribe(), watch::DASHBOARD_COLLECTIONS, move || {
            let reports = reports.clone();
            async move { reports.dashboard(day).await }
        })
        .await
    }

    fn store_offset(&self) -> FixedOffset {
        // validate() rejects out-of-range offsets; hand-built configs fall
        // back to UTC.
        self.config.store_offset().unwrap_or_else(|| Utc.fix())
    }
}
