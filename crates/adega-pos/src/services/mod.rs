//! # Services
//!
//! One service per screen of the web frontend.
//!
//! ```text
//! ┌──────────────┬──────────────────────────────────────────────────────────┐
//! │ Screen       │ Service                                                  │
//! ├──────────────┼──────────────────────────────────────────────────────────┤
//! │ Caixa        │ LedgerService   open / summary / movements / close       │
//! │ Comandas     │ TabService      → TabSale   (SaleAggregator)             │
//! │ Caixa Rápido │ QuickSale       (SaleAggregator)                         │
//! │ Produtos     │ CatalogService                                           │
//! │ Vendas, Home │ ReportService                                            │
//! └──────────────┴──────────────────────────────────────────────────────────┘
//! ```

pub mod aggregator;
pub mod catalog;
pub mod ledger;
pub mod quick_sale;
pub mod reports;
pub mod tab;

pub use aggregator::{Receipt, SaleAggregator};
pub use catalog::CatalogService;
pub use ledger::LedgerService;
pub use quick_sale::QuickSale;
pub use reports::ReportService;
pub use tab::{TabSale, TabService};
