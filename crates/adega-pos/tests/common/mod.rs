//! Shared setup for the integration tests.

#![allow(dead_code)]

use adega_core::{Money, Product, ProductInput};
use adega_db::{Database, DbConfig};
use adega_pos::{AppConfig, OperatorContext, Pos};

pub async fn pos() -> Pos {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    Pos::new(db, AppConfig::default())
}

pub fn operator(id: &str) -> OperatorContext {
    OperatorContext::new(id)
}

pub async fn product(pos: &Pos, name: &str, price_cents: i64, stock: i64) -> Product {
    pos.catalog()
        .create_product(&ProductInput {
            name: name.to_string(),
            category_id: None,
            cost_cents: price_cents / 2,
            price_cents,
            stock,
        })
        .await
        .unwrap()
}

pub async fn stock_of(pos: &Pos, product_id: &str) -> i64 {
    pos.catalog().get_product(product_id).await.unwrap().stock
}

/// Σ quantities of `product_id` across every open tab.
pub async fn held_in_open_tabs(pos: &Pos, product_id: &str) -> i64 {
    let mut held = 0;
    for tab in pos.tabs().list_open_tabs().await.unwrap() {
        let loaded = pos.tabs().load_tab(&tab.id).await.unwrap();
        held += loaded
            .items
            .iter()
            .filter(|i| i.product_id == product_id)
            .map(|i| i.quantity)
            .sum::<i64>();
    }
    held
}

pub async fn open_register(pos: &Pos, ctx: &OperatorContext, reais: i64) {
    pos.ledger()
        .open_session(ctx, Money::from_cents(reais * 100))
        .await
        .unwrap();
}
