//! Tab (comanda) workflows against an in-memory database.

mod common;

use adega_core::tender::{settle, PaymentRequest};
use adega_core::{Money, PaymentMethod, SaleStatus};
use adega_pos::{ErrorCode, PosError, SaleAggregator};
use common::{held_in_open_tabs, open_register, operator, pos, product, stock_of};

#[tokio::test]
async fn stock_is_conserved_across_item_operations() {
    let pos = pos().await;
    let ctx = operator("op-1");
    let beer = product(&pos, "Heineken 600ml", 1200, 20).await;

    let tab_a = pos.tabs().open_tab(&ctx, Some("Carlos"), Some(1)).await.unwrap();
    let tab_b = pos.tabs().open_tab(&ctx, Some("Bia"), Some(2)).await.unwrap();

    let check = |label: &'static str| {
        let pos = pos.clone();
        let id = beer.id.clone();
        async move {
            let stock = stock_of(&pos, &id).await;
            let held = held_in_open_tabs(&pos, &id).await;
            assert_eq!(stock + held, 20, "after {label}");
        }
    };

    tab_a.add_item(&beer.id, 3).await.unwrap();
    check("add 3 to A").await;
    tab_b.increment(&beer.id).await.unwrap();
    check("increment B").await;
    tab_a.increment(&beer.id).await.unwrap();
    check("increment A").await;
    tab_a.decrement(&beer.id).await.unwrap();
    check("decrement A").await;
    tab_b.remove(&beer.id).await.unwrap();
    check("remove B").await;

    // rejected add leaves everything as it was
    let err = tab_b.add_item(&beer.id, 50).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);
    check("rejected add").await;

    tab_a.remove(&beer.id).await.unwrap();
    assert_eq!(stock_of(&pos, &beer.id).await, 20);
}

#[tokio::test]
async fn subtotals_use_the_price_frozen_on_first_add() {
    let pos = pos().await;
    let ctx = operator("op-1");
    let wine = product(&pos, "Vinho Tinto", 3990, 10).await;
    let tab = pos.tabs().open_tab(&ctx, None, Some(5)).await.unwrap();

    tab.add_item(&wine.id, 1).await.unwrap();

    let mut input = adega_core::ProductInput {
        name: wine.name.clone(),
        category_id: None,
        cost_cents: wine.cost_cents,
        price_cents: 4990,
        stock: stock_of(&pos, &wine.id).await,
    };
    pos.catalog().update_product(&wine.id, &input).await.unwrap();
    tab.increment(&wine.id).await.unwrap();

    let loaded = tab.load().await.unwrap();
    let line = &loaded.items[0];
    assert_eq!(line.unit_price_cents, 3990);
    assert_eq!(line.quantity, 2);
    assert_eq!(line.subtotal_cents, line.quantity * line.unit_price_cents);

    // a second product is priced at the current catalog price
    input.name = "Vinho Branco".into();
    input.price_cents = 3490;
    let white = pos.catalog().create_product(&input).await.unwrap();
    tab.add_item(&white.id, 1).await.unwrap();

    let loaded = tab.load().await.unwrap();
    for item in &loaded.items {
        assert_eq!(item.subtotal_cents, item.quantity * item.unit_price_cents);
    }
    let sum: i64 = loaded.items.iter().map(|i| i.subtotal_cents).sum();
    assert_eq!(loaded.sale.total_cents, sum);
    assert_eq!(tab.total().await.unwrap(), Money::from_cents(3990 * 2 + 3490));
}

#[tokio::test]
async fn sale_total_tracks_line_items() {
    let pos = pos().await;
    let ctx = operator("op-1");
    let beer = product(&pos, "Skol", 450, 50).await;
    let ice = product(&pos, "Gelo 5kg", 1500, 5).await;
    let tab = pos.tabs().open_tab(&ctx, None, None).await.unwrap();

    tab.add_item(&beer.id, 6).await.unwrap();
    tab.add_item(&ice.id, 1).await.unwrap();
    assert_eq!(tab.total().await.unwrap().cents(), 6 * 450 + 1500);

    tab.decrement(&beer.id).await.unwrap();
    assert_eq!(tab.total().await.unwrap().cents(), 5 * 450 + 1500);

    tab.remove(&ice.id).await.unwrap();
    assert_eq!(tab.total().await.unwrap().cents(), 5 * 450);
}

#[tokio::test]
async fn finalized_tab_rejects_changes() {
    let pos = pos().await;
    let ctx = operator("op-1");
    open_register(&pos, &ctx, 0).await;
    let beer = product(&pos, "Skol", 450, 10).await;
    let tab = pos.tabs().open_tab(&ctx, None, Some(3)).await.unwrap();
    tab.add_item(&beer.id, 2).await.unwrap();

    let receipt = tab
        .finalize(&PaymentRequest::with_method(PaymentMethod::DebitCard))
        .await
        .unwrap();
    assert_eq!(receipt.sale.sale.status, SaleStatus::Finalized);
    assert!(receipt.change().is_zero());

    for result in [
        tab.add_item(&beer.id, 1).await,
        tab.increment(&beer.id).await,
        tab.decrement(&beer.id).await,
        tab.remove(&beer.id).await,
    ] {
        assert_eq!(result.unwrap_err().code, ErrorCode::Conflict);
    }
    let again = tab
        .finalize(&PaymentRequest::with_method(PaymentMethod::Pix))
        .await
        .unwrap_err();
    assert_eq!(again.code, ErrorCode::Conflict);

    assert_eq!(stock_of(&pos, &beer.id).await, 8);
    assert!(pos.tabs().list_open_tabs().await.unwrap().is_empty());
}

#[tokio::test]
async fn cash_tender_below_total_changes_nothing() {
    let pos = pos().await;
    let ctx = operator("op-1");
    open_register(&pos, &ctx, 100).await;
    let whisky = product(&pos, "Whisky Red Label", 9990, 3).await;
    let tab = pos.tabs().open_tab(&ctx, Some("Rui"), Some(9)).await.unwrap();
    tab.add_item(&whisky.id, 1).await.unwrap();

    let err = tab
        .finalize(&PaymentRequest::cash(Money::from_cents(5000)))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let missing = tab
        .finalize(&PaymentRequest {
            method: Some(PaymentMethod::Cash),
            tendered: None,
        })
        .await
        .unwrap_err();
    assert_eq!(missing.code, ErrorCode::ValidationError);

    let no_method = tab.finalize(&PaymentRequest::default()).await.unwrap_err();
    assert_eq!(no_method.code, ErrorCode::ValidationError);

    let loaded = tab.load().await.unwrap();
    assert_eq!(loaded.sale.status, SaleStatus::Open);
    assert_eq!(loaded.sale.payment_method, None);
    assert_eq!(loaded.items.len(), 1);
    assert_eq!(stock_of(&pos, &whisky.id).await, 2);

    let receipt = tab
        .finalize(&PaymentRequest::cash(Money::from_cents(10000)))
        .await
        .unwrap();
    assert_eq!(receipt.change().cents(), 10);
}

#[tokio::test]
async fn finalize_requires_register_and_items() {
    let pos = pos().await;
    let ctx = operator("op-1");
    let beer = product(&pos, "Skol", 450, 10).await;
    let tab = pos.tabs().open_tab(&ctx, None, None).await.unwrap();
    tab.add_item(&beer.id, 1).await.unwrap();

    let pix = PaymentRequest::with_method(PaymentMethod::Pix);
    let closed = tab.finalize(&pix).await.unwrap_err();
    assert_eq!(closed.code, ErrorCode::Conflict);

    open_register(&pos, &ctx, 0).await;
    let empty = pos.tabs().open_tab(&ctx, None, None).await.unwrap();
    assert_eq!(empty.finalize(&pix).await.unwrap_err().code, ErrorCode::Conflict);

    // another operator with an open register may close the tab
    let other = operator("op-2");
    open_register(&pos, &other, 0).await;
    let receipt = pos.tabs().tab(&other, tab.sale_id()).finalize(&pix).await.unwrap();
    assert_eq!(receipt.sale.sale.operator_id, "op-2");
}

#[tokio::test]
async fn tab_paid_at_another_register_counts_in_that_drawer() {
    let pos = pos().await;
    let opener = operator("op-1");
    let cashier = operator("op-2");
    let beer = product(&pos, "Heineken 600ml", 1200, 10).await;

    let tab = pos.tabs().open_tab(&opener, Some("Carlos"), Some(3)).await.unwrap();
    tab.add_item(&beer.id, 1).await.unwrap();

    open_register(&pos, &cashier, 0).await;
    let receipt = pos
        .tabs()
        .tab(&cashier, tab.sale_id())
        .finalize(&PaymentRequest::cash(Money::from_cents(1200)))
        .await
        .unwrap();
    assert!(receipt.change().is_zero());

    let summary = pos.ledger().load_summary(&cashier).await.unwrap();
    assert_eq!(summary.totals.total_sales.cents(), 1200);
    assert_eq!(summary.totals.by_method.cash.cents(), 1200);
    assert_eq!(summary.physical_balance.cents(), 1200);
    assert_eq!(summary.totals.sale_count, 1);

    // the opener never had a register, so nothing is waiting for them
    assert_eq!(
        pos.ledger().load_summary(&opener).await.unwrap_err().code,
        ErrorCode::NotFound
    );
    open_register(&pos, &opener, 0).await;
    let later = pos.ledger().load_summary(&opener).await.unwrap();
    assert!(later.totals.total_sales.is_zero());
}

#[tokio::test]
async fn payment_against_a_stale_total_is_rejected() {
    let pos = pos().await;
    let ctx = operator("op-1");
    open_register(&pos, &ctx, 0).await;
    let beer = product(&pos, "Heineken 600ml", 1200, 10).await;
    let tab = pos.tabs().open_tab(&ctx, None, Some(8)).await.unwrap();
    tab.add_item(&beer.id, 1).await.unwrap();

    let total = tab.total().await.unwrap();
    let settlement = settle(total, &PaymentRequest::cash(Money::from_cents(1200))).unwrap();

    // a second counter adds to the same tab before the payment is written
    let other_counter = pos.tabs().tab(&operator("op-2"), tab.sale_id());
    other_counter.add_item(&beer.id, 2).await.unwrap();

    let err: PosError = pos
        .database()
        .sales()
        .finalize(tab.sale_id(), ctx.id(), &settlement)
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::Conflict);

    let loaded = tab.load().await.unwrap();
    assert_eq!(loaded.sale.status, SaleStatus::Open);
    assert_eq!(loaded.sale.total_cents, 3600);

    // the same tender now falls short of the new total
    let short = tab
        .finalize(&PaymentRequest::cash(Money::from_cents(1200)))
        .await
        .unwrap_err();
    assert_eq!(short.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn only_empty_tabs_can_be_cancelled() {
    let pos = pos().await;
    let ctx = operator("op-1");
    let beer = product(&pos, "Skol", 450, 10).await;

    let empty = pos.tabs().open_tab(&ctx, None, Some(1)).await.unwrap();
    pos.tabs().cancel_empty(empty.sale_id()).await.unwrap();
    let gone = pos.tabs().load_tab(empty.sale_id()).await.unwrap_err();
    assert_eq!(gone.code, ErrorCode::NotFound);

    let busy = pos.tabs().open_tab(&ctx, None, Some(2)).await.unwrap();
    busy.add_item(&beer.id, 1).await.unwrap();
    let err = pos.tabs().cancel_empty(busy.sale_id()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);
    assert_eq!(busy.load().await.unwrap().items.len(), 1);

    busy.remove(&beer.id).await.unwrap();
    pos.tabs().cancel_empty(busy.sale_id()).await.unwrap();
    assert!(pos.tabs().list_open_tabs().await.unwrap().is_empty());
    assert_eq!(stock_of(&pos, &beer.id).await, 10);
}

#[tokio::test]
async fn product_on_a_sale_cannot_be_deleted() {
    let pos = pos().await;
    let ctx = operator("op-1");
    let beer = product(&pos, "Skol", 450, 10).await;
    let tab = pos.tabs().open_tab(&ctx, None, None).await.unwrap();
    tab.add_item(&beer.id, 1).await.unwrap();

    let err = pos.catalog().delete_product(&beer.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);

    tab.remove(&beer.id).await.unwrap();
    pos.catalog().delete_product(&beer.id).await.unwrap();
    assert_eq!(
        pos.catalog().get_product(&beer.id).await.unwrap_err().code,
        ErrorCode::NotFound
    );
}
