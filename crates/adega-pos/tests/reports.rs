//! Reports, dashboard and live reload.

mod common;

use std::time::Duration;

use adega_core::tender::PaymentRequest;
use adega_core::{Money, MovementKind, PaymentMethod};
use adega_pos::{ErrorCode, SaleAggregator};
use chrono::Utc;
use common::{open_register, operator, pos, product};

#[tokio::test]
async fn sales_report_groups_by_method() {
    let pos = pos().await;
    let ana = operator("ana");
    pos.database().profiles().upsert("ana", "Ana").await.unwrap();
    open_register(&pos, &ana, 0).await;
    let beer = product(&pos, "Skol", 450, 100).await;

    for method in [PaymentMethod::Pix, PaymentMethod::Pix, PaymentMethod::CreditCard] {
        let counter = pos.quick_sale(&ana);
        counter.add_item(&beer.id, 2).await.unwrap();
        counter
            .finalize(&PaymentRequest::with_method(method))
            .await
            .unwrap();
    }

    let reports = pos.reports();
    let report = reports
        .sales_on_days(reports.today(), reports.today())
        .await
        .unwrap();
    assert_eq!(report.totals.count, 3);
    assert_eq!(report.totals.total.cents(), 3 * 900);
    assert_eq!(report.totals.by_method.pix.cents(), 1800);
    assert_eq!(report.totals.by_method.credit_card.cents(), 900);
    assert!(report.sales.iter().all(|s| s.operator_name.as_deref() == Some("Ana")));
    assert!(report.sales[0].sale.updated_at >= report.sales[2].sale.updated_at);

    let details = reports.sale_details(&report.sales[0].sale.id).await.unwrap();
    assert_eq!(details.items[0].product_name.as_deref(), Some("Skol"));

    let missing = reports.sale_details("missing").await.unwrap_err();
    assert_eq!(missing.code, ErrorCode::NotFound);

    let inverted = reports
        .sales_between(Utc::now(), Utc::now() - chrono::Duration::hours(1))
        .await
        .unwrap_err();
    assert_eq!(inverted.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn dashboard_counts() {
    let pos = pos().await;
    let ana = operator("ana");
    open_register(&pos, &ana, 0).await;
    let beer = product(&pos, "Skol", 450, 10).await;
    product(&pos, "Vinho", 2490, 4).await;

    let tab = pos.tabs().open_tab(&ana, None, Some(1)).await.unwrap();
    tab.add_item(&beer.id, 1).await.unwrap();

    let counter = pos.quick_sale(&ana);
    counter.add_item(&beer.id, 3).await.unwrap();
    counter
        .finalize(&PaymentRequest::cash(Money::from_cents(2000)))
        .await
        .unwrap();

    let reports = pos.reports();
    let stats = reports.dashboard(reports.today()).await.unwrap();
    assert_eq!(stats.counters.all_time_sales.cents(), 1350);
    assert_eq!(stats.counters.product_count, 2);
    assert_eq!(stats.counters.stock_units, 6 + 4);
    assert_eq!(stats.counters.open_tabs, 1);
    assert_eq!(stats.counters.open_sessions, 1);
    assert_eq!(stats.today.count, 1);
    assert_eq!(stats.today.by_method.cash.cents(), 1350);
    assert_eq!(stats.recent_sales.len(), 1);
}

#[tokio::test]
async fn session_summary_reloads_on_change() {
    let pos = pos().await;
    let ana = operator("ana");

    let mut summary = pos.watch_session_summary(&ana).await;
    assert_eq!(summary.current().unwrap_err().code, ErrorCode::NotFound);

    open_register(&pos, &ana, 100).await;
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            assert!(summary.changed().await);
            if summary.current().is_ok() {
                break;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(summary.current().unwrap().physical_balance.cents(), 10000);

    pos.ledger()
        .record_movement(&ana, MovementKind::Out, "Sangria", Money::from_cents(2500))
        .await
        .unwrap();
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            assert!(summary.changed().await);
            if summary.current().unwrap().totals.total_out.cents() == 2500 {
                break;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(summary.current().unwrap().physical_balance.cents(), 7500);
}
