//! Catalog, purchases, reports, settings and session commands.

mod common;

use chrono::{Duration, Utc};

use kade_app::commands::billing::{add_to_bill, checkout, set_customer, set_payment_method};
use kade_app::commands::purchases::{list_purchases, record_purchase, PurchaseRequest};
use kade_app::commands::{catalog, reports, session, settings};
use kade_app::error::ErrorCode;
use kade_app::state::ConfigState;
use kade_core::{Money, PaymentMethod, PurchaseItem, ShopProfile};

fn line(product_id: &str, quantity: i64, unit_cost_cents: i64) -> PurchaseItem {
    PurchaseItem {
        product_id: product_id.to_string(),
        name: product_id.to_string(),
        quantity,
        unit_cost_cents,
    }
}

#[tokio::test]
async fn test_purchase_adds_stock() {
    let app = common::app().await;

    let request = PurchaseRequest {
        supplier: "  Lanka Paper ".into(),
        items: vec![line("ream", 10, 90000), line("pen", 20, 2500)],
        note: Some("   ".into()),
    };
    let purchase = record_purchase(&app.auth, &app.db, &app.views, request)
        .await
        .unwrap();

    assert!(!purchase.id.is_empty());
    assert_eq!(purchase.supplier, "Lanka Paper");
    assert_eq!(purchase.total_cost(), Money::from_major(9500));
    assert_eq!(purchase.note, None);

    assert_eq!(app.views.product("ream").unwrap().stock, 30);
    assert_eq!(app.views.product("pen").unwrap().stock, 23);
    assert_eq!(list_purchases(&app.auth, &app.views).unwrap().len(), 1);
}

#[tokio::test]
async fn test_purchase_of_unknown_product_writes_nothing() {
    let app = common::app().await;

    let request = PurchaseRequest {
        supplier: "Lanka Paper".into(),
        items: vec![line("ream", 10, 90000), line("ghost", 1, 100)],
        note: None,
    };
    let err = record_purchase(&app.auth, &app.db, &app.views, request)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    assert!(app.db.inner().purchases().list().await.unwrap().is_empty());
    let ream = app.db.inner().products().get_by_id("ream").await.unwrap().unwrap();
    assert_eq!(ream.stock, 20);
}

#[tokio::test]
async fn test_purchase_validation() {
    let app = common::app().await;

    let blank_supplier = PurchaseRequest {
        supplier: " ".into(),
        items: vec![line("ream", 1, 100)],
        note: None,
    };
    let err = record_purchase(&app.auth, &app.db, &app.views, blank_supplier)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let zero_quantity = PurchaseRequest {
        supplier: "Lanka Paper".into(),
        items: vec![line("ream", 0, 100)],
        note: None,
    };
    let err = record_purchase(&app.auth, &app.db, &app.views, zero_quantity)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn test_catalog_browsing() {
    let app = common::app().await;

    let tabs = catalog::list_categories(&app.auth, &app.views).unwrap();
    assert_eq!(tabs, vec!["All", "Paper", "Print", "Stationery"]);

    let print = catalog::list_products(&app.auth, &app.views, Some("Print".into()), None).unwrap();
    assert_eq!(print.len(), 1);
    assert_eq!(print[0].id, "copy");

    let found = catalog::list_products(&app.auth, &app.views, None, Some(" a4 ".into())).unwrap();
    assert_eq!(found.len(), 2);

    let low = catalog::list_low_stock(&app.auth, &app.views).unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].id, "pen");
}

#[tokio::test]
async fn test_save_product_creates_and_updates() {
    let app = common::app().await;

    let mut new = common::product("", "Spiral Binding", "Binding", 25000, 40);
    let created = catalog::save_product(&app.auth, &app.db, &app.views, new.clone())
        .await
        .unwrap();
    assert!(!created.id.is_empty());
    assert!(app.views.product(&created.id).is_some());

    new = created.clone();
    new.price_cents = 30000;
    catalog::save_product(&app.auth, &app.db, &app.views, new)
        .await
        .unwrap();
    assert_eq!(app.views.product(&created.id).unwrap().price_cents, 30000);

    let nameless = common::product("", "  ", "Binding", 100, 1);
    let err = catalog::save_product(&app.auth, &app.db, &app.views, nameless)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let missing = common::product("ghost", "Ghost", "Binding", 100, 1);
    let err = catalog::save_product(&app.auth, &app.db, &app.views, missing)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_cart_keeps_price_after_catalog_edit() {
    let app = common::app().await;
    add_to_bill(&app.auth, &app.views, &app.billing, "copy".into()).unwrap();

    let mut copy = app.views.product("copy").unwrap();
    copy.price_cents = 99900;
    catalog::save_product(&app.auth, &app.db, &app.views, copy)
        .await
        .unwrap();

    let sale = checkout(app.checkout_context()).await.unwrap();
    assert_eq!(sale.total(), Money::from_major(100));
}

#[tokio::test]
async fn test_sales_report() {
    let app = common::app().await;

    add_to_bill(&app.auth, &app.views, &app.billing, "copy".into()).unwrap();
    checkout(app.checkout_context()).await.unwrap();

    add_to_bill(&app.auth, &app.views, &app.billing, "ream".into()).unwrap();
    set_customer(&app.auth, &app.billing, "Jane".into(), "0711111111".into()).unwrap();
    set_payment_method(&app.auth, &app.billing, PaymentMethod::Credit).unwrap();
    checkout(app.checkout_context()).await.unwrap();

    let report = reports::sales_report(&app.auth, &app.views, None, None).unwrap();
    assert_eq!(report.range, None);
    assert_eq!(report.summary.sale_count, 2);
    assert_eq!(report.summary.paid_revenue(), Money::from_major(100));
    assert_eq!(report.summary.pending_credit(), Money::from_major(1800));
    assert_eq!(report.summary.revenue_for(PaymentMethod::Cash), Money::from_major(100));
    assert_eq!(report.low_stock.len(), 1);

    let today = Utc::now().date_naive();
    let report = reports::sales_report(&app.auth, &app.views, Some(today), None).unwrap();
    assert_eq!(report.summary.sale_count, 2);

    let last_week = today - Duration::days(7);
    let report = reports::sales_report(&app.auth, &app.views, Some(last_week), None).unwrap();
    assert_eq!(report.summary.sale_count, 0);

    let err = reports::sales_report(&app.auth, &app.views, Some(today), Some(last_week))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn test_profile_round_trip() {
    let app = common::app().await;

    let profile = settings::get_profile(&app.auth, &app.views).unwrap();
    assert_eq!(profile, ShopProfile::default());

    let updated = ShopProfile {
        name: "Kade Print Hub".into(),
        phone: "0112345678".into(),
        email: "hello@kade.lk".into(),
        ..ShopProfile::default()
    };
    settings::save_profile(&app.auth, &app.db, &app.views, updated.clone())
        .await
        .unwrap();
    assert_eq!(settings::get_profile(&app.auth, &app.views).unwrap(), updated);

    let bad_email = ShopProfile {
        email: "not-an-email".into(),
        ..updated.clone()
    };
    let err = settings::save_profile(&app.auth, &app.db, &app.views, bad_email)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert_eq!(settings::get_profile(&app.auth, &app.views).unwrap(), updated);
}

#[tokio::test]
async fn test_pin_login_and_config_hides_pin() {
    let config = ConfigState {
        pin: Some("2580".into()),
        ..ConfigState::default()
    };
    let (app, _) = common::locked_app(config, false).await;

    let err = session::login(&app.auth, &app.db, &app.views, "0000".into())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Locked);
    assert!(!app.views.is_loaded());

    session::login(&app.auth, &app.db, &app.views, " 2580 ".into())
        .await
        .unwrap();
    assert!(app.views.is_loaded());

    let shown = settings::get_config(&app.auth, &app.config).unwrap();
    assert_eq!(shown.pin, None);
    assert_eq!(app.config.pin.as_deref(), Some("2580"));

    session::logout(&app.auth);
    let err = settings::get_config(&app.auth, &app.config).unwrap_err();
    assert_eq!(err.code, ErrorCode::Locked);
}

#[tokio::test]
async fn test_refresh_picks_up_outside_writes() {
    let app = common::app().await;

    app.db
        .inner()
        .products()
        .insert(&common::product("tape", "Cello Tape", "Stationery", 8000, 12))
        .await
        .unwrap();
    assert!(app.views.product("tape").is_none());

    let summary = session::refresh(&app.auth, &app.db, &app.views).await.unwrap();
    assert_eq!(summary.product_count, 4);
    assert_eq!(summary.sale_count, 0);
    assert!(app.views.product("tape").is_some());

    app.db.inner().close().await;
    let err = session::refresh(&app.auth, &app.db, &app.views).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::DatabaseError);
    assert!(app.views.product("tape").is_some());
}
