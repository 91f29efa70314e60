//! Billing screen end to end: building a bill, totals, and checkout with
//! its failure paths.

mod common;

use kade_app::commands::billing::{
    add_manual_item, add_to_bill, change_quantity, checkout, clear_bill, get_bill,
    remove_from_bill, set_customer, set_discount, set_paid_amount, set_payment_method,
    set_quantity, set_tax_percent,
};
use kade_app::error::ErrorCode;
use kade_app::state::ConfigState;
use kade_core::{Money, PaymentMethod, PaymentStatus, WALK_IN_CUSTOMER};

#[tokio::test]
async fn test_totals_discount_and_change() {
    let app = common::app().await;

    add_to_bill(&app.auth, &app.views, &app.billing, "copy".into()).unwrap();
    add_to_bill(&app.auth, &app.views, &app.billing, "copy".into()).unwrap();
    let bill = add_to_bill(&app.auth, &app.views, &app.billing, "pen".into()).unwrap();

    assert_eq!(bill.cart.line_count(), 2);
    assert_eq!(bill.cart.get("copy").unwrap().quantity, 2);
    assert_eq!(bill.totals.subtotal(), Money::from_major(250));
    assert_eq!(bill.totals.total(), Money::from_major(250));

    let bill = set_discount(&app.auth, &app.billing, "20".into()).unwrap();
    assert_eq!(bill.totals.total(), Money::from_major(230));

    let bill = set_paid_amount(&app.auth, &app.billing, "250".into()).unwrap();
    assert_eq!(bill.totals.change(), Money::from_major(20));

    let bill = set_paid_amount(&app.auth, &app.billing, "200".into()).unwrap();
    assert_eq!(bill.totals.change(), Money::from_major(-30));
    assert!(bill.totals.is_underpaid());
}

#[tokio::test]
async fn test_tax_percent_applies_to_subtotal() {
    let app = common::app().await;

    add_to_bill(&app.auth, &app.views, &app.billing, "copy".into()).unwrap();
    let bill = set_tax_percent(&app.auth, &app.billing, "10".into()).unwrap();

    assert_eq!(bill.totals.tax(), Money::from_major(10));
    assert_eq!(bill.totals.total(), Money::from_major(110));
}

#[tokio::test]
async fn test_tax_percent_out_of_range_is_rejected() {
    let app = common::app().await;
    add_to_bill(&app.auth, &app.views, &app.billing, "copy".into()).unwrap();
    set_tax_percent(&app.auth, &app.billing, "10".into()).unwrap();

    for bad in ["1e9", "150", "-5"] {
        let err = set_tax_percent(&app.auth, &app.billing, bad.into()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    let bill = get_bill(&app.auth, &app.billing).unwrap();
    assert_eq!(bill.tax_percent, "10");
    assert_eq!(bill.totals.tax(), Money::from_major(10));
}

#[tokio::test]
async fn test_oversized_counter_input_is_contained() {
    let app = common::app().await;
    let bill = add_to_bill(&app.auth, &app.views, &app.billing, "copy".into()).unwrap();
    assert_eq!(bill.cart.line_count(), 1);

    let bill = set_quantity(
        &app.auth,
        &app.billing,
        "copy".into(),
        "9223372036854775807".into(),
    )
    .unwrap();
    assert_eq!(bill.cart.get("copy").unwrap().quantity, kade_core::MAX_ITEM_QUANTITY);
    assert_eq!(bill.totals.subtotal(), Money::from_major(100 * 9999));

    let bill = set_discount(&app.auth, &app.billing, "92233720368547758.99".into()).unwrap();
    assert_eq!(bill.totals.discount(), Money::zero());

    let bill =
        set_paid_amount(&app.auth, &app.billing, "-92233720368547758".into()).unwrap();
    assert_eq!(bill.totals.change(), Money::zero());

    let bill = add_manual_item(
        &app.auth,
        &app.billing,
        "Binding".into(),
        "99999999999999999999".into(),
        "1".into(),
    )
    .unwrap();
    assert_eq!(bill.cart.line_count(), 1);
}

#[tokio::test]
async fn test_manual_item() {
    let app = common::app().await;

    let bill = add_manual_item(
        &app.auth,
        &app.billing,
        "Lamination".into(),
        "150".into(),
        "3".into(),
    )
    .unwrap();

    assert_eq!(bill.cart.line_count(), 1);
    let line = &bill.cart.items()[0];
    assert_eq!(line.name, "Lamination");
    assert_eq!(line.price(), Money::from_major(150));
    assert_eq!(line.quantity, 3);
    assert_eq!(line.line_total(), Money::from_major(450));
    assert!(line.is_manual());

    let bill = add_manual_item(&app.auth, &app.billing, "".into(), "150".into(), "1".into())
        .unwrap();
    assert_eq!(bill.cart.line_count(), 1);

    let bill = add_manual_item(&app.auth, &app.billing, "Binding".into(), "x".into(), "1".into())
        .unwrap();
    assert_eq!(bill.cart.line_count(), 1);

    let bill = add_manual_item(&app.auth, &app.billing, "Binding".into(), "250".into(), "".into())
        .unwrap();
    assert_eq!(bill.cart.line_count(), 2);
    assert_eq!(bill.cart.items()[1].quantity, 1);
}

#[tokio::test]
async fn test_quantity_controls_and_remove() {
    let app = common::app().await;
    add_to_bill(&app.auth, &app.views, &app.billing, "ream".into()).unwrap();

    let bill = change_quantity(&app.auth, &app.billing, "ream".into(), -5).unwrap();
    assert_eq!(bill.cart.get("ream").unwrap().quantity, 1);

    let bill = set_quantity(&app.auth, &app.billing, "ream".into(), "".into()).unwrap();
    assert_eq!(bill.cart.get("ream").unwrap().quantity, 0);

    let bill = set_quantity(&app.auth, &app.billing, "ream".into(), "4".into()).unwrap();
    assert_eq!(bill.cart.get("ream").unwrap().quantity, 4);

    let bill = remove_from_bill(&app.auth, &app.billing, "ream".into()).unwrap();
    assert!(bill.cart.get("ream").is_none());

    let err = change_quantity(&app.auth, &app.billing, "ream".into(), 1).unwrap_err();
    assert_eq!(err.code, ErrorCode::CartError);
}

#[tokio::test]
async fn test_unknown_product() {
    let app = common::app().await;
    let err = add_to_bill(&app.auth, &app.views, &app.billing, "nope".into()).unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_cash_checkout_records_sale_and_resets() {
    let app = common::app().await;

    add_to_bill(&app.auth, &app.views, &app.billing, "pen".into()).unwrap();
    set_discount(&app.auth, &app.billing, "5".into()).unwrap();
    set_payment_method(&app.auth, &app.billing, PaymentMethod::Card).unwrap();

    let sale = checkout(app.checkout_context()).await.unwrap();

    assert_eq!(sale.payment_method, PaymentMethod::Card);
    assert_eq!(sale.payment_status, PaymentStatus::Paid);
    assert_eq!(sale.customer_name, WALK_IN_CUSTOMER);
    assert_eq!(sale.customer_contact, None);
    assert_eq!(sale.total(), Money::from_major(45));

    let bill = get_bill(&app.auth, &app.billing).unwrap();
    assert!(bill.cart.is_empty());
    assert_eq!(bill.discount, "");
    assert_eq!(bill.payment_method, PaymentMethod::Cash);
    assert!(!bill.processing);

    let stored = app
        .db
        .inner()
        .sales()
        .get_by_id(&sale.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.items, sale.items);
    assert_eq!(stored.total_cents, sale.total_cents);
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
    assert_eq!(app.views.with_snapshot(|s| s.sales.len()), 1);
}

#[tokio::test]
async fn test_back_to_back_checkouts_get_distinct_ids() {
    let app = common::app().await;

    add_to_bill(&app.auth, &app.views, &app.billing, "copy".into()).unwrap();
    let first = checkout(app.checkout_context()).await.unwrap();
    add_to_bill(&app.auth, &app.views, &app.billing, "copy".into()).unwrap();
    let second = checkout(app.checkout_context()).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(app.db.inner().sales().count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_empty_cart_checkout_is_rejected() {
    let app = common::app().await;

    let err = checkout(app.checkout_context()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert_eq!(app.db.inner().sales().count().await.unwrap(), 0);
    assert!(!app.billing.is_processing());
}

#[tokio::test]
async fn test_credit_without_contact_keeps_bill() {
    let app = common::app().await;

    add_to_bill(&app.auth, &app.views, &app.billing, "ream".into()).unwrap();
    set_customer(&app.auth, &app.billing, "Jane".into(), "  ".into()).unwrap();
    set_payment_method(&app.auth, &app.billing, PaymentMethod::Credit).unwrap();

    let err = checkout(app.checkout_context()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert_eq!(
        err.message,
        "Customer Name and Contact are mandatory for Credit sales."
    );

    assert_eq!(app.db.inner().sales().count().await.unwrap(), 0);
    let bill = get_bill(&app.auth, &app.billing).unwrap();
    assert_eq!(bill.cart.line_count(), 1);
    assert_eq!(bill.customer.name, "Jane");
    assert_eq!(bill.payment_method, PaymentMethod::Credit);
}

#[tokio::test]
async fn test_credit_checkout_is_pending() {
    let app = common::app().await;

    add_to_bill(&app.auth, &app.views, &app.billing, "ream".into()).unwrap();
    set_customer(&app.auth, &app.billing, " Jane ".into(), "0711111111".into()).unwrap();
    set_payment_method(&app.auth, &app.billing, PaymentMethod::Credit).unwrap();

    let sale = checkout(app.checkout_context()).await.unwrap();
    assert_eq!(sale.payment_status, PaymentStatus::Pending);
    assert_eq!(sale.customer_name, "Jane");
    assert_eq!(sale.customer_contact.as_deref(), Some("0711111111"));
}

#[tokio::test]
async fn test_checkout_while_processing_is_busy() {
    let app = common::app().await;
    add_to_bill(&app.auth, &app.views, &app.billing, "copy".into()).unwrap();

    let guard = app.billing.begin_checkout().unwrap();
    let err = checkout(app.checkout_context()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Busy);

    // Edits made now would be wiped by the reset after the save.
    let err = add_to_bill(&app.auth, &app.views, &app.billing, "pen".into()).unwrap_err();
    assert_eq!(err.code, ErrorCode::Busy);
    let err = set_quantity(&app.auth, &app.billing, "copy".into(), "5".into()).unwrap_err();
    assert_eq!(err.code, ErrorCode::Busy);
    let err = clear_bill(&app.auth, &app.billing).unwrap_err();
    assert_eq!(err.code, ErrorCode::Busy);
    assert!(get_bill(&app.auth, &app.billing).unwrap().processing);
    drop(guard);

    assert_eq!(get_bill(&app.auth, &app.billing).unwrap().cart.line_count(), 1);
    assert!(checkout(app.checkout_context()).await.is_ok());
}

#[tokio::test]
async fn test_failed_save_keeps_bill_for_retry() {
    let app = common::app().await;
    add_to_bill(&app.auth, &app.views, &app.billing, "copy".into()).unwrap();
    set_customer(&app.auth, &app.billing, "Sam".into(), "".into()).unwrap();

    app.db.inner().close().await;

    let err = checkout(app.checkout_context()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::DatabaseError);

    let bill = get_bill(&app.auth, &app.billing).unwrap();
    assert_eq!(bill.cart.line_count(), 1);
    assert_eq!(bill.customer.name, "Sam");
    assert!(!bill.processing);
}

#[tokio::test]
async fn test_notification_link_opened_for_contact() {
    let config = ConfigState {
        notify_on_checkout: true,
        ..ConfigState::default()
    };
    let (app, opened) = common::app_with(config).await;

    add_to_bill(&app.auth, &app.views, &app.billing, "copy".into()).unwrap();
    set_customer(&app.auth, &app.billing, "Jane".into(), "0711111111".into()).unwrap();
    checkout(app.checkout_context()).await.unwrap();

    // Walk-in customer without a contact: nothing to open.
    add_to_bill(&app.auth, &app.views, &app.billing, "copy".into()).unwrap();
    checkout(app.checkout_context()).await.unwrap();

    let opened = opened.lock().unwrap();
    assert_eq!(opened.len(), 1);
    assert!(opened[0].starts_with("https://wa.me/94711111111?text="));
}

#[tokio::test]
async fn test_failed_launch_does_not_undo_sale() {
    let config = ConfigState {
        notify_on_checkout: true,
        ..ConfigState::default()
    };
    let (app, opened) = common::locked_app(config, true).await;
    app.auth.login("");
    kade_app::commands::session::refresh(&app.auth, &app.db, &app.views)
        .await
        .unwrap();

    add_to_bill(&app.auth, &app.views, &app.billing, "copy".into()).unwrap();
    set_customer(&app.auth, &app.billing, "Jane".into(), "0711111111".into()).unwrap();
    let sale = checkout(app.checkout_context()).await.unwrap();

    assert_eq!(opened.lock().unwrap().len(), 1);
    assert!(app.db.inner().sales().get_by_id(&sale.id).await.unwrap().is_some());
    assert!(get_bill(&app.auth, &app.billing).unwrap().cart.is_empty());
}

#[tokio::test]
async fn test_clear_bill_keeps_inputs() {
    let app = common::app().await;
    add_to_bill(&app.auth, &app.views, &app.billing, "copy".into()).unwrap();
    set_customer(&app.auth, &app.billing, "Jane".into(), "".into()).unwrap();

    let bill = clear_bill(&app.auth, &app.billing).unwrap();
    assert!(bill.cart.is_empty());
    assert_eq!(bill.customer.name, "Jane");
}

#[tokio::test]
async fn test_locked_session_refuses_commands() {
    let (app, _) = common::locked_app(ConfigState::default(), false).await;

    let err = get_bill(&app.auth, &app.billing).unwrap_err();
    assert_eq!(err.code, ErrorCode::Locked);

    let err = checkout(app.checkout_context()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Locked);
}
