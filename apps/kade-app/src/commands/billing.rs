//! # Billing Commands
//!
//! Assembling a bill and checking it out.
//!
//! ## Bill Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ Items on │────►│ Checkout │────►│  Sale    │       │
//! │  │  Bill    │     │  Bill    │     │ (BUSY    │     │ recorded │       │
//! │  └──────────┘     └──────────┘     │  guard)  │     └────┬─────┘       │
//! │       ▲                │           └──────────┘          │             │
//! │       │           add_to_bill                            │             │
//! │       │           add_manual_item                        │             │
//! │       │           change_quantity / set_quantity         │             │
//! │       │           remove_from_bill                       │             │
//! │       │           set_customer / set_payment_method      │             │
//! │       │           set_discount / set_tax_percent         │             │
//! │       │           set_paid_amount / set_notify           │             │
//! │       │                                                  │             │
//! │       └──────────── clear_bill ◄──── reset ◄─────────────┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::commands::session::reload_views;
use crate::error::ApiError;
use crate::state::{
    AuthState, BillingSession, BillingState, ConfigState, DbState, Launcher, ViewsState,
};
use kade_core::billing::{prepare_checkout, CustomerInfo, Totals};
use kade_core::cart::Cart;
use kade_core::notify::{compose_sale_message, whatsapp_link};
use kade_core::validation::parse_tax_percent;
use kade_core::{PaymentMethod, Sale};

/// The bill as the billing screen shows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillResponse {
    pub cart: Cart,
    pub customer: CustomerInfo,
    pub payment_method: PaymentMethod,
    pub discount: String,
    pub tax_percent: String,
    pub paid_amount: String,
    pub notify: bool,
    pub totals: Totals,
    pub processing: bool,
}

impl BillResponse {
    fn new(session: &BillingSession, processing: bool) -> Self {
        BillResponse {
            cart: session.cart.clone(),
            customer: session.customer.clone(),
            payment_method: session.payment_method,
            discount: session.discount.clone(),
            tax_percent: session.tax_percent.clone(),
            paid_amount: session.paid_amount.clone(),
            notify: session.notify,
            totals: session.totals(),
            processing,
        }
    }
}

fn bill(billing: &BillingState) -> BillResponse {
    let processing = billing.is_processing();
    billing.with_session(|s| BillResponse::new(s, processing))
}

/// Edits the session and returns the updated bill. BUSY during checkout.
fn edit<F>(auth: &AuthState, billing: &BillingState, f: F) -> Result<BillResponse, ApiError>
where
    F: FnOnce(&mut BillingSession),
{
    auth.ensure_unlocked()?;
    billing.edit_session(f)?;
    Ok(bill(billing))
}

/// Gets the current bill with its totals.
pub fn get_bill(auth: &AuthState, billing: &BillingState) -> Result<BillResponse, ApiError> {
    debug!("get_bill command");
    auth.ensure_unlocked()?;
    Ok(bill(billing))
}

/// Adds one unit of a catalog product.
///
/// The product is copied as it is right now; later price edits do not
/// reach this bill.
pub fn add_to_bill(
    auth: &AuthState,
    views: &ViewsState,
    billing: &BillingState,
    product_id: String,
) -> Result<BillResponse, ApiError> {
    debug!(product_id = %product_id, "add_to_bill command");
    auth.ensure_unlocked()?;

    let product = views
        .product(&product_id)
        .ok_or_else(|| ApiError::not_found("Product", &product_id))?;

    billing.edit_session(|s| s.cart.add_catalog_item(&product))?;
    Ok(bill(billing))
}

/// Adds a counter-typed item.
///
/// ## Behavior
/// - Blank name or unparsable price: nothing is added
/// - Unparsable, zero or negative quantity: 1
pub fn add_manual_item(
    auth: &AuthState,
    billing: &BillingState,
    name: String,
    price: String,
    quantity: String,
) -> Result<BillResponse, ApiError> {
    debug!(name = %name, price = %price, quantity = %quantity, "add_manual_item command");

    let now = billing.next_timestamp();
    edit(auth, billing, |s| {
        if s.cart
            .add_manual_item(&name, &price, &quantity, now)
            .is_none()
        {
            debug!("Manual item ignored: blank name or bad price");
        }
    })
}

/// Steps a line by `delta` (the +/- buttons). Never goes below 1.
pub fn change_quantity(
    auth: &AuthState,
    billing: &BillingState,
    item_id: String,
    delta: i64,
) -> Result<BillResponse, ApiError> {
    debug!(item_id = %item_id, delta, "change_quantity command");
    auth.ensure_unlocked()?;

    billing.edit_session(|s| s.cart.update_quantity(&item_id, delta))??;
    Ok(bill(billing))
}

/// Sets a line's quantity from the text box.
pub fn set_quantity(
    auth: &AuthState,
    billing: &BillingState,
    item_id: String,
    raw: String,
) -> Result<BillResponse, ApiError> {
    debug!(item_id = %item_id, raw = %raw, "set_quantity command");
    auth.ensure_unlocked()?;

    billing.edit_session(|s| s.cart.set_quantity(&item_id, &raw))??;
    Ok(bill(billing))
}

pub fn remove_from_bill(
    auth: &AuthState,
    billing: &BillingState,
    item_id: String,
) -> Result<BillResponse, ApiError> {
    debug!(item_id = %item_id, "remove_from_bill command");
    edit(auth, billing, |s| {
        s.cart.remove_item(&item_id);
    })
}

/// Empties the cart. Customer and payment inputs are kept.
pub fn clear_bill(auth: &AuthState, billing: &BillingState) -> Result<BillResponse, ApiError> {
    debug!("clear_bill command");
    edit(auth, billing, |s| s.cart.clear())
}

pub fn set_customer(
    auth: &AuthState,
    billing: &BillingState,
    name: String,
    contact: String,
) -> Result<BillResponse, ApiError> {
    debug!("set_customer command");
    edit(auth, billing, |s| s.customer = CustomerInfo::new(name, contact))
}

pub fn set_payment_method(
    auth: &AuthState,
    billing: &BillingState,
    method: PaymentMethod,
) -> Result<BillResponse, ApiError> {
    debug!(%method, "set_payment_method command");
    edit(auth, billing, |s| s.payment_method = method)
}

pub fn set_discount(
    auth: &AuthState,
    billing: &BillingState,
    discount: String,
) -> Result<BillResponse, ApiError> {
    debug!(discount = %discount, "set_discount command");
    edit(auth, billing, |s| s.discount = discount)
}

pub fn set_tax_percent(
    auth: &AuthState,
    billing: &BillingState,
    tax_percent: String,
) -> Result<BillResponse, ApiError> {
    debug!(tax_percent = %tax_percent, "set_tax_percent command");
    auth.ensure_unlocked()?;
    parse_tax_percent(&tax_percent)?;
    edit(auth, billing, |s| s.tax_percent = tax_percent)
}

pub fn set_paid_amount(
    auth: &AuthState,
    billing: &BillingState,
    paid_amount: String,
) -> Result<BillResponse, ApiError> {
    debug!(paid_amount = %paid_amount, "set_paid_amount command");
    edit(auth, billing, |s| s.paid_amount = paid_amount)
}

/// Toggles "send bill to customer" for this checkout.
pub fn set_notify(
    auth: &AuthState,
    billing: &BillingState,
    notify: bool,
) -> Result<BillResponse, ApiError> {
    debug!(notify, "set_notify command");
    edit(auth, billing, |s| s.notify = notify)
}

/// Everything checkout needs beyond the bill itself.
pub struct CheckoutContext<'a> {
    pub auth: &'a AuthState,
    pub db: &'a DbState,
    pub views: &'a ViewsState,
    pub billing: &'a BillingState,
    pub config: &'a ConfigState,
    pub launcher: &'a dyn Launcher,
}

/// Records the bill as a sale.
///
/// ## Flow
/// ```text
/// begin_checkout ──► prepare_checkout ──► sales().save ──► reset bill
///       │                   │                  │               │
///     BUSY           VALIDATION_ERROR    DATABASE_ERROR   notify (best effort)
///                   (bill untouched)    (bill untouched)  reload views
/// ```
///
/// ## Returns
/// The recorded sale.
pub async fn checkout(ctx: CheckoutContext<'_>) -> Result<Sale, ApiError> {
    debug!("checkout command");
    ctx.auth.ensure_unlocked()?;

    let _guard = ctx.billing.begin_checkout()?;

    let now = ctx.billing.next_timestamp();
    let (sale, notify) = ctx.billing.with_session(|s| {
        prepare_checkout(&s.cart, &s.customer, s.payment_method, &s.totals(), now)
        .map(|sale| (sale, s.notify))
    })?;

    ctx.db.inner().sales().save(&sale).await.map_err(|e| {
        error!(error = %e, sale_id = %sale.id, "Failed to save sale");
        ApiError::from(e)
    })?;

    ctx.billing.reset();

    info!(
        sale_id = %sale.id,
        total = %sale.total(),
        method = %sale.payment_method,
        status = %sale.payment_status,
        "Sale completed"
    );

    if notify {
        send_notification(ctx.views, ctx.config, ctx.launcher, &sale);
    }

    reload_views(ctx.db, ctx.views).await;
    Ok(sale)
}

fn send_notification(
    views: &ViewsState,
    config: &ConfigState,
    launcher: &dyn Launcher,
    sale: &Sale,
) {
    let Some(contact) = sale.customer_contact.as_deref() else {
        return;
    };

    let message = compose_sale_message(&views.profile(), sale);
    match whatsapp_link(contact, &message, &config.country_code) {
        Some(link) => {
            if let Err(e) = launcher.open(&link) {
                warn!(error = %e, sale_id = %sale.id, "Failed to open message link");
            }
        }
        None => warn!(contact = %contact, "Contact is not a dialable number"),
    }
}
