//! # Credit Ledger Commands
//!
//! Who owes what, each customer's bills, and settling a bill.
//!
//! ## Settlement Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  list_credit_accounts ──► pick customer ──► customer_statement          │
//! │                                                   │                     │
//! │                                         pending bill selected           │
//! │                                                   │                     │
//! │                                   settlement_prompt(sale_id)            │
//! │                                   "Mark Bill #123456 as settled? ..."   │
//! │                                                   │ confirmed           │
//! │                                                   ▼                     │
//! │                                        settle_sale(sale_id)             │
//! │                                   Pending ──► Paid  (one way)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::commands::session::reload_views;
use crate::error::ApiError;
use crate::state::{AuthState, ConfigState, DbState, ViewsState};
use kade_core::ledger::{
    self, build_customer_aggregates, settle, total_outstanding, CustomerCreditAccount,
    CustomerKey, CustomerStatement, LedgerFilter,
};
use kade_core::Sale;

/// The ledger screen: accounts plus the header total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditLedgerResponse {
    pub accounts: Vec<CustomerCreditAccount>,
    /// Sum of the listed accounts' outstanding balances.
    pub total_outstanding_cents: i64,
}

/// Customer accounts, largest balance first.
pub fn list_credit_accounts(
    auth: &AuthState,
    views: &ViewsState,
    filter: LedgerFilter,
) -> Result<CreditLedgerResponse, ApiError> {
    debug!(
        search = %filter.search,
        include_settled = filter.include_settled,
        "list_credit_accounts command"
    );
    auth.ensure_unlocked()?;

    let accounts = views.with_snapshot(|s| build_customer_aggregates(&s.sales, &filter));
    let total_outstanding_cents = total_outstanding(&accounts).cents();

    Ok(CreditLedgerResponse {
        accounts,
        total_outstanding_cents,
    })
}

/// One customer's bills, newest first, with their balance.
pub fn customer_statement(
    auth: &AuthState,
    views: &ViewsState,
    name: String,
    contact: String,
) -> Result<CustomerStatement, ApiError> {
    debug!(name = %name, "customer_statement command");
    auth.ensure_unlocked()?;

    let key = CustomerKey::new(name, contact);
    Ok(views.with_snapshot(|s| ledger::customer_statement(&s.sales, &key)))
}

/// Confirmation text for settling `sale_id` under the configured mode.
pub fn settlement_prompt(
    auth: &AuthState,
    views: &ViewsState,
    config: &ConfigState,
    sale_id: String,
) -> Result<String, ApiError> {
    debug!(sale_id = %sale_id, "settlement_prompt command");
    auth.ensure_unlocked()?;

    views
        .with_snapshot(|s| {
            s.sales
                .iter()
                .find(|sale| sale.id == sale_id)
                .map(|sale| ledger::settlement_prompt(sale, config.settlement_mode))
        })
        .ok_or_else(|| ApiError::not_found("Sale", &sale_id))
}

/// Marks a pending credit bill as paid.
///
/// The stored record is the source of truth, so the sale is read from the
/// database rather than the views. In the default mode the bill is
/// renamed `settled-<id>` and recorded as cash.
///
/// ## Errors
/// - `NOT_FOUND` when no such sale exists (or it stopped being pending)
/// - `BUSINESS_LOGIC` when the sale is already paid
pub async fn settle_sale(
    auth: &AuthState,
    db: &DbState,
    views: &ViewsState,
    config: &ConfigState,
    sale_id: String,
) -> Result<Sale, ApiError> {
    debug!(sale_id = %sale_id, "settle_sale command");
    auth.ensure_unlocked()?;

    let sale = db
        .inner()
        .sales()
        .get_by_id(&sale_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", &sale_id))?;

    let settled = settle(&sale, config.settlement_mode)?;

    db.inner()
        .sales()
        .update(&sale.id, &settled)
        .await
        .map_err(|e| {
            error!(error = %e, sale_id = %sale.id, "Failed to settle sale");
            ApiError::from(e)
        })?;

    info!(
        sale_id = %sale.id,
        new_id = %settled.id,
        amount = %settled.total(),
        customer = %settled.customer_name,
        "Credit settled"
    );

    reload_views(db, views).await;
    Ok(settled)
}
