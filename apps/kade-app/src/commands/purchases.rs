//! # Purchase Commands
//!
//! Stock bought from suppliers. Recording a purchase raises product stock
//! in the same database transaction.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::commands::session::reload_views;
use crate::error::ApiError;
use crate::state::{AuthState, DbState, ViewsState};
use kade_core::validation::{validate_purchase_items, validate_supplier};
use kade_core::{Money, Purchase, PurchaseItem};

/// A purchase as entered on the purchases screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub supplier: String,
    pub items: Vec<PurchaseItem>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Every purchase, newest first.
pub fn list_purchases(auth: &AuthState, views: &ViewsState) -> Result<Vec<Purchase>, ApiError> {
    debug!("list_purchases command");
    auth.ensure_unlocked()?;

    Ok(views.with_snapshot(|s| s.purchases.clone()))
}

/// Records a purchase dated now.
///
/// ## Errors
/// - `VALIDATION_ERROR` for a blank supplier or bad lines
/// - `NOT_FOUND` when a line names an unknown product (nothing is written)
pub async fn record_purchase(
    auth: &AuthState,
    db: &DbState,
    views: &ViewsState,
    request: PurchaseRequest,
) -> Result<Purchase, ApiError> {
    debug!(
        supplier = %request.supplier,
        lines = request.items.len(),
        "record_purchase command"
    );
    auth.ensure_unlocked()?;

    validate_supplier(&request.supplier)?;
    validate_purchase_items(&request.items)?;

    let total: Money = request.items.iter().map(PurchaseItem::line_cost).sum();
    let note = request
        .note
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let purchase = Purchase {
        id: String::new(),
        date: Utc::now(),
        supplier: request.supplier.trim().to_string(),
        items: request.items,
        total_cost_cents: total.cents(),
        note,
    };

    let stored = db.inner().purchases().insert(&purchase).await?;

    info!(id = %stored.id, total = %stored.total_cost(), "Purchase saved");
    reload_views(db, views).await;
    Ok(stored)
}
