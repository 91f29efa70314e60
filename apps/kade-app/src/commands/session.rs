//! # Session Commands
//!
//! Login, logout and reloading the in-memory views.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::{ApiError, ErrorCode};
use crate::state::{AuthState, DbState, ViewsState};

/// What a reload brought in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSummary {
    pub product_count: usize,
    pub sale_count: usize,
    pub purchase_count: usize,
}

/// Unlocks the session and loads the views.
///
/// A failed load does not undo the login; the views stay as they were and
/// the failure is logged.
pub async fn login(
    auth: &AuthState,
    db: &DbState,
    views: &ViewsState,
    pin: String,
) -> Result<(), ApiError> {
    debug!("login command");

    if !auth.login(&pin) {
        return Err(ApiError::new(ErrorCode::Locked, "Incorrect PIN"));
    }

    reload_views(db, views).await;
    Ok(())
}

pub fn logout(auth: &AuthState) {
    debug!("logout command");
    auth.logout();
}

/// Reloads products, sales, purchases and the profile.
///
/// ## Errors
/// The read error, with the previous views left untouched.
pub async fn refresh(
    auth: &AuthState,
    db: &DbState,
    views: &ViewsState,
) -> Result<RefreshSummary, ApiError> {
    debug!("refresh command");
    auth.ensure_unlocked()?;

    let snapshot = db.inner().load_snapshot().await.map_err(|e| {
        error!(error = %e, "Failed to load local database");
        ApiError::from(e)
    })?;

    let summary = RefreshSummary {
        product_count: snapshot.products.len(),
        sale_count: snapshot.sales.len(),
        purchase_count: snapshot.purchases.len(),
    };
    views.replace(snapshot);

    info!(
        products = summary.product_count,
        sales = summary.sale_count,
        purchases = summary.purchase_count,
        "Views refreshed"
    );
    Ok(summary)
}

/// Reload after a write. Failures are logged only; the write already
/// happened and the next refresh will catch up.
pub(crate) async fn reload_views(db: &DbState, views: &ViewsState) -> bool {
    match db.inner().load_snapshot().await {
        Ok(snapshot) => {
            views.replace(snapshot);
            true
        }
        Err(e) => {
            error!(error = %e, "Failed to reload views");
            false
        }
    }
}
