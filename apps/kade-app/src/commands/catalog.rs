//! # Catalog Commands
//!
//! Product browsing for the billing screen, plus the inventory editor's
//! save.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  [All] [Print] [Finishing] [Paper] [Stationery]   🔍 "a4"     │
//! │                                                              │
//! │   list_categories()        list_products(category, search)  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info};

use crate::commands::session::reload_views;
use crate::error::ApiError;
use crate::state::{AuthState, DbState, ViewsState};
use kade_core::catalog::{categories, filter_products, low_stock};
use kade_core::validation::{
    validate_category, validate_price_cents, validate_product_name, validate_search_query,
};
use kade_core::{Product, ALL_CATEGORIES};

/// Products in a category (or `All`) whose name contains `search`.
pub fn list_products(
    auth: &AuthState,
    views: &ViewsState,
    category: Option<String>,
    search: Option<String>,
) -> Result<Vec<Product>, ApiError> {
    debug!(?category, ?search, "list_products command");
    auth.ensure_unlocked()?;

    let search = validate_search_query(search.as_deref().unwrap_or(""))?;
    let category = category.unwrap_or_else(|| ALL_CATEGORIES.to_string());

    Ok(views.with_snapshot(|s| {
        filter_products(&s.products, &category, &search)
            .into_iter()
            .cloned()
            .collect()
    }))
}

/// `All` followed by every category in catalog order.
pub fn list_categories(auth: &AuthState, views: &ViewsState) -> Result<Vec<String>, ApiError> {
    debug!("list_categories command");
    auth.ensure_unlocked()?;

    Ok(views.with_snapshot(|s| categories(&s.products)))
}

/// Products at or below their reorder level.
pub fn list_low_stock(auth: &AuthState, views: &ViewsState) -> Result<Vec<Product>, ApiError> {
    debug!("list_low_stock command");
    auth.ensure_unlocked()?;

    Ok(views.with_snapshot(|s| low_stock(&s.products).into_iter().cloned().collect()))
}

/// Creates a product (empty id) or updates an existing one.
pub async fn save_product(
    auth: &AuthState,
    db: &DbState,
    views: &ViewsState,
    product: Product,
) -> Result<Product, ApiError> {
    debug!(id = %product.id, "save_product command");
    auth.ensure_unlocked()?;

    validate_product_name(&product.name)?;
    validate_category(&product.category)?;
    validate_price_cents("price", product.price_cents)?;
    validate_price_cents("cost", product.cost_cents)?;

    let saved = if product.id.trim().is_empty() {
        db.inner().products().insert(&product).await?
    } else {
        db.inner().products().update(&product).await?;
        product
    };

    info!(id = %saved.id, name = %saved.name, "Product saved");
    reload_views(db, views).await;
    Ok(saved)
}
