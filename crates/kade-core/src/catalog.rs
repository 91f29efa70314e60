//! # Catalog Browsing
//!
//! Category tabs, product search and the low-stock list. The catalog
//! itself belongs to inventory management; these helpers only read it.

use crate::types::Product;
use crate::ALL_CATEGORIES;

/// Category tabs: `"All"` first, then each distinct category in the order
/// it first appears.
///
/// ```rust
/// # use kade_core::catalog::categories;
/// assert_eq!(categories(&[]), vec!["All".to_string()]);
/// ```
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut tabs = vec![ALL_CATEGORIES.to_string()];
    for product in products {
        if !tabs.iter().any(|c| c == &product.category) {
            tabs.push(product.category.clone());
        }
    }
    tabs
}

/// Products in `category` (or every category for `"All"`) whose name
/// contains `search`, ignoring case.
pub fn filter_products<'a>(products: &'a [Product], category: &str, search: &str) -> Vec<&'a Product> {
    let needle = search.trim().to_lowercase();

    products
        .iter()
        .filter(|p| category == ALL_CATEGORIES || p.category == category)
        .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
        .collect()
}

/// Products at or below their reorder threshold.
pub fn low_stock(products: &[Product]) -> Vec<&Product> {
    products.iter().filter(|p| p.is_low_stock()).collect()
}
