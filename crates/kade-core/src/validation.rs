//! # Validation Module
//!
//! Input validation utilities for Kade POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend                                                     │
//! │  └── Immediate feedback on empty fields                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: App command (Rust)                                           │
//! │  └── THIS MODULE: field rules for products, purchases, profile         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL / CHECK / foreign key constraints                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Checkout rules (empty cart, credit identity) live in
//! [`crate::billing`] because they are business rules, not field formats.

use crate::error::ValidationError;
use crate::money::MAX_AMOUNT_CENTS;
use crate::types::{PurchaseItem, ShopProfile, TaxRate};
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Example
/// ```rust
/// use kade_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Lamination A4").is_ok());
/// assert!(validate_product_name("  ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    required("name", name, 200)
}

/// Validates a product category.
pub fn validate_category(category: &str) -> ValidationResult<()> {
    required("category", category, 50)
}

/// Validates a supplier name on a purchase.
pub fn validate_supplier(supplier: &str) -> ValidationResult<()> {
    required("supplier", supplier, 200)
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns everything)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a stock quantity on a purchase line.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price or cost in cents.
///
/// ## Example
/// ```rust
/// use kade_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("price", 15000).is_ok());
/// assert!(validate_price_cents("price", 0).is_ok());
/// assert!(validate_price_cents("price", -100).is_err());
/// assert!(validate_price_cents("price", i64::MAX).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_AMOUNT_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

/// Reads the tax percentage typed on a bill.
///
/// Blank or non-numeric text reads as 0%. A number outside 0% to 100% is
/// rejected.
///
/// ## Example
/// ```rust
/// use kade_core::validation::parse_tax_percent;
///
/// assert_eq!(parse_tax_percent("12.5").unwrap().bps(), 1250);
/// assert!(parse_tax_percent("").unwrap().is_zero());
/// assert!(parse_tax_percent("1e9").is_err());
/// ```
pub fn parse_tax_percent(raw: &str) -> ValidationResult<TaxRate> {
    let Ok(pct) = raw.trim().parse::<f64>() else {
        return Ok(TaxRate::zero());
    };

    if !pct.is_finite() || pct < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    let rate = TaxRate::from_percentage(pct);
    validate_tax_rate_bps(rate.bps())?;
    Ok(rate)
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates every line of a purchase.
pub fn validate_purchase_items(items: &[PurchaseItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "purchase items".to_string(),
        });
    }

    for item in items {
        required("product", &item.product_id, 64)?;
        validate_quantity(item.quantity)?;
        validate_price_cents("unit cost", item.unit_cost_cents)?;
    }

    Ok(())
}

/// Validates the shop profile before saving.
///
/// ## Rules
/// - Name is required
/// - Email, when given, must contain `@`
pub fn validate_shop_profile(profile: &ShopProfile) -> ValidationResult<()> {
    required("shop name", &profile.name, 100)?;

    let email = profile.email.trim();
    if !email.is_empty() && !email.contains('@') {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must contain @".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
