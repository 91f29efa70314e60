//! # Domain Types
//!
//! Core domain types used throughout Kade POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartItem     │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │──►│  product copy   │──►│  id (millis)    │       │
//! │  │  category       │   │  quantity       │   │  items[]        │       │
//! │  │  price / cost   │   └─────────────────┘   │  method/status  │       │
//! │  │  stock / min    │                         └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ PaymentMethod   │   │ PaymentStatus   │   │   Purchase      │       │
//! │  │  Cash  Card     │   │  Paid           │   │  supplier       │       │
//! │  │  Online Credit  │   │  Pending        │   │  lines[]        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `Sale` stores full `CartItem` copies, so later catalog edits never
//! rewrite history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// Category given to items typed in at the counter.
pub const MANUAL_CATEGORY: &str = "Manual";

/// Customer name recorded when the cashier leaves the field blank.
pub const WALK_IN_CUSTOMER: &str = "Walk-in Customer";

/// Prefix carried by the id of a credit sale after settlement as cash.
pub const SETTLED_PREFIX: &str = "settled-";

/// Number of trailing id characters shown as the invoice number.
pub const INVOICE_NUMBER_LEN: usize = 6;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1500 bps = 15%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage. Negative input clamps to zero.
    pub fn from_percentage(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return TaxRate::zero();
        }
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product. Owned by inventory management; billing only reads it.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Unit selling price in cents.
    pub price_cents: i64,
    /// Unit cost in cents (for profit reporting).
    pub cost_cents: i64,
    /// Units on hand.
    pub stock: i64,
    /// Reorder threshold.
    pub min_stock_level: i64,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// True when stock has fallen to or below the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock_level
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// A product snapshot plus a quantity.
///
/// Lives only for one checkout session; after checkout the same value is
/// frozen inside the `Sale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price_cents: i64,
    pub cost_cents: i64,
    pub stock: i64,
    pub min_stock_level: i64,
    pub quantity: i64,
}

impl CartItem {
    /// Copies the product at this moment with the given quantity.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartItem {
            id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            price_cents: product.price_cents,
            cost_cents: product.cost_cents,
            stock: product.stock,
            min_stock_level: product.min_stock_level,
            quantity,
        }
    }

    /// A counter-typed item: no cost, no stock, `Manual` category.
    pub fn manual(id: String, name: String, price: Money, quantity: i64) -> Self {
        CartItem {
            id,
            name,
            category: MANUAL_CATEGORY.to_string(),
            price_cents: price.cents(),
            cost_cents: 0,
            stock: 0,
            min_stock_level: 0,
            quantity,
        }
    }

    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.price().multiply_quantity(self.quantity)
    }

    /// Unit cost × quantity.
    pub fn line_cost(&self) -> Money {
        Money::from_cents(self.cost_cents).multiply_quantity(self.quantity)
    }

    pub fn is_manual(&self) -> bool {
        self.category == MANUAL_CATEGORY
    }
}

// =============================================================================
// Payment Method / Status
// =============================================================================

/// How the customer paid (or promised to pay).
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMethod {
    Cash,
    Card,
    Online,
    /// Goods leave now, money is collected later through the credit ledger.
    Credit,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Online,
        PaymentMethod::Credit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Online => "Online",
            PaymentMethod::Credit => "Credit",
        }
    }

    /// Status a freshly checked-out sale starts in.
    pub fn initial_status(&self) -> PaymentStatus {
        match self {
            PaymentMethod::Credit => PaymentStatus::Pending,
            _ => PaymentStatus::Paid,
        }
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "online" => Ok(PaymentMethod::Online),
            "credit" => Ok(PaymentMethod::Credit),
            other => Err(format!("unknown payment method: {}", other)),
        }
    }
}

/// Whether the sale's money has been collected.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentStatus {
    Paid,
    Pending,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Paid => f.write_str("Paid"),
            PaymentStatus::Pending => f.write_str("Pending"),
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale. Immutable except for settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    /// Millisecond timestamp at checkout; `settled-` prefixed after a
    /// cash settlement.
    pub id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub customer_name: String,
    pub customer_contact: Option<String>,
    pub items: Vec<CartItem>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub tax_rate_bps: u32,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }

    /// Contact as used by the ledger key: absent and empty are the same.
    pub fn contact_key(&self) -> &str {
        self.customer_contact.as_deref().unwrap_or("")
    }

    /// Human-readable invoice number: the last six characters of the id.
    ///
    /// ```rust
    /// # use kade_core::types::invoice_number;
    /// assert_eq!(invoice_number("1717000123456"), "123456");
    /// assert_eq!(invoice_number("42"), "42");
    /// ```
    pub fn invoice_number(&self) -> &str {
        invoice_number(&self.id)
    }

    /// True when the id carries the settlement tag.
    pub fn has_settled_tag(&self) -> bool {
        self.id.starts_with(SETTLED_PREFIX)
    }

    pub fn is_pending(&self) -> bool {
        self.payment_status == PaymentStatus::Pending
    }

    /// Sum of item quantities.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// Trailing characters of an id used for display.
pub fn invoice_number(id: &str) -> &str {
    let count = id.chars().count();
    if count <= INVOICE_NUMBER_LEN {
        return id;
    }
    let start = id
        .char_indices()
        .nth(count - INVOICE_NUMBER_LEN)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &id[start..]
}

// =============================================================================
// Purchase
// =============================================================================

/// A stock purchase from a supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Purchase {
    pub id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub supplier: String,
    pub items: Vec<PurchaseItem>,
    pub total_cost_cents: i64,
    pub note: Option<String>,
}

impl Purchase {
    #[inline]
    pub fn total_cost(&self) -> Money {
        Money::from_cents(self.total_cost_cents)
    }
}

/// One line of a purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseItem {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_cost_cents: i64,
}

impl PurchaseItem {
    pub fn line_cost(&self) -> Money {
        Money::from_cents(self.unit_cost_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Shop Profile
// =============================================================================

/// Shop details printed on invoices and used in customer messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShopProfile {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub website: Option<String>,
    pub footer_note: String,
    /// Logo as a data URL.
    pub logo: Option<String>,
}

impl Default for ShopProfile {
    fn default() -> Self {
        ShopProfile {
            name: "My Shop".to_string(),
            address: String::new(),
            phone: String::new(),
            email: String::new(),
            website: None,
            footer_note: "Thank you, come again!".to_string(),
            logo: None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
