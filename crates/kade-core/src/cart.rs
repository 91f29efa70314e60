//! # Cart
//!
//! The bill being assembled at the counter.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cart Operations                                 │
//! │                                                                         │
//! │  Cashier Action           Operation                 Cart Change         │
//! │  ──────────────           ─────────                 ───────────         │
//! │                                                                         │
//! │  Tap product ───────────► add_catalog_item() ─────► qty += 1 or push   │
//! │                                                                         │
//! │  Type ad-hoc line ──────► add_manual_item() ──────► push "Manual" line │
//! │                                                                         │
//! │  Press + / - ───────────► update_quantity() ──────► qty ± 1, min 1     │
//! │                                                                         │
//! │  Type a quantity ───────► set_quantity() ─────────► qty = n, min 0     │
//! │                                                                         │
//! │  Press trash ───────────► remove_item() ──────────► items.retain(..)   │
//! │                                                                         │
//! │  Checkout / Clear ──────► clear() ────────────────► items.clear()      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Catalog lines are unique by product id (re-adding bumps the quantity)
//! - The +/- controls never take a quantity below 1
//! - Typed quantities may sit at 0 while the cashier is still editing
//! - No line goes above [`MAX_ITEM_QUANTITY`]; larger input is clamped
//! - No stock check happens here; the shop may sell into negative stock

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CartItem, Product};
use crate::MAX_ITEM_QUANTITY;

/// Prefix of the synthetic id given to counter-typed lines.
pub const MANUAL_ID_PREFIX: &str = "manual-";

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Looks up a line by item id.
    pub fn get(&self, item_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of all line quantities.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Σ(price × quantity) over every line.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Adds one unit of a catalog product.
    ///
    /// ## Behavior
    /// - Product already in cart: quantity + 1
    /// - Otherwise: appends a snapshot with quantity 1
    pub fn add_catalog_item(&mut self, product: &Product) {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == product.id) {
            item.quantity = (item.quantity + 1).min(MAX_ITEM_QUANTITY);
            return;
        }

        self.items.push(CartItem::from_product(product, 1));
    }

    /// Adds a line typed in at the counter.
    ///
    /// Returns `None` (and leaves the cart untouched) when the name is blank
    /// or the price is not a number. A quantity that does not parse, or
    /// parses to zero or less, becomes 1.
    ///
    /// ## Example
    /// ```rust
    /// use kade_core::cart::Cart;
    /// use kade_core::Money;
    /// use chrono::Utc;
    ///
    /// let mut cart = Cart::new();
    /// let line = cart.add_manual_item("Lamination", "150", "3", Utc::now()).unwrap();
    /// assert_eq!(line.line_total(), Money::from_major(450));
    ///
    /// assert!(cart.add_manual_item("", "150", "1", Utc::now()).is_none());
    /// assert!(cart.add_manual_item("Binding", "abc", "1", Utc::now()).is_none());
    /// ```
    pub fn add_manual_item(
        &mut self,
        name: &str,
        price: &str,
        quantity: &str,
        now: DateTime<Utc>,
    ) -> Option<&CartItem> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let price = Money::parse(price)?;
        let quantity = match parse_quantity(quantity) {
            Some(q) if q > 0 => q.min(MAX_ITEM_QUANTITY),
            _ => 1,
        };

        let id = format!("{}{}", MANUAL_ID_PREFIX, now.timestamp_millis());
        self.items
            .push(CartItem::manual(id, name.to_string(), price, quantity));
        self.items.last()
    }

    /// Adjusts a line by `delta`, staying within 1..=[`MAX_ITEM_QUANTITY`].
    pub fn update_quantity(&mut self, item_id: &str, delta: i64) -> CoreResult<i64> {
        let item = self.find_mut(item_id)?;
        item.quantity = item
            .quantity
            .saturating_add(delta)
            .clamp(1, MAX_ITEM_QUANTITY);
        Ok(item.quantity)
    }

    /// Sets a line's quantity from free text.
    ///
    /// Unparsable text reads as 0 and negatives clamp to 0, so an emptied
    /// input box does not fight the cashier while they type. Anything above
    /// [`MAX_ITEM_QUANTITY`] clamps to it.
    pub fn set_quantity(&mut self, item_id: &str, raw: &str) -> CoreResult<i64> {
        let item = self.find_mut(item_id)?;
        item.quantity = parse_quantity(raw).unwrap_or(0).clamp(0, MAX_ITEM_QUANTITY);
        Ok(item.quantity)
    }

    /// Deletes a line. Returns whether anything was removed.
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        let initial_len = self.items.len();
        self.items.retain(|i| i.id != item_id);
        self.items.len() != initial_len
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn find_mut(&mut self, item_id: &str) -> CoreResult<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| CoreError::ItemNotInCart(item_id.to_string()))
    }
}

/// Reads the leading integer of a typed quantity.
///
/// `"3"` → 3, `" 12 pcs"` → 12, `"3.7"` → 3, `"-2"` → -2, `"abc"` → None.
/// Digit runs too long for i64 saturate.
pub fn parse_quantity(raw: &str) -> Option<i64> {
    let text = raw.trim();
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let digits: String = body.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    let value: i64 = digits.parse().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

// =============================================================================
// Unit Tests
// =============================================================================
