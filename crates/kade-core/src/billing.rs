//! # Billing
//!
//! Bill totals and the checkout rule set.
//!
//! ## Totals Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  cart lines ──► subtotal = Σ(price × qty)                               │
//! │                     │                                                   │
//! │                     ├──► tax = subtotal × rate   (half-up, cents)       │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │               total = subtotal + tax − discount                         │
//! │                     │                                                   │
//! │   paid amount ──────┴──► change = paid − total   (0 when not given)     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Negative change means the customer has not handed over enough. It is
//! reported, never blocked.
//!
//! ## Checkout
//! [`prepare_checkout`] turns the cart and the counter inputs into a
//! [`Sale`] ready to persist. It does no I/O; the app layer saves the sale
//! and resets the session only once the write succeeds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PaymentMethod, Sale, TaxRate, WALK_IN_CUSTOMER};

// =============================================================================
// Totals
// =============================================================================

/// Computed bill totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Totals {
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub tax_rate_bps: u32,
    pub total_cents: i64,
    /// Paid minus total; zero when no paid amount was entered.
    pub change_cents: i64,
}

impl Totals {
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

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn change(&self) -> Money {
        Money::from_cents(self.change_cents)
    }

    /// True when a paid amount was entered and it falls short of the total.
    pub fn is_underpaid(&self) -> bool {
        self.change_cents < 0
    }
}

/// Computes subtotal, tax, total and change for a cart.
///
/// ## Example
/// ```rust
/// use kade_core::billing::compute_totals;
/// use kade_core::cart::Cart;
/// use kade_core::{Money, TaxRate};
///
/// let totals = compute_totals(&Cart::new(), Money::zero(), TaxRate::zero(), None);
/// assert_eq!(totals.total(), Money::zero());
/// assert_eq!(totals.change(), Money::zero());
/// ```
pub fn compute_totals(
    cart: &Cart,
    discount: Money,
    tax_rate: TaxRate,
    paid: Option<Money>,
) -> Totals {
    let subtotal = cart.subtotal();
    let tax = subtotal.calculate_tax(tax_rate);
    let total = subtotal + tax - discount;
    let change = paid.map(|p| p - total).unwrap_or_default();

    Totals {
        subtotal_cents: subtotal.cents(),
        discount_cents: discount.cents(),
        tax_cents: tax.cents(),
        tax_rate_bps: tax_rate.bps(),
        total_cents: total.cents(),
        change_cents: change.cents(),
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// Who the bill is for, as typed at the counter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerInfo {
    pub name: String,
    pub contact: String,
}

impl CustomerInfo {
    pub fn new(name: impl Into<String>, contact: impl Into<String>) -> Self {
        CustomerInfo {
            name: name.into(),
            contact: contact.into(),
        }
    }
}

/// Builds the sale for a checkout.
///
/// ## Rules
/// - Empty cart: [`CoreError::EmptyCart`]
/// - Credit with a blank name or contact: [`CoreError::CreditCustomerRequired`]
/// - Blank name on any other method records [`WALK_IN_CUSTOMER`]
/// - Blank contact is stored as absent
/// - Credit starts Pending, everything else starts Paid
///
/// The id is the checkout time in epoch milliseconds.
pub fn prepare_checkout(
    cart: &Cart,
    customer: &CustomerInfo,
    method: PaymentMethod,
    totals: &Totals,
    now: DateTime<Utc>,
) -> CoreResult<Sale> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let name = customer.name.trim();
    let contact = customer.contact.trim();

    if method == PaymentMethod::Credit {
        if name.is_empty() {
            return Err(CoreError::CreditCustomerRequired {
                field: "customer name".to_string(),
            });
        }
        if contact.is_empty() {
            return Err(CoreError::CreditCustomerRequired {
                field: "customer contact".to_string(),
            });
        }
    }

    Ok(Sale {
        id: now.timestamp_millis().to_string(),
        date: now,
        customer_name: if name.is_empty() {
            WALK_IN_CUSTOMER.to_string()
        } else {
            name.to_string()
        },
        customer_contact: if contact.is_empty() {
            None
        } else {
            Some(contact.to_string())
        },
        items: cart.items().to_vec(),
        subtotal_cents: totals.subtotal_cents,
        discount_cents: totals.discount_cents,
        tax_cents: totals.tax_cents,
        tax_rate_bps: totals.tax_rate_bps,
        total_cents: totals.total_cents,
        payment_method: method,
        payment_status: method.initial_status(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
