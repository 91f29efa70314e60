//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Credit ledgers subtract settled totals from credited totals:          │
//! │    500.10 + 300.20 - 500.10 = 300.20000000000005  ❌                    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    50010 + 30020 - 50010 = 30020  ✅                                    │
//! │                                                                         │
//! │  Text typed at the counter ("150", "12.5") is parsed straight into     │
//! │  cents without passing through f64.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kade_core::money::Money;
//!
//! let price = Money::from_cents(15000); // Rs. 150.00
//! let line = price * 3;                 // Rs. 450.00
//! assert_eq!(line.cents(), 45000);
//!
//! let typed = Money::parse("12.5").unwrap();
//! assert_eq!(typed.cents(), 1250);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

/// Currency prefix used for every formatted amount.
pub const CURRENCY_SYMBOL: &str = "Rs.";

/// Largest amount [`Money::parse`] accepts, either sign: Rs. 1,000,000,000.00.
///
/// With quantities capped at [`crate::MAX_ITEM_QUANTITY`] this keeps every
/// bill total far inside `i64`.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: negative values carry discounts and short payments
///   (negative change)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price ──► CartItem.line_total ──► Totals.subtotal             │
/// │                                                 │                       │
/// │                       Totals.tax ◄──────────────┤                       │
/// │                                                 ▼                       │
/// │  Sale.total ──► CustomerCreditAccount.outstanding ──► Reports          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use kade_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Parses a decimal amount typed by the cashier.
    ///
    /// Accepts an optional sign, digits, and an optional fractional part.
    /// A third fractional digit rounds half-up; anything beyond is dropped.
    /// Returns `None` for blank or non-numeric text, and for amounts beyond
    /// [`MAX_AMOUNT_CENTS`].
    ///
    /// ## Example
    /// ```rust
    /// use kade_core::money::Money;
    ///
    /// assert_eq!(Money::parse("150").unwrap().cents(), 15000);
    /// assert_eq!(Money::parse(" 12.5 ").unwrap().cents(), 1250);
    /// assert_eq!(Money::parse("0.125").unwrap().cents(), 13);
    /// assert_eq!(Money::parse("-20").unwrap().cents(), -2000);
    /// assert!(Money::parse("abc").is_none());
    /// assert!(Money::parse("").is_none());
    /// assert!(Money::parse("92233720368547758.99").is_none());
    /// ```
    pub fn parse(input: &str) -> Option<Money> {
        let text = input.trim();
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let (whole, fraction) = match body.split_once('.') {
            Some((w, f)) => (w, f),
            None => (body, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }

        let major: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().ok()?
        };

        let digits: Vec<i64> = fraction
            .chars()
            .take(3)
            .filter_map(|c| c.to_digit(10).map(i64::from))
            .collect();
        let tenths = digits.first().copied().unwrap_or(0);
        let hundredths = digits.get(1).copied().unwrap_or(0);
        let round_up = digits.get(2).map(|d| *d >= 5).unwrap_or(false);

        let mut cents = major
            .checked_mul(100)?
            .checked_add(tenths * 10 + hundredths)?;
        if round_up {
            cents = cents.checked_add(1)?;
        }
        if cents > MAX_AMOUNT_CENTS {
            return None;
        }

        Some(Money(if negative { -cents } else { cents }))
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (rupees) portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.saturating_abs())
    }

    /// Calculates tax on this amount, rounding half-up to the nearest cent.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`, computed in i128 and
    /// clamped back into i64.
    ///
    /// ## Example
    /// ```rust
    /// use kade_core::money::Money;
    /// use kade_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(1000);
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(825));
    /// assert_eq!(tax.cents(), 83);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Multiplies money by a quantity, saturating at the i64 bounds.
    ///
    /// ## Example
    /// ```rust
    /// use kade_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(15000);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 45000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Formats without the currency symbol: `1234.50`, `-5.00`.
    pub fn to_plain_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.major().abs(), self.cents_part())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Fixed two-decimal display with the shop currency: `Rs. 450.00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", CURRENCY_SYMBOL, self.to_plain_string())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// Arithmetic saturates. A pinned total is visibly wrong on screen; a
// wrapped one is silently wrong.

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
