//! # Billing State
//!
//! The bill being assembled at the counter, plus the checkout guard.
//!
//! ## Thread Safety
//! The session sits behind a `Mutex` because every billing command
//! mutates it. Locks are held only inside `with_session*` closures, never
//! across an `.await`. While a checkout is in flight, bill edits are
//! refused with BUSY so the reset after the save cannot drop them.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   add_to_bill / add_manual_item / set_* ──► session edits               │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │   checkout ──► begin_checkout()  (second caller gets BUSY)              │
//! │                     │                                                   │
//! │          prepare_checkout ── error ──► session untouched                │
//! │                     │                                                   │
//! │               sales().save ──── error ──► session untouched             │
//! │                     │                                                   │
//! │                   reset()  ──► cart empty, inputs back to defaults      │
//! │                     │                                                   │
//! │   CheckoutGuard dropped ──► processing flag released (every path)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::ConfigState;
use kade_core::billing::{compute_totals, CustomerInfo, Totals};
use kade_core::cart::Cart;
use kade_core::validation::parse_tax_percent;
use kade_core::{Money, PaymentMethod, TaxRate};

/// Everything the cashier has typed for the current bill.
///
/// Discount, tax and paid amount are kept as the raw text of their input
/// boxes; [`BillingSession::totals`] interprets them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingSession {
    pub cart: Cart,
    pub customer: CustomerInfo,
    pub payment_method: PaymentMethod,
    pub discount: String,
    pub tax_percent: String,
    pub paid_amount: String,
    pub notify: bool,
}

impl BillingSession {
    /// A fresh session using the configured defaults.
    pub fn from_config(config: &ConfigState) -> Self {
        BillingSession {
            tax_percent: format_percent(config.default_tax_percent),
            notify: config.notify_on_checkout,
            ..BillingSession::default()
        }
    }

    /// Discount as entered; blank or unparsable reads as zero.
    pub fn discount_amount(&self) -> Money {
        Money::parse(&self.discount).unwrap_or_default()
    }

    /// Tax rate as entered; blank, unparsable or out of range reads as zero.
    pub fn tax_rate(&self) -> TaxRate {
        parse_tax_percent(&self.tax_percent).unwrap_or_default()
    }

    /// Amount tendered, if one was entered.
    pub fn paid(&self) -> Option<Money> {
        Money::parse(&self.paid_amount)
    }

    pub fn totals(&self) -> Totals {
        compute_totals(
            &self.cart,
            self.discount_amount(),
            self.tax_rate(),
            self.paid(),
        )
    }
}

fn format_percent(pct: f64) -> String {
    if pct == 0.0 {
        String::new()
    } else {
        pct.to_string()
    }
}

/// Shared billing state.
#[derive(Debug)]
pub struct BillingState {
    session: Mutex<BillingSession>,
    defaults: BillingSession,
    processing: AtomicBool,
    last_stamp_millis: AtomicI64,
}

impl BillingState {
    /// Creates the state; `defaults` is also what every reset returns to.
    pub fn new(defaults: BillingSession) -> Self {
        BillingState {
            session: Mutex::new(defaults.clone()),
            defaults,
            processing: AtomicBool::new(false),
            last_stamp_millis: AtomicI64::new(0),
        }
    }

    pub fn from_config(config: &ConfigState) -> Self {
        BillingState::new(BillingSession::from_config(config))
    }

    /// Executes a function with read access to the session.
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&BillingSession) -> R,
    {
        let session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&session)
    }

    /// Unconditional write access. Commands go through
    /// [`BillingState::edit_session`] instead.
    fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut BillingSession) -> R,
    {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut session)
    }

    /// Write access for a bill edit.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// billing.edit_session(|s| s.cart.add_catalog_item(&product))?;
    /// ```
    ///
    /// ## Errors
    /// [`crate::error::ErrorCode::Busy`] while a checkout holds the
    /// processing flag. The flag is read under the session lock, so an
    /// edit either lands before checkout reads the bill or is refused.
    pub fn edit_session<F, R>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&mut BillingSession) -> R,
    {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_processing() {
            return Err(ApiError::busy());
        }
        Ok(f(&mut session))
    }

    /// Empties the cart and puts every input back to its default.
    pub fn reset(&self) {
        let defaults = self.defaults.clone();
        self.with_session_mut(|s| *s = defaults);
    }

    /// Claims the processing flag.
    ///
    /// ## Errors
    /// [`crate::error::ErrorCode::Busy`] when another checkout holds it.
    pub fn begin_checkout(&self) -> Result<CheckoutGuard<'_>, ApiError> {
        self.processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ApiError::busy())?;
        Ok(CheckoutGuard {
            flag: &self.processing,
        })
    }

    /// The current time, nudged forward so no two calls share a
    /// millisecond. Sale and manual item ids are built from it.
    pub fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        let millis = now.timestamp_millis();
        let bump = |last: i64| last.max(millis - 1) + 1;

        let previous = self
            .last_stamp_millis
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| Some(bump(last)))
            .unwrap_or_else(|last| last);
        let stamped = bump(previous);

        if stamped == millis {
            now
        } else {
            DateTime::<Utc>::from_timestamp_millis(stamped).unwrap_or(now)
        }
    }

    /// True while a checkout is awaiting persistence.
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }
}

/// Releases the processing flag when dropped.
#[derive(Debug)]
pub struct CheckoutGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for CheckoutGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_totals_from_text_inputs() {
        let mut session = BillingSession::default();
        session
            .cart
            .add_manual_item("Lamination", "100", "2", chrono::Utc::now());
        session.discount = "20".to_string();
        session.paid_amount = "250".to_string();

        let totals = session.totals();
        assert_eq!(totals.subtotal(), Money::from_major(200));
        assert_eq!(totals.total(), Money::from_major(180));
        assert_eq!(totals.change(), Money::from_major(70));

        session.discount = "abc".to_string();
        session.paid_amount = String::new();
        let totals = session.totals();
        assert_eq!(totals.discount(), Money::zero());
        assert_eq!(totals.change(), Money::zero());
    }

    #[test]
    fn test_tax_percent_text() {
        let session = BillingSession {
            tax_percent: " 2.5 ".to_string(),
            ..BillingSession::default()
        };
        assert_eq!(session.tax_rate().bps(), 250);

        let session = BillingSession {
            tax_percent: "VAT".to_string(),
            ..BillingSession::default()
        };
        assert!(session.tax_rate().is_zero());

        let session = BillingSession {
            tax_percent: "1e9".to_string(),
            ..BillingSession::default()
        };
        assert!(session.tax_rate().is_zero());
    }

    #[test]
    fn test_oversized_text_never_panics_totals() {
        let mut session = BillingSession::default();
        session
            .cart
            .add_manual_item("Binding", "1000000000", "1", chrono::Utc::now());
        let id = session.cart.items()[0].id.clone();
        session.cart.set_quantity(&id, "9223372036854775807").unwrap();

        session.discount = "92233720368547758.99".to_string();
        session.paid_amount = "-92233720368547758".to_string();

        let totals = session.totals();
        assert_eq!(totals.subtotal(), Money::from_cents(100_000_000_000 * 9999));
        assert_eq!(totals.discount(), Money::zero());
        assert_eq!(totals.change(), Money::zero());

        session.paid_amount = "-1000000000".to_string();
        assert!(session.totals().is_underpaid());
    }

    #[test]
    fn test_edits_refused_during_checkout() {
        let state = BillingState::new(BillingSession::default());

        let guard = state.begin_checkout().unwrap();
        let err = state
            .edit_session(|s| s.discount = "10".to_string())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Busy);
        drop(guard);

        state
            .edit_session(|s| s.discount = "10".to_string())
            .unwrap();
        assert_eq!(state.with_session(|s| s.discount.clone()), "10");
    }

    #[test]
    fn test_defaults_follow_config() {
        let config = ConfigState {
            default_tax_percent: 15.0,
            notify_on_checkout: true,
            ..ConfigState::default()
        };
        let session = BillingSession::from_config(&config);
        assert_eq!(session.tax_percent, "15");
        assert!(session.notify);

        assert_eq!(BillingSession::from_config(&ConfigState::default()).tax_percent, "");
    }

    #[test]
    fn test_reset_restores_defaults() {
        let defaults = BillingSession {
            tax_percent: "8".to_string(),
            ..BillingSession::default()
        };
        let state = BillingState::new(defaults.clone());

        state.with_session_mut(|s| {
            s.cart
                .add_manual_item("Binding", "250", "1", chrono::Utc::now());
            s.customer = CustomerInfo::new("Jane", "0711111111");
            s.payment_method = PaymentMethod::Credit;
            s.tax_percent = "0".to_string();
        });
        state.reset();

        assert_eq!(state.with_session(|s| s.clone()), defaults);
    }

    #[test]
    fn test_timestamps_never_repeat() {
        let state = BillingState::new(BillingSession::default());
        let stamps: Vec<i64> = (0..50)
            .map(|_| state.next_timestamp().timestamp_millis())
            .collect();

        for pair in stamps.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_checkout_guard_is_exclusive_and_released() {
        let state = BillingState::new(BillingSession::default());

        let guard = state.begin_checkout().unwrap();
        assert!(state.is_processing());
        assert_eq!(state.begin_checkout().unwrap_err().code, ErrorCode::Busy);

        drop(guard);
        assert!(!state.is_processing());
        assert!(state.begin_checkout().is_ok());
        assert!(!state.is_processing());
    }
}
