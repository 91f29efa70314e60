//! # Reports
//!
//! Figures for the reports screen, derived from the sale and purchase
//! history.
//!
//! ## What Counts Where
//! ```text
//! ┌──────────────────────┬──────────────────────────────────────────────────┐
//! │ Figure               │ Source                                           │
//! ├──────────────────────┼──────────────────────────────────────────────────┤
//! │ revenue by method    │ Paid sales, grouped by payment method            │
//! │ pending credit       │ Pending sales                                    │
//! │ discount / tax       │ Paid sales                                       │
//! │ gross profit         │ Paid sales: subtotal − discount − line costs     │
//! │ purchase spend       │ Purchases                                        │
//! └──────────────────────┴──────────────────────────────────────────────────┘
//! ```
//!
//! A credit sale settled as cash moves from "pending credit" to Cash
//! revenue, which is why settlement rewrites the method.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{PaymentMethod, PaymentStatus, Purchase, Sale};

/// Inclusive calendar-day range (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "String")]
    pub from: NaiveDate,
    #[ts(as = "String")]
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        DateRange { from, to }
    }

    /// A single day.
    pub fn day(date: NaiveDate) -> Self {
        DateRange { from: date, to: date }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let day = at.date_naive();
        day >= self.from && day <= self.to
    }
}

fn in_range(range: Option<&DateRange>, at: DateTime<Utc>) -> bool {
    range.map_or(true, |r| r.contains(at))
}

// =============================================================================
// Summary
// =============================================================================

/// Paid revenue for one payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MethodTotal {
    pub method: PaymentMethod,
    pub revenue_cents: i64,
    pub sale_count: usize,
}

/// Headline figures for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesSummary {
    pub sale_count: usize,
    pub paid_revenue_cents: i64,
    /// One entry per payment method, in [`PaymentMethod::ALL`] order.
    pub by_method: Vec<MethodTotal>,
    pub pending_credit_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub gross_profit_cents: i64,
    pub purchase_spend_cents: i64,
    pub purchase_count: usize,
}

impl SalesSummary {
    #[inline]
    pub fn paid_revenue(&self) -> Money {
        Money::from_cents(self.paid_revenue_cents)
    }

    #[inline]
    pub fn pending_credit(&self) -> Money {
        Money::from_cents(self.pending_credit_cents)
    }

    #[inline]
    pub fn gross_profit(&self) -> Money {
        Money::from_cents(self.gross_profit_cents)
    }

    pub fn revenue_for(&self, method: PaymentMethod) -> Money {
        self.by_method
            .iter()
            .find(|m| m.method == method)
            .map(|m| Money::from_cents(m.revenue_cents))
            .unwrap_or_default()
    }
}

/// Summarizes sales and purchases, optionally limited to a date range.
pub fn summarize(sales: &[Sale], purchases: &[Purchase], range: Option<&DateRange>) -> SalesSummary {
    let mut by_method: Vec<MethodTotal> = PaymentMethod::ALL
        .iter()
        .map(|&method| MethodTotal {
            method,
            revenue_cents: 0,
            sale_count: 0,
        })
        .collect();

    let mut summary = SalesSummary {
        sale_count: 0,
        paid_revenue_cents: 0,
        by_method: Vec::new(),
        pending_credit_cents: 0,
        discount_cents: 0,
        tax_cents: 0,
        gross_profit_cents: 0,
        purchase_spend_cents: 0,
        purchase_count: 0,
    };

    for sale in sales.iter().filter(|s| in_range(range, s.date)) {
        summary.sale_count += 1;

        match sale.payment_status {
            PaymentStatus::Pending => summary.pending_credit_cents += sale.total_cents,
            PaymentStatus::Paid => {
                summary.paid_revenue_cents += sale.total_cents;
                summary.discount_cents += sale.discount_cents;
                summary.tax_cents += sale.tax_cents;

                let cost: Money = sale.items.iter().map(|i| i.line_cost()).sum();
                summary.gross_profit_cents +=
                    (sale.subtotal() - sale.discount() - cost).cents();

                if let Some(entry) = by_method.iter_mut().find(|m| m.method == sale.payment_method) {
                    entry.revenue_cents += sale.total_cents;
                    entry.sale_count += 1;
                }
            }
        }
    }

    for purchase in purchases.iter().filter(|p| in_range(range, p.date)) {
        summary.purchase_count += 1;
        summary.purchase_spend_cents += purchase.total_cost_cents;
    }

    summary.by_method = by_method;
    summary
}

// =============================================================================
// Daily Totals
// =============================================================================

/// Paid revenue for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyTotal {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub revenue_cents: i64,
    pub sale_count: usize,
}

/// Per-day paid revenue, oldest day first. Days without paid sales are
/// omitted.
pub fn daily_totals(sales: &[Sale], range: Option<&DateRange>) -> Vec<DailyTotal> {
    let mut days: BTreeMap<NaiveDate, DailyTotal> = BTreeMap::new();

    for sale in sales
        .iter()
        .filter(|s| s.payment_status == PaymentStatus::Paid && in_range(range, s.date))
    {
        let date = sale.date.date_naive();
        let day = days.entry(date).or_insert(DailyTotal {
            date,
            revenue_cents: 0,
            sale_count: 0,
        });
        day.revenue_cents += sale.total_cents;
        day.sale_count += 1;
    }

    days.into_values().collect()
}
