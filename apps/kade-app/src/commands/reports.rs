//! # Report Commands
//!
//! Sales figures for the reports screen.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::state::{AuthState, ViewsState};
use kade_core::catalog::low_stock;
use kade_core::report::{daily_totals, summarize, DailyTotal, DateRange, SalesSummary};
use kade_core::Product;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub range: Option<DateRange>,
    pub summary: SalesSummary,
    pub daily: Vec<DailyTotal>,
    pub low_stock: Vec<Product>,
}

/// Summary, per-day revenue and low-stock list.
///
/// With neither bound every sale counts. A single bound is treated as a
/// one-day range.
///
/// ## Errors
/// `VALIDATION_ERROR` when `from` is after `to`.
pub fn sales_report(
    auth: &AuthState,
    views: &ViewsState,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<SalesReport, ApiError> {
    debug!(?from, ?to, "sales_report command");
    auth.ensure_unlocked()?;

    let range = match (from, to) {
        (None, None) => None,
        (Some(day), None) | (None, Some(day)) => Some(DateRange::day(day)),
        (Some(from), Some(to)) if from > to => {
            return Err(ApiError::validation(format!(
                "Report start {} is after its end {}",
                from, to
            )))
        }
        (Some(from), Some(to)) => Some(DateRange::new(from, to)),
    };

    Ok(views.with_snapshot(|s| SalesReport {
        range,
        summary: summarize(&s.sales, &s.purchases, range.as_ref()),
        daily: daily_totals(&s.sales, range.as_ref()),
        low_stock: low_stock(&s.products).into_iter().cloned().collect(),
    }))
}
