//! # Credit Ledger
//!
//! Per-customer receivables derived from the sale history, and the
//! settlement transition that collects them.
//!
//! ## Derivation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  all sales                                                              │
//! │     │                                                                   │
//! │     ▼  keep: method = Credit  OR  (status = Paid AND id "settled-…")    │
//! │     │                                                                   │
//! │     ▼  group by (name, contact-or-"")                                   │
//! │     │                                                                   │
//! │     ▼  total_credit = Σ total      total_paid = Σ total where Paid      │
//! │     │  outstanding  = total_credit − total_paid                         │
//! │     │                                                                   │
//! │     ▼  filter: outstanding > 0.01 unless include_settled                │
//! │     │          search in name (any case) or contact (verbatim)          │
//! │     ▼                                                                   │
//! │  accounts, largest outstanding first                                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is stored. Accounts are recomputed from the sale list every
//! time, so the same input always yields the same output.
//!
//! ## Settlement
//! ```text
//!   Pending ──settle──► Paid          (one-way)
//!
//!   RecordAsCash: id "1717…456" → "settled-1717…456", method → Cash
//!   StatusOnly:   id and method unchanged
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PaymentMethod, PaymentStatus, Sale, SETTLED_PREFIX};

/// Balances at or below this many cents count as settled.
pub const SETTLED_EPSILON_CENTS: i64 = 1;

// =============================================================================
// Customer Key
// =============================================================================

/// Identity of a credit customer: the literal name and contact pair.
///
/// An absent contact and an empty one are the same key. Two sales for
/// "Jane" with different contacts belong to different customers.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct CustomerKey {
    pub name: String,
    pub contact: String,
}

impl CustomerKey {
    pub fn new(name: impl Into<String>, contact: impl Into<String>) -> Self {
        CustomerKey {
            name: name.into(),
            contact: contact.into(),
        }
    }

    /// The key a sale is filed under.
    pub fn of(sale: &Sale) -> Self {
        CustomerKey::new(sale.customer_name.clone(), sale.contact_key())
    }

    pub fn matches(&self, sale: &Sale) -> bool {
        self.name == sale.customer_name && self.contact == sale.contact_key()
    }
}

// =============================================================================
// Accounts
// =============================================================================

/// Derived receivable for one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerCreditAccount {
    pub name: String,
    pub contact: String,
    pub total_credit_cents: i64,
    pub total_paid_cents: i64,
    pub outstanding_cents: i64,
    #[ts(as = "String")]
    pub last_activity: DateTime<Utc>,
    pub bill_count: usize,
}

impl CustomerCreditAccount {
    pub fn key(&self) -> CustomerKey {
        CustomerKey::new(self.name.clone(), self.contact.clone())
    }

    #[inline]
    pub fn outstanding(&self) -> Money {
        Money::from_cents(self.outstanding_cents)
    }

    #[inline]
    pub fn total_credit(&self) -> Money {
        Money::from_cents(self.total_credit_cents)
    }

    #[inline]
    pub fn total_paid(&self) -> Money {
        Money::from_cents(self.total_paid_cents)
    }

    /// True when nothing meaningful is owed.
    pub fn is_settled(&self) -> bool {
        self.outstanding_cents <= SETTLED_EPSILON_CENTS
    }
}

/// View options for the ledger list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerFilter {
    /// Matched against the name ignoring case, or the contact as typed.
    pub search: String,
    /// Also list accounts that owe nothing.
    pub include_settled: bool,
}

/// Whether a sale contributes to the credit ledger.
///
/// Credit sales always do. A Paid sale whose id carries the settlement tag
/// does too, so a credit settled as cash stays visible in the history.
pub fn is_ledger_sale(sale: &Sale) -> bool {
    sale.payment_method == PaymentMethod::Credit
        || (sale.payment_status == PaymentStatus::Paid && sale.has_settled_tag())
}

/// Aggregates the sale history into per-customer accounts.
///
/// Ordered by outstanding balance, largest first; equal balances fall back
/// to name then contact order.
pub fn build_customer_aggregates(
    sales: &[Sale],
    filter: &LedgerFilter,
) -> Vec<CustomerCreditAccount> {
    let mut grouped: BTreeMap<CustomerKey, CustomerCreditAccount> = BTreeMap::new();

    for sale in sales.iter().filter(|s| is_ledger_sale(s)) {
        let account = grouped
            .entry(CustomerKey::of(sale))
            .or_insert_with(|| CustomerCreditAccount {
                name: sale.customer_name.clone(),
                contact: sale.contact_key().to_string(),
                total_credit_cents: 0,
                total_paid_cents: 0,
                outstanding_cents: 0,
                last_activity: sale.date,
                bill_count: 0,
            });

        account.total_credit_cents += sale.total_cents;
        if sale.payment_status == PaymentStatus::Paid {
            account.total_paid_cents += sale.total_cents;
        }
        if sale.date > account.last_activity {
            account.last_activity = sale.date;
        }
        account.bill_count += 1;
    }

    let needle = filter.search.to_lowercase();

    let mut accounts: Vec<CustomerCreditAccount> = grouped
        .into_values()
        .map(|mut account| {
            account.outstanding_cents = account.total_credit_cents - account.total_paid_cents;
            account
        })
        .filter(|a| filter.include_settled || !a.is_settled())
        .filter(|a| a.name.to_lowercase().contains(&needle) || a.contact.contains(&filter.search))
        .collect();

    // Stable: ties keep the key order from the BTreeMap.
    accounts.sort_by(|a, b| b.outstanding_cents.cmp(&a.outstanding_cents));
    accounts
}

/// Sum of outstanding balances across the given accounts.
pub fn total_outstanding(accounts: &[CustomerCreditAccount]) -> Money {
    accounts.iter().map(CustomerCreditAccount::outstanding).sum()
}

// =============================================================================
// History
// =============================================================================

/// Every credit or paid sale filed under `customer`, newest first.
pub fn customer_history<'a>(sales: &'a [Sale], customer: &CustomerKey) -> Vec<&'a Sale> {
    let mut history: Vec<&Sale> = sales
        .iter()
        .filter(|s| {
            (s.payment_method == PaymentMethod::Credit || s.payment_status == PaymentStatus::Paid)
                && customer.matches(s)
        })
        .collect();

    history.sort_by(|a, b| b.date.cmp(&a.date));
    history
}

/// A customer's history with the figures shown above it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerStatement {
    pub customer: CustomerKey,
    /// Σ total of the Pending bills.
    pub pending_cents: i64,
    /// Σ total of every listed bill.
    pub lifetime_cents: i64,
    pub bill_count: usize,
    pub sales: Vec<Sale>,
}

impl CustomerStatement {
    #[inline]
    pub fn pending(&self) -> Money {
        Money::from_cents(self.pending_cents)
    }

    #[inline]
    pub fn lifetime(&self) -> Money {
        Money::from_cents(self.lifetime_cents)
    }
}

/// Builds the statement for one customer.
pub fn customer_statement(sales: &[Sale], customer: &CustomerKey) -> CustomerStatement {
    let history = customer_history(sales, customer);

    let pending: Money = history
        .iter()
        .filter(|s| s.is_pending())
        .map(|s| s.total())
        .sum();
    let lifetime: Money = history.iter().map(|s| s.total()).sum();

    CustomerStatement {
        customer: customer.clone(),
        pending_cents: pending.cents(),
        lifetime_cents: lifetime.cents(),
        bill_count: history.len(),
        sales: history.into_iter().cloned().collect(),
    }
}

// =============================================================================
// Settlement
// =============================================================================

/// What settling a credit sale does to the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SettlementMode {
    /// Mark Paid, switch the method to Cash and tag the id, so the money
    /// counts as today's cash while its credit origin stays traceable.
    #[default]
    RecordAsCash,
    /// Mark Paid and leave everything else alone.
    StatusOnly,
}

impl std::str::FromStr for SettlementMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "record_as_cash" | "cash" => Ok(SettlementMode::RecordAsCash),
            "status_only" | "status" => Ok(SettlementMode::StatusOnly),
            other => Err(format!("unknown settlement mode: {}", other)),
        }
    }
}

/// Confirmation text shown before settling.
///
/// ```rust
/// # use kade_core::ledger::{settlement_prompt, SettlementMode};
/// # use kade_core::*;
/// # use chrono::Utc;
/// let sale = Sale {
///     id: "1717000123456".into(), date: Utc::now(),
///     customer_name: "Jane".into(), customer_contact: Some("0711111111".into()),
///     items: vec![], subtotal_cents: 50000, discount_cents: 0, tax_cents: 0,
///     tax_rate_bps: 0, total_cents: 50000,
///     payment_method: PaymentMethod::Credit, payment_status: PaymentStatus::Pending,
/// };
/// let prompt = settlement_prompt(&sale, SettlementMode::RecordAsCash);
/// assert!(prompt.contains("#123456"));
/// assert!(prompt.contains("Rs. 500.00"));
/// ```
pub fn settlement_prompt(sale: &Sale, mode: SettlementMode) -> String {
    match mode {
        SettlementMode::RecordAsCash => format!(
            "Mark Bill #{} as settled? The amount ({}) will be recorded as a Cash Sale for today.",
            sale.invoice_number(),
            sale.total()
        ),
        SettlementMode::StatusOnly => format!(
            "Mark Bill #{} as paid? The amount ({}) will be cleared from the customer's balance.",
            sale.invoice_number(),
            sale.total()
        ),
    }
}

/// Applies the settlement transition, returning the updated record.
///
/// The caller persists the result with the ORIGINAL id as the lookup key,
/// because [`SettlementMode::RecordAsCash`] renames the sale.
///
/// ## Errors
/// [`CoreError::InvalidSaleStatus`] when the sale is not Pending.
pub fn settle(sale: &Sale, mode: SettlementMode) -> CoreResult<Sale> {
    if sale.payment_status != PaymentStatus::Pending {
        return Err(CoreError::InvalidSaleStatus {
            sale_id: sale.id.clone(),
            current_status: sale.payment_status.to_string(),
        });
    }

    let mut settled = sale.clone();
    settled.payment_status = PaymentStatus::Paid;

    if mode == SettlementMode::RecordAsCash {
        settled.payment_method = PaymentMethod::Cash;
        if !settled.has_settled_tag() {
            settled.id = format!("{}{}", SETTLED_PREFIX, sale.id);
        }
    }

    Ok(settled)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sale(
        id: &str,
        name: &str,
        contact: Option<&str>,
        total_major: i64,
        method: PaymentMethod,
        day: u32,
    ) -> Sale {
        Sale {
            id: id.to_string(),
            date: Utc.with_ymd_and_hms(2024, 6, day, 10, 0, 0).unwrap(),
            customer_name: name.to_string(),
            customer_contact: contact.map(str::to_string),
            items: vec![],
            subtotal_cents: total_major * 100,
            discount_cents: 0,
            tax_cents: 0,
            tax_rate_bps: 0,
            total_cents: total_major * 100,
            payment_method: method,
            payment_status: method.initial_status(),
        }
    }

    fn jane_sales() -> Vec<Sale> {
        vec![
            sale("1", "Jane", Some("0711111111"), 500, PaymentMethod::Credit, 1),
            sale("2", "Jane", Some("0711111111"), 300, PaymentMethod::Credit, 2),
        ]
    }

    #[test]
    fn test_jane_outstanding_after_one_settlement() {
        let mut sales = jane_sales();
        sales[0] = settle(&sales[0], SettlementMode::RecordAsCash).unwrap();

        let accounts = build_customer_aggregates(&sales, &LedgerFilter::default());
        assert_eq!(accounts.len(), 1);
        let jane = &accounts[0];
        assert_eq!(jane.outstanding(), Money::from_major(300));
        assert_eq!(jane.total_credit(), Money::from_major(800));
        assert_eq!(jane.total_paid(), Money::from_major(500));
        assert_eq!(jane.bill_count, 2);
    }

    #[test]
    fn test_settlement_decreases_outstanding_by_total() {
        let sales = jane_sales();
        let before = build_customer_aggregates(&sales, &LedgerFilter::default());

        for mode in [SettlementMode::RecordAsCash, SettlementMode::StatusOnly] {
            let mut after_sales = sales.clone();
            after_sales[1] = settle(&after_sales[1], mode).unwrap();
            let after = build_customer_aggregates(&after_sales, &LedgerFilter::default());

            assert_eq!(
                before[0].outstanding() - after[0].outstanding(),
                sales[1].total()
            );
        }
    }

    #[test]
    fn test_settle_modes() {
        let pending = &jane_sales()[0];

        let cash = settle(pending, SettlementMode::RecordAsCash).unwrap();
        assert_eq!(cash.id, "settled-1");
        assert_eq!(cash.payment_method, PaymentMethod::Cash);
        assert_eq!(cash.payment_status, PaymentStatus::Paid);
        assert_eq!(cash.total_cents, pending.total_cents);

        let status = settle(pending, SettlementMode::StatusOnly).unwrap();
        assert_eq!(status.id, "1");
        assert_eq!(status.payment_method, PaymentMethod::Credit);
        assert_eq!(status.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_settle_is_one_way() {
        let settled = settle(&jane_sales()[0], SettlementMode::RecordAsCash).unwrap();
        assert!(matches!(
            settle(&settled, SettlementMode::RecordAsCash),
            Err(CoreError::InvalidSaleStatus { .. })
        ));
    }

    #[test]
    fn test_absent_and_empty_contact_share_a_key() {
        let sales = vec![
            sale("1", "Ravi", None, 100, PaymentMethod::Credit, 1),
            sale("2", "Ravi", Some(""), 200, PaymentMethod::Credit, 2),
            sale("3", "Ravi", Some("0777"), 50, PaymentMethod::Credit, 3),
        ];

        let accounts = build_customer_aggregates(&sales, &LedgerFilter::default());
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].contact, "");
        assert_eq!(accounts[0].outstanding(), Money::from_major(300));
        assert_eq!(accounts[1].contact, "0777");
    }

    #[test]
    fn test_cash_sales_are_not_ledger_entries() {
        let sales = vec![
            sale("1", "Jane", Some("0711111111"), 500, PaymentMethod::Cash, 1),
            sale("2", "Jane", Some("0711111111"), 200, PaymentMethod::Card, 1),
        ];
        let filter = LedgerFilter {
            include_settled: true,
            ..Default::default()
        };
        assert!(build_customer_aggregates(&sales, &filter).is_empty());
    }

    #[test]
    fn test_settled_accounts_hidden_unless_requested() {
        let mut sales = jane_sales();
        sales[0] = settle(&sales[0], SettlementMode::RecordAsCash).unwrap();
        sales[1] = settle(&sales[1], SettlementMode::RecordAsCash).unwrap();

        assert!(build_customer_aggregates(&sales, &LedgerFilter::default()).is_empty());

        let all = LedgerFilter {
            include_settled: true,
            ..Default::default()
        };
        let accounts = build_customer_aggregates(&sales, &all);
        assert_eq!(accounts.len(), 1);
        assert!(accounts[0].is_settled());
        assert_eq!(accounts[0].total_paid(), Money::from_major(800));
    }

    #[test]
    fn test_one_cent_counts_as_settled() {
        let mut s = sale("1", "Kamal", Some("0722"), 0, PaymentMethod::Credit, 1);
        s.total_cents = 1;
        let accounts = build_customer_aggregates(&[s.clone()], &LedgerFilter::default());
        assert!(accounts.is_empty());

        s.total_cents = 2;
        let accounts = build_customer_aggregates(&[s], &LedgerFilter::default());
        assert_eq!(accounts.len(), 1);
    }

    #[test]
    fn test_search_and_ordering() {
        let sales = vec![
            sale("1", "Jane", Some("0711111111"), 300, PaymentMethod::Credit, 1),
            sale("2", "Nimal", Some("0722222222"), 900, PaymentMethod::Credit, 2),
            sale("3", "Amara", Some("0733333333"), 300, PaymentMethod::Credit, 3),
        ];

        let all = build_customer_aggregates(&sales, &LedgerFilter::default());
        let names: Vec<&str> = all.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Nimal", "Amara", "Jane"]);
        assert_eq!(total_outstanding(&all), Money::from_major(1500));

        let by_name = LedgerFilter {
            search: "JAN".to_string(),
            ..Default::default()
        };
        let found = build_customer_aggregates(&sales, &by_name);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Jane");

        let by_contact = LedgerFilter {
            search: "07222".to_string(),
            ..Default::default()
        };
        assert_eq!(build_customer_aggregates(&sales, &by_contact)[0].name, "Nimal");
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let sales = vec![
            sale("1", "B", Some("1"), 100, PaymentMethod::Credit, 1),
            sale("2", "A", Some("2"), 100, PaymentMethod::Credit, 2),
            sale("3", "C", None, 250, PaymentMethod::Credit, 3),
        ];
        let filter = LedgerFilter::default();
        assert_eq!(
            build_customer_aggregates(&sales, &filter),
            build_customer_aggregates(&sales, &filter)
        );
    }

    #[test]
    fn test_last_activity_is_latest_date() {
        let sales = vec![
            sale("1", "Jane", Some("0711111111"), 100, PaymentMethod::Credit, 5),
            sale("2", "Jane", Some("0711111111"), 100, PaymentMethod::Credit, 9),
            sale("3", "Jane", Some("0711111111"), 100, PaymentMethod::Credit, 2),
        ];
        let accounts = build_customer_aggregates(&sales, &LedgerFilter::default());
        assert_eq!(accounts[0].last_activity, sales[1].date);
    }

    #[test]
    fn test_history_and_statement() {
        let key = CustomerKey::new("Jane", "0711111111");
        let mut sales = jane_sales();
        sales.push(sale("3", "Jane", Some("0711111111"), 40, PaymentMethod::Cash, 3));
        sales.push(sale("4", "Jane", Some("0799999999"), 70, PaymentMethod::Credit, 4));
        sales[0] = settle(&sales[0], SettlementMode::RecordAsCash).unwrap();

        let history = customer_history(&sales, &key);
        let ids: Vec<&str> = history.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "settled-1"]);

        let statement = customer_statement(&sales, &key);
        assert_eq!(statement.pending(), Money::from_major(300));
        assert_eq!(statement.lifetime(), Money::from_major(840));
        assert_eq!(statement.bill_count, 3);
    }

    #[test]
    fn test_settlement_mode_parse() {
        assert_eq!(
            "record-as-cash".parse::<SettlementMode>(),
            Ok(SettlementMode::RecordAsCash)
        );
        assert_eq!("status_only".parse::<SettlementMode>(), Ok(SettlementMode::StatusOnly));
        assert!("later".parse::<SettlementMode>().is_err());
        assert_eq!(SettlementMode::default(), SettlementMode::RecordAsCash);
    }

    #[test]
    fn test_account_serializes_for_frontend() {
        let accounts = build_customer_aggregates(&jane_sales(), &LedgerFilter::default());
        let json = serde_json::to_value(&accounts[0]).unwrap();
        assert_eq!(json["outstanding_cents"], 80000);
        assert_eq!(json["contact"], "0711111111");
    }
}
