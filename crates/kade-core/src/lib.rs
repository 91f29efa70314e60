//! # kade-core: Pure Business Logic for Kade POS
//!
//! This crate is the **heart** of Kade POS. It contains the billing engine,
//! the credit ledger and every derived view as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kade POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    kade-app (commands)                          │   │
//! │  │   add_to_bill, checkout, list_credit_accounts, settle_sale     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kade-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   cart    │  │  billing  │  │  ledger   │  │  report   │  │   │
//! │  │   │ add/qty   │  │  totals   │  │ accounts  │  │ summaries │  │   │
//! │  │   │ manual    │  │ checkout  │  │ settle    │  │ daily     │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  catalog  │  │  notify   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kade-db (Database Layer)                     │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, CartItem, Sale, Purchase, ShopProfile)
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - The in-progress bill
//! - [`billing`] - Totals and checkout
//! - [`ledger`] - Per-customer credit accounts and settlement
//! - [`catalog`] - Product browsing helpers
//! - [`report`] - Sales and purchase summaries
//! - [`notify`] - Customer message text and deep links
//! - [`error`] - Domain error types
//! - [`validation`] - Field validation
//!
//! ## Example Usage
//!
//! ```rust
//! use kade_core::billing::compute_totals;
//! use kade_core::cart::Cart;
//! use kade_core::{Money, TaxRate};
//! use chrono::Utc;
//!
//! let mut cart = Cart::new();
//! cart.add_manual_item("Lamination", "150", "3", Utc::now());
//!
//! let totals = compute_totals(&cart, Money::zero(), TaxRate::zero(), None);
//! assert_eq!(totals.total(), Money::from_major(450));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod billing;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod ledger;
pub mod money;
pub mod notify;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Largest quantity a cart line or purchase line can carry.
///
/// ## Business Reason
/// Catches a slipped keystroke (1000 instead of 10) when receiving stock.
/// Purchases reject anything above it; the cart clamps to it.
pub const MAX_ITEM_QUANTITY: i64 = 9999;

/// Category filter value that matches every product.
pub const ALL_CATEGORIES: &str = "All";
