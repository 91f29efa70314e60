//! # Commands Module
//!
//! Every operation a frontend can invoke.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports)
//! ├── session.rs    ◄─── login, logout, refresh
//! ├── catalog.rs    ◄─── Product browsing, inventory save
//! ├── billing.rs    ◄─── Bill editing and checkout
//! ├── credit.rs     ◄─── Credit ledger and settlement
//! ├── purchases.rs  ◄─── Supplier purchases
//! ├── reports.rs    ◄─── Sales report
//! └── settings.rs   ◄─── Shop profile, configuration
//! ```
//!
//! ## State Injection
//! Each command declares only the state it needs, and every command but
//! `login` starts with `auth.ensure_unlocked()?`:
//! ```rust,ignore
//! // Only needs the views
//! fn list_categories(auth: &AuthState, views: &ViewsState)
//!
//! // Only needs the bill
//! fn get_bill(auth: &AuthState, billing: &BillingState)
//!
//! // Writes, then reloads the views
//! async fn settle_sale(auth: &AuthState, db: &DbState, views: &ViewsState,
//!                      config: &ConfigState, sale_id: String)
//! ```

pub mod billing;
pub mod catalog;
pub mod credit;
pub mod purchases;
pub mod reports;
pub mod session;
pub mod settings;
