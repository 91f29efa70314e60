//! # Repositories
//!
//! One struct per table group. Each holds a clone of the pool and is
//! created on demand through [`crate::Database`].
//!
//! Rows are read with runtime `query_as` into private `*Record` structs
//! and converted into `kade-core` types, so the domain types never carry
//! column details. Multi-row writes (a sale and its lines, a purchase and
//! its stock bumps) run inside one transaction.
//!
//! - [`product::ProductRepository`]: catalog
//! - [`sale::SaleRepository`]: sales and their line snapshots
//! - [`purchase::PurchaseRepository`]: supplier purchases
//! - [`profile::ProfileRepository`]: the single shop profile row

pub mod product;
pub mod profile;
pub mod purchase;
pub mod sale;
