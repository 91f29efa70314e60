//! # kade-db
//!
//! SQLite storage for the shop: the catalog, committed sales with their
//! line snapshots, supplier purchases and the shop profile.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  kade-app commands (checkout, settle_sale, record_purchase, refresh)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database (pool.rs) ── load_snapshot() ──► Snapshot                     │
//! │       │                                                                 │
//! │       ├── products()  ─► ProductRepository   list / insert / update     │
//! │       ├── sales()     ─► SaleRepository      list / save / update       │
//! │       ├── purchases() ─► PurchaseRepository  list / insert (+stock)     │
//! │       └── profile()   ─► ProfileRepository   get / save                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL) ◄── migrations.rs (embedded SQL)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Business rules are not checked here. A repository writes what it is
//! given; `kade-core` decides what is valid.
//!
//! ```rust,ignore
//! use kade_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("kade.db")).await?;
//! db.sales().save(&sale).await?;
//! let snapshot = db.load_snapshot().await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, Snapshot};

pub use repository::product::ProductRepository;
pub use repository::profile::ProfileRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::sale::SaleRepository;
