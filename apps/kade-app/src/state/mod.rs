//! # State Module
//!
//! Application state, split into one focused type per concern.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐                  │
//! │  │   DbState    │  │ BillingState │  │  ViewsState  │                  │
//! │  │              │  │              │  │              │                  │
//! │  │  Database    │  │  Mutex<      │  │  RwLock<     │                  │
//! │  │  (SQLite     │  │   Session>   │  │   Snapshot>  │                  │
//! │  │   pool)      │  │  AtomicBool  │  │              │                  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘                  │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐                                    │
//! │  │  AuthState   │  │ ConfigState  │                                    │
//! │  │  AtomicBool  │  │  read-only   │                                    │
//! │  └──────────────┘  └──────────────┘                                    │
//! │                                                                         │
//! │  Commands take only the states they need.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod auth;
mod billing;
mod config;
mod db;
mod launcher;
mod views;

pub use auth::AuthState;
pub use billing::{BillingSession, BillingState, CheckoutGuard};
pub use config::{ConfigError, ConfigResult, ConfigState, CONFIG_FILE_NAME};
pub use db::DbState;
pub use launcher::{Launcher, SystemLauncher};
pub use views::ViewsState;
