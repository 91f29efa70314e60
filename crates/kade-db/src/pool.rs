//! # Store Handle
//!
//! Opening the shop database and handing out repositories.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  DbConfig::new("kade.db")          DbConfig::in_memory()  (tests)       │
//! │          │                                  │                           │
//! │          └──────────────┬───────────────────┘                           │
//! │                         ▼                                               │
//! │  Database::new ──► SqlitePool ──► embedded migrations                   │
//! │                         │                                               │
//! │          ┌──────────────┼───────────────┬───────────────┐               │
//! │          ▼              ▼               ▼               ▼               │
//! │     products()       sales()       purchases()      profile()           │
//! │                                                                         │
//! │  load_snapshot() reads all four at once (tokio::try_join!)              │
//! │  close() ──► every later call fails with ConnectionFailed               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Journal
//! A file database uses WAL, so refreshing the views never waits on a
//! checkout that is mid-write. The in-memory variant keeps SQLite's default
//! journal and a single connection: each new `:memory:` connection would
//! otherwise open a different, empty database.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use kade_core::{Product, Purchase, Sale, ShopProfile};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::product::ProductRepository;
use crate::repository::profile::ProfileRepository;
use crate::repository::purchase::PurchaseRepository;
use crate::repository::sale::SaleRepository;

/// Path value that selects a private in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// How to open the store.
///
/// ```rust
/// use kade_db::DbConfig;
///
/// let config = DbConfig::new("/var/lib/kade/kade.db").max_connections(2);
/// assert_eq!(config.max_connections, 2);
/// assert!(!config.is_in_memory());
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file; created on first open.
    pub database_path: PathBuf,
    /// Pool ceiling. A single till rarely needs more than a handful.
    pub max_connections: u32,
    /// Connections kept open while idle.
    pub min_connections: u32,
    /// How long a caller waits for a free connection.
    pub acquire_timeout: Duration,
    /// How long SQLite retries a write while another connection holds the
    /// lock, before reporting `database is locked`.
    pub busy_timeout: Duration,
    /// Apply pending migrations right after connecting.
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 4,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(15),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// A throwaway database that lives as long as the pool.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            ..DbConfig::new(IN_MEMORY_PATH)
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_PATH
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let base = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
        };

        // sale_items follows a renamed sale through ON UPDATE CASCADE,
        // which SQLite only honours with foreign keys switched on.
        Ok(base.foreign_keys(true).busy_timeout(self.busy_timeout))
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Everything the app reads on refresh.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub products: Vec<Product>,
    pub sales: Vec<Sale>,
    pub purchases: Vec<Purchase>,
    pub profile: ShopProfile,
}

// =============================================================================
// Database
// =============================================================================

/// The open store. Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connects and, unless disabled, migrates.
    ///
    /// ## Errors
    /// - [`DbError::ConnectionFailed`] when the file cannot be opened
    /// - [`DbError::MigrationFailed`] when the schema cannot be brought up
    ///   to date
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening shop database");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(
            max_connections = config.max_connections,
            in_memory = config.is_in_memory(),
            "Pool ready"
        );

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// (embedded, applied) migration counts.
    pub async fn migration_status(&self) -> DbResult<(usize, usize)> {
        migrations::migration_status(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    pub fn purchases(&self) -> PurchaseRepository {
        PurchaseRepository::new(self.pool.clone())
    }

    pub fn profile(&self) -> ProfileRepository {
        ProfileRepository::new(self.pool.clone())
    }

    /// Loads products, sales, purchases and the profile concurrently.
    ///
    /// Fails as a whole if any single read fails.
    pub async fn load_snapshot(&self) -> DbResult<Snapshot> {
        let products = self.products();
        let sales = self.sales();
        let purchases = self.purchases();
        let profile = self.profile();

        let (products, sales, purchases, profile) = tokio::try_join!(
            products.list(),
            sales.list(),
            purchases.list(),
            profile.get(),
        )?;

        debug!(
            products = products.len(),
            sales = sales.len(),
            purchases = purchases.len(),
            "Snapshot loaded"
        );

        Ok(Snapshot {
            products,
            sales,
            purchases,
            profile,
        })
    }

    /// Shuts the pool. In-memory data is gone afterwards.
    pub async fn close(&self) {
        info!("Closing shop database");
        self.pool.close().await;
    }

    /// True when a trivial query goes through.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
