//! # Kade App Library
//!
//! The application layer of Kade POS: session state plus the commands a
//! frontend invokes. All business rules live in `kade-core`; all storage
//! lives in `kade-db`.
//!
//! ## Module Organization
//! ```text
//! kade_app/
//! ├── lib.rs          ◄─── You are here (startup, App bundle)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── auth.rs     ◄─── Session lock
//! │   ├── billing.rs  ◄─── Bill being assembled + checkout guard
//! │   ├── config.rs   ◄─── kade.toml + KADE_* environment
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   ├── launcher.rs ◄─── Opens message links
//! │   └── views.rs    ◄─── Loaded products/sales/purchases/profile
//! ├── commands/       ◄─── One module per screen
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Application Startup                               │
//! │                                                                         │
//! │  1. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter (RUST_LOG overrides)           │
//! │                                                                         │
//! │  2. Load Configuration ───────────────────────────────────────────────► │
//! │     • kade.toml, then KADE_* environment variables                      │
//! │                                                                         │
//! │  3. Determine Database Path ──────────────────────────────────────────► │
//! │     • config / KADE_DB_PATH, else the platform data directory           │
//! │                                                                         │
//! │  4. Connect to Database ──────────────────────────────────────────────► │
//! │     • SQLite with WAL mode, pending migrations applied                  │
//! │                                                                         │
//! │  5. Initialize State Objects (session starts locked) ─────────────────► │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;

use std::path::PathBuf;

use directories::ProjectDirs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kade_db::{Database, DbConfig};
use state::{AuthState, BillingState, ConfigState, DbState, Launcher, ViewsState};

/// Database file name inside the platform data directory.
pub const DATABASE_FILE_NAME: &str = "kade.db";

/// Every piece of state, created once at startup.
pub struct App {
    pub config: ConfigState,
    pub auth: AuthState,
    pub db: DbState,
    pub billing: BillingState,
    pub views: ViewsState,
    pub launcher: Box<dyn Launcher>,
}

impl App {
    /// Opens the configured database and builds the state.
    pub async fn open(
        config: ConfigState,
        launcher: Box<dyn Launcher>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let db_path = get_database_path(&config)?;
        info!(?db_path, "Database path determined");

        let db = Database::new(DbConfig::new(db_path)).await?;
        info!("Database connected and migrations applied");

        Ok(App::with_database(config, db, launcher))
    }

    /// Builds the state around an already-open database.
    pub fn with_database(config: ConfigState, db: Database, launcher: Box<dyn Launcher>) -> Self {
        App {
            auth: AuthState::new(config.pin.clone()),
            db: DbState::new(db),
            billing: BillingState::from_config(&config),
            views: ViewsState::new(),
            launcher,
            config,
        }
    }

    /// Borrows what checkout needs.
    pub fn checkout_context(&self) -> commands::billing::CheckoutContext<'_> {
        commands::billing::CheckoutContext {
            auth: &self.auth,
            db: &self.db,
            views: &self.views,
            billing: &self.billing,
            config: &self.config,
            launcher: self.launcher.as_ref(),
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=kade=trace` - Show trace for kade crates only
/// - Default: `info,kade=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kade=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Determines the database file path.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.kade.pos/kade.db`
/// - **Windows**: `%APPDATA%\kade\pos\data\kade.db`
/// - **Linux**: `~/.local/share/pos/kade.db`
///
/// ## Override
/// `database_path` in `kade.toml` or the `KADE_DB_PATH` environment
/// variable.
pub fn get_database_path(config: &ConfigState) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(path) = &config.database_path {
        return Ok(path.clone());
    }

    let proj_dirs = ProjectDirs::from("com", "kade", "pos")
        .ok_or("Could not determine app data directory")?;

    let data_dir = proj_dirs.data_dir();

    // Create directory if it doesn't exist
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join(DATABASE_FILE_NAME))
}
