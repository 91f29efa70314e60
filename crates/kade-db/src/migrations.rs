//! # Schema Migrations
//!
//! The SQL files under `migrations/sqlite/` at the workspace root are
//! compiled into the binary, so a till never needs the files on disk.
//!
//! ```text
//! 001_initial_schema.sql   products, sales, sale_items, purchases, shop_profile
//! ```
//!
//! sqlx records each applied file in `_sqlx_migrations` with a checksum.
//! Editing an applied file breaks that checksum on every existing shop
//! database; schema changes always go in a new, higher-numbered file.

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies whatever has not been applied yet.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;

    info!(embedded = MIGRATOR.migrations.len(), "Schema up to date");
    Ok(())
}

/// (embedded, applied). Applied is 0 before the first run, since the
/// bookkeeping table does not exist yet.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let embedded = MIGRATOR.migrations.len();

    let applied = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "Migration table not readable");
            0
        });

    Ok((embedded, usize::try_from(applied).unwrap_or(0)))
}
