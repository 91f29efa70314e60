//! # Store Errors
//!
//! Everything that can go wrong between a repository call and the SQLite
//! file, folded into one enum the app layer can match on.
//!
//! ```text
//! sqlx::Error ─────────┐
//! MigrateError ────────┼──► DbError ──► kade_app::ApiError
//! serde_json::Error ───┘       ▲
//!                              └── repositories (not_found on guarded UPDATEs)
//! ```

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// No row matched. Also returned when a settlement targets a sale that
    /// is no longer Pending.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A primary key or UNIQUE column already holds the value, e.g. two
    /// sales stamped with the same millisecond.
    #[error("Duplicate key on {target}")]
    UniqueViolation { target: String },

    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// The file could not be opened, or the pool has been closed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite rejected the statement for any other reason.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A column held something that does not decode, such as a corrupt
    /// purchase-lines JSON blob.
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// Every connection stayed busy past the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Unexpected database error: {0}")]
    Other(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// SQLite reports constraint failures only through message text, e.g.
/// `UNIQUE constraint failed: sales.id`.
fn classify_database_error(message: &str) -> DbError {
    const UNIQUE: &str = "UNIQUE constraint failed: ";

    if let Some(target) = message.split_once(UNIQUE).map(|(_, t)| t) {
        DbError::UniqueViolation {
            target: target.trim().to_string(),
        }
    } else if message.contains("FOREIGN KEY constraint failed") {
        DbError::ForeignKeyViolation(message.to_string())
    } else {
        DbError::QueryFailed(message.to_string())
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "?"),
            sqlx::Error::Database(db_err) => classify_database_error(db_err.message()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DbError::InvalidData(err.to_string())
            }
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool closed".to_string()),
            other => DbError::Other(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::InvalidData(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
