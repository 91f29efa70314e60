//! # Command Errors
//!
//! The single error type every command returns.
//!
//! ## Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CoreError::EmptyCart ─────────────────┐                                │
//! │  CoreError::CreditCustomerRequired ────┤                                │
//! │  ValidationError ──────────────────────┼──► VALIDATION_ERROR            │
//! │  DbError::UniqueViolation ─────────────┘                                │
//! │                                                                         │
//! │  CoreError::ItemNotInCart ─────────────────► CART_ERROR                 │
//! │  CoreError::InvalidSaleStatus ─────────────► BUSINESS_LOGIC             │
//! │  DbError::NotFound ────────────────────────► NOT_FOUND                  │
//! │  every other DbError ──────────────────────► DATABASE_ERROR             │
//! │                                                                         │
//! │  AuthState (locked) ───────────────────────► LOCKED                     │
//! │  BillingState (checkout in flight) ────────► BUSY                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage details stay in the log; the frontend gets a short message it can
//! show as is, plus a code it can branch on:
//!
//! ```json
//! { "code": "VALIDATION_ERROR", "message": "Cart is empty" }
//! ```

use std::fmt;

use serde::Serialize;
use tracing::error;

use kade_core::{CoreError, ValidationError};
use kade_db::DbError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    /// Bad input; nothing was written.
    ValidationError,
    /// The write or read did not reach the store; retrying may work.
    DatabaseError,
    /// A rule refused the operation, e.g. settling a paid sale.
    BusinessLogic,
    CartError,
    Locked,
    Busy,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }

    pub fn locked() -> Self {
        ApiError::new(ErrorCode::Locked, "Session is locked")
    }

    pub fn busy() -> Self {
        ApiError::new(ErrorCode::Busy, "A checkout is already in progress")
    }

    fn storage(message: &str) -> Self {
        ApiError::new(ErrorCode::DatabaseError, message)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { target } => {
                ApiError::validation(format!("A record with this {} already exists", target))
            }
            DbError::ForeignKeyViolation(detail) => {
                error!(%detail, "Foreign key violation");
                ApiError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(_) => ApiError::storage("Database connection failed"),
            DbError::PoolExhausted => ApiError::storage("Database is busy, try again"),
            DbError::MigrationFailed(detail) => {
                error!(%detail, "Migration failed");
                ApiError::storage("Database migration failed")
            }
            DbError::InvalidData(detail) => {
                error!(%detail, "Stored data could not be decoded");
                ApiError::storage("Stored data is corrupt")
            }
            DbError::QueryFailed(detail) | DbError::Other(detail) => {
                error!(%detail, "Database operation failed");
                ApiError::storage("Database operation failed")
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EmptyCart => ApiError::validation("Cart is empty"),
            CoreError::CreditCustomerRequired { .. } => ApiError::validation(
                "Customer Name and Contact are mandatory for Credit sales.",
            ),
            CoreError::ItemNotInCart(id) => ApiError::cart(format!("Item not in cart: {}", id)),
            CoreError::InvalidSaleStatus {
                sale_id,
                current_status,
            } => ApiError::new(
                ErrorCode::BusinessLogic,
                format!("Sale {} is already {}", sale_id, current_status),
            ),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
