//! # Errors
//!
//! Rule violations raised by the billing engine and the credit ledger, and
//! the input checks in [`crate::validation`]. None of these involve I/O;
//! storage failures live in `kade-db`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Cart is empty")]
    EmptyCart,

    /// A credit sale without someone to collect from.
    ///
    /// ```text
    /// method Credit, name "Jane", contact ""
    ///      └──► CreditCustomerRequired { field: "customer contact" }
    /// ```
    #[error("Customer name and contact are mandatory for credit sales ({field} missing)")]
    CreditCustomerRequired { field: String },

    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),

    /// Settlement only moves Pending to Paid.
    #[error("Sale {sale_id} is {current_status}, cannot perform operation")]
    InvalidSaleStatus {
        sale_id: String,
        current_status: String,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Rejected input on back-office forms (products, purchases, profile).
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
