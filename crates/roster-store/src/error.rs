//! Error types for the candidate store.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during candidate store operations.
///
/// "Not found" is never an error — absent records surface as `false` or
/// empty results from the operations themselves.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Bad caller input (empty email, empty connection string).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A conditional write lost to a concurrent writer on the same row.
    #[error("version conflict on row `{0}`")]
    Conflict(String),

    /// The storage backend failed; propagated with operation context,
    /// never retried internally.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Convert any `Display` error into `StoreError::Unavailable` with
/// operation context via a closure factory.
macro_rules! store_err {
    ($op:literal) => {
        |e| $crate::error::StoreError::Unavailable(format!("{}: {e}", $op))
    };
}

pub(crate) use store_err;
