use thiserror::Error;
use types::DocumentId;

/// Errors raised by the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("document encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("product code '{0}' already exists")]
    DuplicateCode(String),

    #[error("user '{0}' already exists")]
    DuplicateEmail(String),

    #[error("product {0} not found")]
    ProductNotFound(DocumentId),

    #[error("cart {0} not found")]
    CartNotFound(DocumentId),

    #[error("product {0} is not in the cart")]
    ProductNotInCart(DocumentId),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Whether a sqlite error is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
