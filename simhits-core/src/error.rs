//! Error types for simhits-core.

use thiserror::Error;

/// Result type alias for simhits operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for simhits operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Value store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors raised while flattening an event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// A configured output field name is empty.
    #[error("output field name for `{field}` is empty")]
    InvalidFieldName { field: &'static str },

    /// Two output fields share a name.
    #[error("output field name `{0}` is used more than once")]
    DuplicateFieldName(String),
}

/// Errors raised when reading values back from a store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The field was never published.
    #[error("field `{0}` not found")]
    MissingField(String),

    /// The field holds a different kind of value.
    #[error("field `{name}` is {found}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    /// An array's length differs from the other hit arrays.
    #[error("field `{name}` has {found} elements, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}
