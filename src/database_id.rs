//! Database ID type definitions.

/// Alias for the integer type used for transaction IDs.
pub type TransactionId = i64;

/// Alias for the integer type used for category IDs.
pub type CategoryId = i64;
