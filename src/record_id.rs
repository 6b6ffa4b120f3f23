//! Identifier types for records in the store.

/// Alias for the integer type used for transaction IDs.
pub type TransactionId = u64;

/// Parse a transaction ID from a URL path segment.
///
/// Returns `None` for anything that is not a non-negative integer, which callers
/// treat the same as an ID that does not exist.
pub fn parse_transaction_id(raw_id: &str) -> Option<TransactionId> {
    raw_id.trim().parse().ok()
}
