//! Defines the endpoint for updating a transaction.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};

use crate::{
    Error,
    record_id::parse_transaction_id,
    store::Store,
    transaction::{Transaction, TransactionPatch, update_transaction},
};

/// A route handler for applying a partial update to a transaction.
///
/// The account balance moves by the difference between the transaction's new
/// and old signed amounts.
pub async fn edit_transaction_endpoint(
    State(store): State<Store>,
    Path(raw_id): Path<String>,
    body: Result<Json<TransactionPatch>, JsonRejection>,
) -> Result<Json<Transaction>, Error> {
    let Json(patch) = body?;
    let transaction_id = parse_transaction_id(&raw_id).ok_or(Error::UpdateMissingTransaction)?;

    let transaction =
        store.with_store(|document| update_transaction(transaction_id, patch, document))?;
    tracing::debug!("Updated transaction {transaction_id}");

    Ok(Json(transaction))
}
