use axum::{Json, extract::State};

use crate::{Error, store::Store, transaction::Transaction};

/// A route handler for listing all transactions in insertion order.
pub async fn get_transactions(State(store): State<Store>) -> Result<Json<Vec<Transaction>>, Error> {
    store
        .read(|document| document.expenses.clone())
        .map(Json)
}
