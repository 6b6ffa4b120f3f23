//! Defines the endpoint for reading the account.

use axum::{Json, extract::State};

use crate::{Error, account::Account, store::Store};

/// A route handler for getting the account balance and profile.
pub async fn get_account(State(store): State<Store>) -> Result<Json<Account>, Error> {
    store
        .read(|document| document.account.clone())
        .map(Json)
}
