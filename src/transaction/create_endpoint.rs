//! Defines the endpoint for creating a new transaction.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    Error,
    store::Store,
    transaction::{Direction, Transaction, TransactionBuilder, create_transaction},
};

/// The JSON body for creating a transaction.
///
/// Every field is optional here so that a missing field produces a
/// `{"message": ...}` validation error rather than a plain-text rejection.
#[derive(Debug, Deserialize)]
pub struct NewTransactionData {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    direction: Option<Direction>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    date: Option<OffsetDateTime>,
}

fn required_text(value: Option<String>, field_name: &str) -> Result<String, Error> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(Error::Validation(format!("{field_name} is required"))),
    }
}

impl TryFrom<NewTransactionData> for TransactionBuilder {
    type Error = Error;

    fn try_from(data: NewTransactionData) -> Result<Self, Self::Error> {
        let kind = required_text(data.kind, "type")?;
        let amount = data
            .amount
            .ok_or_else(|| Error::Validation("amount is required".to_owned()))?;
        let location = required_text(data.location, "location")?;

        Ok(Transaction::build(&kind, amount, &location)
            .direction(data.direction)
            .date(data.date))
    }
}

/// A route handler for creating a new transaction.
///
/// The account balance is updated in the same store write as the new transaction.
pub async fn create_transaction_endpoint(
    State(store): State<Store>,
    body: Result<Json<NewTransactionData>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let Json(data) = body?;
    let builder = TransactionBuilder::try_from(data)?;
    let now = OffsetDateTime::now_utc();

    let transaction = store.with_store(|document| create_transaction(builder, now, document))?;
    tracing::debug!(
        "Created transaction {} ({:?} {})",
        transaction.id,
        transaction.direction,
        transaction.amount
    );

    Ok((StatusCode::CREATED, Json(transaction)))
}
