use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    Error, record_id::parse_transaction_id, store::Store, transaction::delete_transaction,
};

/// A route handler for deleting a transaction, responds with 204 No Content.
///
/// The transaction's signed amount is reversed out of the account balance in
/// the same store write.
pub async fn delete_transaction_endpoint(
    State(store): State<Store>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, Error> {
    let transaction_id = parse_transaction_id(&raw_id).ok_or(Error::DeleteMissingTransaction)?;

    let removed = store.with_store(|document| delete_transaction(transaction_id, document))?;
    tracing::debug!(
        "Deleted transaction {} ({:?} {})",
        removed.id,
        removed.direction,
        removed.amount
    );

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{TestApp, seeded_document, test_app},
        transaction::Transaction,
    };

    #[tokio::test]
    async fn delete_restores_balance() {
        let TestApp { server, store, token } = test_app(seeded_document(500.0)).await;
        let transaction = server
            .post(endpoints::EXPENSES)
            .authorization_bearer(&token)
            .json(&json!({ "type": "Food", "amount": -75, "location": "Kyiv" }))
            .await
            .json::<Transaction>();
        assert_eq!(store.read(|d| d.account.balance).unwrap(), 425.0);

        server
            .delete(&format_endpoint(endpoints::EXPENSE, transaction.id))
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        assert_eq!(store.read(|d| d.account.balance).unwrap(), 500.0);
        assert!(store.read(|d| d.expenses.is_empty()).unwrap());
    }

    #[tokio::test]
    async fn deleting_twice_is_not_found() {
        let TestApp { server, store, token } = test_app(seeded_document(0.0)).await;
        let transaction = server
            .post(endpoints::EXPENSES)
            .authorization_bearer(&token)
            .json(&json!({ "type": "Salary", "amount": 30, "location": "Work" }))
            .await
            .json::<Transaction>();
        let path = format_endpoint(endpoints::EXPENSE, transaction.id);

        server
            .delete(&path)
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .delete(&path)
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NOT_FOUND);

        assert_eq!(store.read(|d| d.account.balance).unwrap(), 0.0);
    }

    #[tokio::test]
    async fn fails_without_token() {
        let TestApp { server, .. } = test_app(seeded_document(0.0)).await;

        server
            .delete(&format_endpoint(endpoints::EXPENSE, 1))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
