//! Pocketbook is a small personal-finance API.
//!
//! It tracks a single account balance and a list of transactions ("expenses"),
//! keeping the balance consistent with the signed sum of the transaction
//! amounts. All state lives in one JSON document on disk.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::{Deserialize, Serialize};
use tokio::signal;

mod account;
mod app_state;
mod auth;
mod cleanup;
pub mod endpoints;
mod logging;
mod record_id;
mod routing;
pub mod store;
mod temp_store;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use account::Account;
pub use app_state::AppState;
pub use auth::{
    AuthenticatedUser, DEMO_USER_EMAIL, DEMO_USER_PASSWORD, PasswordHash, TokenKeys,
    TokenResponse, User, UserID, ValidatedPassword, register, seed_demo_user,
};
pub use cleanup::{RetentionPolicy, SweepReport, run_periodic_sweep, sweep};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use record_id::TransactionId;
pub use routing::build_router;
pub use transaction::{
    Direction, Transaction, TransactionBuilder, create_transaction, recompute_balance,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not install the Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate_signal) => {
                terminate_signal.recv().await;
            }
            Err(error) => {
                tracing::error!("Could not install the terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The JSON body used for error responses and simple acknowledgements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// A human readable description of what happened.
    pub message: String,
}

impl Message {
    /// Create a message body from any string-like value.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request was missing a required field or a field had an invalid value.
    #[error("{0}")]
    Validation(String),

    /// The email used to register is already in use.
    #[error("User already exists")]
    DuplicateEmail,

    /// The email and password did not match a registered user.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A protected route was requested without a bearer token.
    #[error("No token")]
    MissingToken,

    /// The bearer token was malformed, expired, not signed by this server, or
    /// belongs to a user that no longer exists.
    #[error("Invalid token")]
    InvalidToken,

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist
    #[error("Expense not found")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("Expense not found")]
    DeleteMissingTransaction,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A bearer token could not be created.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// The store file could not be read or written.
    #[error("store I/O failed: {0}")]
    StoreIo(String),

    /// The store document could not be serialized or deserialized as JSON.
    #[error("store document is not valid JSON: {0}")]
    StoreFormat(String),

    /// Could not acquire the store lock
    #[error("could not acquire the store lock")]
    StoreLock,
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::DuplicateEmail => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials | Error::MissingToken | Error::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            Error::NotFound | Error::UpdateMissingTransaction | Error::DeleteMissingTransaction => {
                StatusCode::NOT_FOUND
            }
            Error::HashingError(_)
            | Error::TokenCreation(_)
            | Error::StoreIo(_)
            | Error::StoreFormat(_)
            | Error::StoreLock => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal errors are logged but not shown to the client.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self);
            "Internal server error".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(Message::new(message))).into_response()
    }
}
