//! This file defines the route for handling log-in requests.

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::{TokenKeys, encode_token, find_user_by_email, touch_user},
    store::Store,
};

/// The state needed to log in a user.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The document store.
    pub store: Store,
    /// The keys used to sign tokens.
    pub token_keys: TokenKeys,
    /// How long issued tokens are valid for.
    pub token_duration: Duration,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            token_keys: state.token_keys.clone(),
            token_duration: state.token_duration,
        }
    }
}

/// The email and password entered when logging in or registering.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    /// The user's email.
    #[serde(default)]
    pub email: Option<String>,
    /// The user's raw password.
    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    /// Get the trimmed email and the password, or a validation error if either is missing or empty.
    pub fn required(&self) -> Result<(&str, &str), Error> {
        let email = self.email.as_deref().map(str::trim).unwrap_or_default();
        let password = self.password.as_deref().unwrap_or_default();

        if email.is_empty() || password.is_empty() {
            return Err(Error::Validation("Email and password required".to_owned()));
        }

        Ok((email, password))
    }
}

/// The response body for a successful log-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The signed bearer token.
    pub token: String,
}

/// Handler for log-in requests.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The email or password is missing or empty.
/// - The email does not belong to a registered user.
/// - The password is not correct.
/// - An internal error occurred when verifying the password or signing the token.
pub async fn post_log_in(
    State(state): State<LoginState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<TokenResponse>, Error> {
    let Json(credentials) = body?;
    let (email, password) = credentials.required()?;

    let user = state
        .store
        .read(|document| find_user_by_email(email, document).cloned())?
        .ok_or(Error::InvalidCredentials)?;

    if !user.password_hash.verify(password)? {
        tracing::debug!("Wrong password for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let now = OffsetDateTime::now_utc();
    state
        .store
        .with_store(|document| touch_user(user.id, now, document))
        .map_err(|error| match error {
            // The user was removed between the lookup and now.
            Error::NotFound => Error::InvalidCredentials,
            error => error,
        })?;

    let token = encode_token(&user, now, state.token_duration, &state.token_keys)?;
    tracing::info!("User {} logged in", user.id);

    Ok(Json(TokenResponse { token }))
}
