//! This file defines the registration route and the functions that add users to the store.

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use email_address::EmailAddress;
use time::OffsetDateTime;

use crate::{
    AppState, Error, Message,
    auth::{Credentials, PasswordHash, User, ValidatedPassword, create_user, find_user_by_email},
    store::Store,
};

/// The email of the optional demo user.
pub const DEMO_USER_EMAIL: &str = "demo@local";
/// The password of the optional demo user.
pub const DEMO_USER_PASSWORD: &str = "demo123";

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The document store.
    pub store: Store,
    /// The bcrypt cost used when hashing new passwords.
    pub password_cost: u32,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            password_cost: state.password_cost,
        }
    }
}

/// Validate `email` and `password`, hash the password and add the user to `store`.
///
/// The password is hashed before the store lock is taken.
///
/// # Errors
///
/// Returns [Error::Validation] if the email is malformed or the password empty,
/// [Error::DuplicateEmail] if the email is taken, or an internal error if
/// hashing or the store fails.
pub fn register(store: &Store, email: &str, password: &str, cost: u32) -> Result<User, Error> {
    let email = email.trim();

    if !EmailAddress::is_valid(email) {
        return Err(Error::Validation("Invalid email".to_owned()));
    }

    let password_hash = PasswordHash::new(ValidatedPassword::new(password)?, cost)?;
    let now = OffsetDateTime::now_utc();

    store.with_store(|document| create_user(email, password_hash, now, document))
}

/// Create the demo user if it does not exist yet.
///
/// Returns the new user, or `None` if the demo user was already registered.
///
/// # Errors
///
/// Returns an error if hashing or the store fails.
pub fn seed_demo_user(store: &Store, cost: u32) -> Result<Option<User>, Error> {
    if store.read(|document| find_user_by_email(DEMO_USER_EMAIL, document).is_some())? {
        return Ok(None);
    }

    let password_hash =
        PasswordHash::new(ValidatedPassword::new_unchecked(DEMO_USER_PASSWORD), cost)?;
    let now = OffsetDateTime::now_utc();

    match store.with_store(|document| create_user(DEMO_USER_EMAIL, password_hash, now, document)) {
        Ok(user) => Ok(Some(user)),
        Err(Error::DuplicateEmail) => Ok(None),
        Err(error) => Err(error),
    }
}

/// A route handler for creating a new user.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The email or password is missing or empty.
/// - The email is not a valid email address.
/// - The email is already in use.
/// - An internal error occurred when hashing the password or saving the store.
pub async fn register_user(
    State(state): State<RegistrationState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<Message>), Error> {
    let Json(credentials) = body?;
    let (email, password) = credentials.required()?;

    let user = register(&state.store, email, password, state.password_cost)?;
    tracing::info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(Message::new("User registered successfully")),
    ))
}
