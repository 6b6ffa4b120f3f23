//! Defines the user model and the document operations on users.

use std::fmt::Display;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::PasswordHash, store::Document, store::Store};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct UserID(u64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
///
/// The caller should ensure that `id` and `email` are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The user's ID.
    pub id: UserID,
    /// The email the user registered with.
    pub email: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// When the user last registered or logged in.
    #[serde(with = "time::serde::rfc3339")]
    pub last_active: OffsetDateTime,
}

/// Add a new user to `document`.
///
/// # Errors
///
/// Returns [Error::DuplicateEmail] if a user with the same email (ignoring case) exists.
pub fn create_user(
    email: &str,
    password_hash: PasswordHash,
    now: OffsetDateTime,
    document: &mut Document,
) -> Result<User, Error> {
    if find_user_by_email(email, document).is_some() {
        return Err(Error::DuplicateEmail);
    }

    let user = User {
        id: document.allocate_user_id(),
        email: email.to_owned(),
        password_hash,
        last_active: now,
    };
    document.users.push(user.clone());

    Ok(user)
}

/// Find the user whose email matches `email`, ignoring case.
pub fn find_user_by_email<'a>(email: &str, document: &'a Document) -> Option<&'a User> {
    document
        .users
        .iter()
        .find(|user| user.email.eq_ignore_ascii_case(email))
}

/// Get the user with the given ID.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such user.
pub fn get_user_by_id(id: UserID, document: &Document) -> Result<&User, Error> {
    document
        .users
        .iter()
        .find(|user| user.id == id)
        .ok_or(Error::NotFound)
}

/// Record that the user with `id` was active at `now`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such user.
pub fn touch_user(id: UserID, now: OffsetDateTime, document: &mut Document) -> Result<(), Error> {
    let user = document
        .users
        .iter_mut()
        .find(|user| user.id == id)
        .ok_or(Error::NotFound)?;
    user.last_active = now;

    Ok(())
}

/// Remove users whose last activity is older than `max_inactivity` and return how many were removed.
///
/// Nobody is removed if `now - max_inactivity` is before the earliest representable date.
pub fn remove_inactive_users(
    max_inactivity: Duration,
    now: OffsetDateTime,
    document: &mut Document,
) -> usize {
    let Some(cutoff) = now.checked_sub(max_inactivity) else {
        return 0;
    };
    let count_before = document.users.len();
    document.users.retain(|user| user.last_active >= cutoff);

    count_before - document.users.len()
}

/// Get the number of registered users.
pub fn count_users(document: &Document) -> usize {
    document.users.len()
}

/// The response body for the user count endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCount {
    /// The number of registered users.
    pub count: usize,
}

/// A route handler that returns the number of registered users.
pub async fn get_user_count(State(store): State<Store>) -> Result<Json<UserCount>, Error> {
    let count = store.read(count_users)?;

    Ok(Json(UserCount { count }))
}
