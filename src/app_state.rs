//! Implements a struct that holds the state of the REST server.

use axum::extract::FromRef;
use time::Duration;

use crate::{
    RetentionPolicy,
    auth::{DEFAULT_TOKEN_DURATION, PasswordHash, TokenKeys},
    store::Store,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The document store holding users, transactions and the account.
    pub store: Store,

    /// The keys used to sign and verify bearer tokens.
    pub token_keys: TokenKeys,

    /// The duration for which issued bearer tokens are valid.
    pub token_duration: Duration,

    /// The bcrypt cost used when hashing new passwords.
    pub password_cost: u32,

    /// How long inactive users and temporary entries are kept.
    pub retention: RetentionPolicy,
}

impl AppState {
    /// Create a new [AppState] with default token duration, password cost and retention.
    ///
    /// `token_secret` is used to sign bearer tokens.
    pub fn new(store: Store, token_secret: &str) -> Self {
        Self {
            store,
            token_keys: TokenKeys::from_secret(token_secret),
            token_duration: DEFAULT_TOKEN_DURATION,
            password_cost: PasswordHash::DEFAULT_COST,
            retention: RetentionPolicy::default(),
        }
    }

    /// Set how long bearer tokens are valid for.
    pub fn with_token_duration(mut self, token_duration: Duration) -> Self {
        self.token_duration = token_duration;
        self
    }

    /// Set the bcrypt cost for new passwords.
    pub fn with_password_cost(mut self, password_cost: u32) -> Self {
        self.password_cost = password_cost;
        self
    }

    /// Set the retention policy used by the cleanup sweep.
    pub fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }
}

impl FromRef<AppState> for Store {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}
