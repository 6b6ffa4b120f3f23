//! Signs and verifies the JSON Web Tokens used as bearer tokens.

use std::fmt::Debug;

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::User, auth::UserID};

/// How long a token is valid for unless configured otherwise.
pub const DEFAULT_TOKEN_DURATION: Duration = Duration::hours(24);

/// The keys used to sign and verify tokens, derived from the server secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    /// Create HS256 keys from a shared `secret`.
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys").finish_non_exhaustive()
    }
}

/// The contents of a JSON Web Token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to, as a string.
    pub sub: String,
    /// Email associated with the token.
    pub email: String,
    /// The time the token was issued, in seconds since the Unix epoch.
    pub iat: i64,
    /// The expiry time of the token, in seconds since the Unix epoch.
    pub exp: i64,
}

impl Claims {
    /// The user ID stored in `sub`, or `None` if it is not a number.
    pub fn user_id(&self) -> Option<UserID> {
        self.sub.parse().ok().map(UserID::new)
    }
}

/// Create a signed token for `user` that expires `duration` after `now`.
///
/// # Errors
///
/// Returns [Error::TokenCreation] if the expiry is out of range or the token could not be signed.
pub fn encode_token(
    user: &User,
    now: OffsetDateTime,
    duration: Duration,
    keys: &TokenKeys,
) -> Result<String, Error> {
    let expires_at = now
        .checked_add(duration)
        .ok_or_else(|| Error::TokenCreation(format!("expiry {duration} is out of range")))?;
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        iat: now.unix_timestamp(),
        exp: expires_at.unix_timestamp(),
    };

    encode(&Header::default(), &claims, &keys.encoding)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Verify the signature and expiry of `token` and return its claims.
///
/// # Errors
///
/// Returns [Error::InvalidToken] if the token is malformed, expired or was
/// signed with a different secret.
pub fn decode_token(token: &str, keys: &TokenKeys) -> Result<Claims, Error> {
    decode::<Claims>(token, &keys.decoding, &Validation::default())
        .map(|token_data| token_data.claims)
        .map_err(|error| {
            tracing::debug!("Rejected token: {error}");
            Error::InvalidToken
        })
}
