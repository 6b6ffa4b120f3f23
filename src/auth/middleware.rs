//! Authentication middleware that validates bearer tokens.

use axum::{
    RequestPartsExt,
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{
    AppState, Error,
    auth::{TokenKeys, UserID, decode_token, get_user_by_id},
    store::Store,
};

/// The state needed for the auth middleware
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The document store, used to check that the token's user still exists.
    pub store: Store,
    /// The keys used to verify tokens.
    pub token_keys: TokenKeys,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            token_keys: state.token_keys.clone(),
        }
    }
}

/// The user a request was authenticated as.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    /// The user's ID.
    pub id: UserID,
    /// The user's email.
    pub email: String,
}

async fn authenticate(state: &AuthState, request: Request) -> Result<Request, Error> {
    let (mut parts, body) = request.into_parts();

    let TypedHeader(Authorization(bearer)) = parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|rejection| {
            if rejection.is_missing() {
                Error::MissingToken
            } else {
                Error::InvalidToken
            }
        })?;

    let claims = decode_token(bearer.token(), &state.token_keys)?;
    let user_id = claims.user_id().ok_or(Error::InvalidToken)?;
    let user = state
        .store
        .read(|document| {
            get_user_by_id(user_id, document).map(|user| AuthenticatedUser {
                id: user.id,
                email: user.email.clone(),
            })
        })?
        .map_err(|_| Error::InvalidToken)?;

    parts.extensions.insert(user);

    Ok(Request::from_parts(parts, body))
}

/// Middleware function that checks for a valid bearer token.
///
/// The [AuthenticatedUser] is placed into the request and the request executed normally if the
/// token is valid, otherwise a 401 response with a JSON message is returned.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(user): Extension<AuthenticatedUser>` to receive the user.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    match authenticate(&state, request).await {
        Ok(request) => next.run(request).await,
        Err(error) => error.into_response(),
    }
}
