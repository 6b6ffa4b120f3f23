//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::{
    AppState, Error,
    account::get_account,
    auth::{auth_guard, get_user_count, post_log_in, register_user},
    cleanup::post_cleanup,
    endpoints,
    temp_store::{get_temp, post_temp},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_transactions,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_health))
        .route(endpoints::REGISTER, post(register_user))
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::USER_COUNT, get(get_user_count))
        .route(endpoints::TEMP, post(post_temp))
        .route(endpoints::TEMP_ENTRY, get(get_temp));

    let protected_routes = Router::new()
        .route(endpoints::ACCOUNT, get(get_account))
        .route(
            endpoints::EXPENSES,
            get(get_transactions).post(create_transaction_endpoint),
        )
        .route(
            endpoints::EXPENSE,
            put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(endpoints::CLEANUP, post(post_cleanup))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// A plain-text health check.
async fn get_health() -> &'static str {
    "OK"
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}
