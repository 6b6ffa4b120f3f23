#![allow(missing_docs)]

//! Fixtures shared by the endpoint tests.

use axum_test::TestServer;
use serde_json::json;
use time::OffsetDateTime;

use crate::{
    Account, AppState,
    auth::{PasswordHash, TokenResponse, ValidatedPassword, create_user},
    build_router, endpoints,
    store::{Document, Store},
};

pub(crate) const TEST_EMAIL: &str = "test@test.com";
pub(crate) const TEST_PASSWORD: &str = "averysafeandsecurepassword";
pub(crate) const TEST_SECRET: &str = "foobar";
/// The lowest bcrypt cost, to keep tests fast.
pub(crate) const TEST_PASSWORD_COST: u32 = 4;

/// A document with one registered user and an account with `balance`.
pub(crate) fn seeded_document(balance: f64) -> Document {
    let mut document = Document {
        account: Account {
            balance,
            owner: "Test Owner".to_owned(),
            bank: "Test Bank".to_owned(),
            country: "New Zealand".to_owned(),
        },
        ..Default::default()
    };
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(TEST_PASSWORD),
        TEST_PASSWORD_COST,
    )
    .expect("Could not hash test password");
    create_user(
        TEST_EMAIL,
        password_hash,
        OffsetDateTime::now_utc(),
        &mut document,
    )
    .expect("Could not create test user");

    document
}

pub(crate) fn test_state(document: Document) -> AppState {
    AppState::new(Store::in_memory(document), TEST_SECRET).with_password_cost(TEST_PASSWORD_COST)
}

pub(crate) struct TestApp {
    pub server: TestServer,
    pub store: Store,
    pub token: String,
}

/// Serve the full router over `document` and log in as the test user.
pub(crate) async fn test_app(document: Document) -> TestApp {
    let state = test_state(document);
    let store = state.store.clone();
    let server = TestServer::try_new(build_router(state)).expect("Could not create test server.");
    let token = log_in(&server, TEST_EMAIL, TEST_PASSWORD).await;

    TestApp {
        server,
        store,
        token,
    }
}

pub(crate) async fn test_server_with_token(document: Document) -> (TestServer, String) {
    let TestApp { server, token, .. } = test_app(document).await;

    (server, token)
}

pub(crate) async fn log_in(server: &TestServer, email: &str, password: &str) -> String {
    let response = server
        .post(endpoints::LOG_IN)
        .json(&json!({ "email": email, "password": password }))
        .await;
    response.assert_status_ok();

    response.json::<TokenResponse>().token
}
