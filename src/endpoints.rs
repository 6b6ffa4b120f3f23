//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/expenses/{expense_id}', use [format_endpoint].

use std::fmt::Display;

/// The root route, used as a health check.
pub const ROOT: &str = "/";
/// The route for registering a new user.
pub const REGISTER: &str = "/register";
/// The route for logging in a user and receiving a bearer token.
pub const LOG_IN: &str = "/login";
/// The route for the account balance and profile.
pub const ACCOUNT: &str = "/account";
/// The route to list and create expenses.
pub const EXPENSES: &str = "/expenses";
/// The route to update or delete a single expense.
pub const EXPENSE: &str = "/expenses/{expense_id}";
/// The route for the number of registered users.
pub const USER_COUNT: &str = "/users/count";
/// The route to save temporary data.
pub const TEMP: &str = "/temp";
/// The route to fetch temporary data by its key.
pub const TEMP_ENTRY: &str = "/temp/{key}";
/// The route to trigger the inactivity sweep manually.
pub const CLEANUP: &str = "/cleanup";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/expenses/{expense_id}', '{expense_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
