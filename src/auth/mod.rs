//! Registration, log-in, bearer tokens and the middleware that guards protected routes.

mod log_in;
mod middleware;
mod password;
mod register_user;
mod token;
mod user;

pub use log_in::{Credentials, TokenResponse, post_log_in};
pub use middleware::{AuthState, AuthenticatedUser, auth_guard};
pub use password::{PasswordHash, ValidatedPassword};
pub use register_user::{
    DEMO_USER_EMAIL, DEMO_USER_PASSWORD, register, register_user, seed_demo_user,
};
pub use token::{DEFAULT_TOKEN_DURATION, TokenKeys, decode_token, encode_token};
pub use user::{
    User, UserID, create_user, find_user_by_email, get_user_by_id, get_user_count,
    remove_inactive_users, touch_user,
};
