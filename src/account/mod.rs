mod core;
mod endpoint;

pub use core::Account;
pub use endpoint::get_account;
