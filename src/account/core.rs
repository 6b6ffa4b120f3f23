//! Defines the account whose balance tracks the transactions.

use serde::{Deserialize, Serialize};

use crate::Error;

/// The single account of a deployment.
///
/// `balance` is kept equal to the seeded balance plus the signed sum of all
/// live transactions. Only the transaction functions should change it, and
/// always through [Account::apply_delta].
///
/// Amounts are `f64`, so the running balance and a fresh sum of the same
/// transactions agree only up to floating point rounding (e.g. `0.1 + 0.2`).
/// The balance is always finite, since JSON cannot store infinity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The amount of money in the account.
    pub balance: f64,
    /// The name of the account holder.
    #[serde(default)]
    pub owner: String,
    /// The bank that holds the account.
    #[serde(default)]
    pub bank: String,
    /// The country the account is held in.
    #[serde(default)]
    pub country: String,
}

impl Account {
    /// Add a signed `delta` to the balance.
    ///
    /// # Errors
    /// Returns [Error::Validation] and leaves the balance unchanged if the new
    /// balance would not be a finite number.
    pub fn apply_delta(&mut self, delta: f64) -> Result<(), Error> {
        let balance = self.balance + delta;

        if !balance.is_finite() {
            return Err(Error::Validation(
                "amount would take the balance out of range".to_owned(),
            ));
        }

        self.balance = balance;

        Ok(())
    }
}
