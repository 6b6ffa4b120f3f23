//! The JSON document that holds all persisted application state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    Account, TransactionId, User, UserID, temp_store::TempEntry, transaction::Transaction,
};

/// Everything the application persists, saved as a single JSON object.
///
/// The top-level keys are `users`, `expenses` and `account`. The ID counters
/// record the highest ID ever issued so that deleted IDs are never reused.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Registered users.
    #[serde(default)]
    pub users: Vec<User>,
    /// Transactions in insertion order.
    #[serde(default)]
    pub expenses: Vec<Transaction>,
    /// The account whose balance tracks the transactions.
    #[serde(default)]
    pub account: Account,
    /// The highest user ID issued so far.
    #[serde(default)]
    pub next_user_id: u64,
    /// The highest transaction ID issued so far.
    #[serde(default)]
    pub next_expense_id: TransactionId,
    /// Short-lived key/value entries.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub temp: BTreeMap<String, TempEntry>,
}

impl Document {
    /// Issue a transaction ID strictly greater than any existing or previously issued ID.
    pub fn allocate_transaction_id(&mut self) -> TransactionId {
        let highest_existing = self.expenses.iter().map(|t| t.id).max().unwrap_or(0);
        self.next_expense_id = self.next_expense_id.max(highest_existing) + 1;

        self.next_expense_id
    }

    /// Issue a user ID strictly greater than any existing or previously issued ID.
    pub fn allocate_user_id(&mut self) -> UserID {
        let highest_existing = self
            .users
            .iter()
            .map(|user| user.id.as_u64())
            .max()
            .unwrap_or(0);
        self.next_user_id = self.next_user_id.max(highest_existing) + 1;

        UserID::new(self.next_user_id)
    }
}
