//! Defines the core data models for transactions and the ledger operations
//! that keep the account balance in step with them.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, record_id::TransactionId, store::Document};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money entered or left the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Money received, e.g. a salary.
    In,
    /// Money spent, e.g. groceries.
    Out,
}

impl Direction {
    /// The direction implied by the sign of `amount`: positive amounts are
    /// incoming, zero and negative amounts are outgoing.
    pub fn from_amount(amount: f64) -> Self {
        if amount > 0.0 {
            Direction::In
        } else {
            Direction::Out
        }
    }

    fn sign(self) -> f64 {
        match self {
            Direction::In => 1.0,
            Direction::Out => -1.0,
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// What kind of transaction this is, e.g. "Groceries" or "Salary".
    #[serde(rename = "type")]
    pub kind: String,
    /// The magnitude of the transaction. Never negative.
    pub amount: f64,
    /// Whether the money came in or went out.
    pub direction: Direction,
    /// Where the transaction happened.
    pub location: String,
    /// When the transaction happened.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder::new] for discoverability.
    pub fn build(kind: &str, amount: f64, location: &str) -> TransactionBuilder {
        TransactionBuilder::new(kind, amount, location)
    }

    /// The amount this transaction contributes to the account balance.
    pub fn signed_amount(&self) -> f64 {
        self.direction.sign() * self.amount
    }
}

/// A builder for creating [Transaction] instances.
///
/// `amount` may be signed. If no direction is set, the sign of `amount`
/// decides it, and the stored amount is always the magnitude.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBuilder {
    /// What kind of transaction this is.
    pub kind: String,
    /// The signed or unsigned amount.
    pub amount: f64,
    /// The direction, if the caller chose one explicitly.
    pub direction: Option<Direction>,
    /// Where the transaction happened.
    pub location: String,
    /// When the transaction happened. Defaults to the creation time.
    pub date: Option<OffsetDateTime>,
}

impl TransactionBuilder {
    /// Start building a transaction with the required fields.
    pub fn new(kind: &str, amount: f64, location: &str) -> Self {
        Self {
            kind: kind.to_owned(),
            amount,
            direction: None,
            location: location.to_owned(),
            date: None,
        }
    }

    /// Set the direction explicitly.
    pub fn direction(mut self, direction: Option<Direction>) -> Self {
        self.direction = direction;
        self
    }

    /// Set the date of the transaction.
    pub fn date(mut self, date: Option<OffsetDateTime>) -> Self {
        self.date = date;
        self
    }
}

/// The fields of a transaction to change. Fields that are `None` are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionPatch {
    /// The new kind.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// The new amount, which may be signed.
    #[serde(default)]
    pub amount: Option<f64>,
    /// The new direction.
    #[serde(default)]
    pub direction: Option<Direction>,
    /// The new location.
    #[serde(default)]
    pub location: Option<String>,
    /// The new date.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
}

impl TransactionPatch {
    fn validate(&self) -> Result<(), Error> {
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }

        for (value, field_name) in [(&self.kind, "type"), (&self.location, "location")] {
            if value.as_deref().is_some_and(|text| text.trim().is_empty()) {
                return Err(Error::Validation(format!("{field_name} must not be empty")));
            }
        }

        Ok(())
    }

    fn apply(self, transaction: &mut Transaction) {
        if let Some(kind) = self.kind {
            transaction.kind = kind;
        }

        if let Some(location) = self.location {
            transaction.location = location;
        }

        if let Some(date) = self.date {
            transaction.date = date;
        }

        if let Some(amount) = self.amount {
            transaction.amount = amount.abs();

            // A negative amount only implies a direction when none was given.
            if self.direction.is_none() && amount < 0.0 {
                transaction.direction = Direction::Out;
            }
        }

        if let Some(direction) = self.direction {
            transaction.direction = direction;
        }
    }
}

fn validate_amount(amount: f64) -> Result<(), Error> {
    if amount.is_finite() {
        Ok(())
    } else {
        Err(Error::Validation("amount must be a finite number".to_owned()))
    }
}

// ============================================================================
// LEDGER OPERATIONS
// ============================================================================

/// Add a new transaction to `document` and apply its signed amount to the
/// account balance.
///
/// `now` is used as the date when the builder has none.
///
/// # Errors
/// Returns [Error::Validation] if the amount is not finite or would take the
/// balance out of range. `document` is left unchanged on error.
pub fn create_transaction(
    builder: TransactionBuilder,
    now: OffsetDateTime,
    document: &mut Document,
) -> Result<Transaction, Error> {
    validate_amount(builder.amount)?;

    let direction = builder
        .direction
        .unwrap_or_else(|| Direction::from_amount(builder.amount));
    let amount = builder.amount.abs();
    document.account.apply_delta(direction.sign() * amount)?;

    let transaction = Transaction {
        id: document.allocate_transaction_id(),
        kind: builder.kind,
        amount,
        direction,
        location: builder.location,
        date: builder.date.unwrap_or(now),
    };
    document.expenses.push(transaction.clone());

    Ok(transaction)
}

/// Apply `patch` to the transaction with `id` and move the account balance by
/// the difference between its new and old signed amounts.
///
/// # Errors
/// Returns [Error::UpdateMissingTransaction] if there is no such transaction,
/// or [Error::Validation] if a text field is blank, the new amount is not
/// finite or the balance would go out of range. `document` is left unchanged
/// on error.
pub fn update_transaction(
    id: TransactionId,
    patch: TransactionPatch,
    document: &mut Document,
) -> Result<Transaction, Error> {
    patch.validate()?;

    let index = document
        .expenses
        .iter()
        .position(|transaction| transaction.id == id)
        .ok_or(Error::UpdateMissingTransaction)?;

    let mut updated = document.expenses[index].clone();
    let old_contribution = updated.signed_amount();
    patch.apply(&mut updated);

    document
        .account
        .apply_delta(updated.signed_amount() - old_contribution)?;
    document.expenses[index] = updated.clone();

    Ok(updated)
}

/// Remove the transaction with `id` and reverse its effect on the account balance.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if there is no such transaction,
/// or [Error::Validation] if the balance would go out of range.
pub fn delete_transaction(
    id: TransactionId,
    document: &mut Document,
) -> Result<Transaction, Error> {
    let index = document
        .expenses
        .iter()
        .position(|transaction| transaction.id == id)
        .ok_or(Error::DeleteMissingTransaction)?;

    document
        .account
        .apply_delta(-document.expenses[index].signed_amount())?;

    Ok(document.expenses.remove(index))
}

/// The balance implied by `opening_balance` and the signed sum of `transactions`.
pub fn recompute_balance(opening_balance: f64, transactions: &[Transaction]) -> f64 {
    opening_balance
        + transactions
            .iter()
            .map(Transaction::signed_amount)
            .sum::<f64>()
}

#[cfg(test)]
mod direction_tests {
    use super::Direction;

    #[test]
    fn positive_amount_is_incoming() {
        assert_eq!(Direction::from_amount(12.5), Direction::In);
    }

    #[test]
    fn zero_and_negative_amounts_are_outgoing() {
        assert_eq!(Direction::from_amount(0.0), Direction::Out);
        assert_eq!(Direction::from_amount(-50.0), Direction::Out);
    }

    #[test]
    fn serializes_as_lowercase() {
        assert_eq!(serde_json::to_string(&Direction::In).unwrap(), r#""in""#);
        assert_eq!(serde_json::to_string(&Direction::Out).unwrap(), r#""out""#);
    }
}

#[cfg(test)]
mod ledger_tests {
    use time::{OffsetDateTime, macros::datetime};

    use crate::{
        Account, Error,
        store::Document,
        transaction::{Direction, Transaction},
    };

    use super::{
        TransactionPatch, create_transaction, delete_transaction, recompute_balance,
        update_transaction,
    };

    const OPENING_BALANCE: f64 = 1000.0;

    fn now() -> OffsetDateTime {
        datetime!(2025-06-01 12:00 UTC)
    }

    fn get_document() -> Document {
        Document {
            account: Account {
                balance: OPENING_BALANCE,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// The running balance and a fresh sum only agree up to rounding.
    #[track_caller]
    fn assert_balance_consistent(document: &Document) {
        let expected = recompute_balance(OPENING_BALANCE, &document.expenses);
        let tolerance = 1e-9 * expected.abs().max(1.0);

        assert!(
            (document.account.balance - expected).abs() <= tolerance,
            "balance {} differs from recomputed {expected}",
            document.account.balance
        );
    }

    #[test]
    fn negative_amount_without_direction_is_outgoing_magnitude() {
        let mut document = get_document();

        let transaction =
            create_transaction(Transaction::build("Food", -50.0, "Kyiv"), now(), &mut document)
                .unwrap();

        assert_eq!(transaction.direction, Direction::Out);
        assert_eq!(transaction.amount, 50.0);
        assert_eq!(document.account.balance, 950.0);
    }

    #[test]
    fn explicit_direction_overrides_sign() {
        let mut document = get_document();

        let transaction = create_transaction(
            Transaction::build("Refund", -20.0, "Online").direction(Some(Direction::In)),
            now(),
            &mut document,
        )
        .unwrap();

        assert_eq!(transaction.direction, Direction::In);
        assert_eq!(transaction.amount, 20.0);
        assert_eq!(document.account.balance, 1020.0);
    }

    #[test]
    fn create_defaults_date_to_now() {
        let mut document = get_document();

        let transaction =
            create_transaction(Transaction::build("Salary", 10.0, "Work"), now(), &mut document)
                .unwrap();

        assert_eq!(transaction.date, now());
    }

    #[test]
    fn create_keeps_given_date() {
        let mut document = get_document();
        let date = datetime!(2024-12-24 18:30 UTC);

        let transaction = create_transaction(
            Transaction::build("Gift", -30.0, "Market").date(Some(date)),
            now(),
            &mut document,
        )
        .unwrap();

        assert_eq!(transaction.date, date);
    }

    #[test]
    fn create_assigns_increasing_ids_and_keeps_order() {
        let mut document = get_document();

        let first =
            create_transaction(Transaction::build("A", 1.0, "X"), now(), &mut document).unwrap();
        let second =
            create_transaction(Transaction::build("B", 2.0, "X"), now(), &mut document).unwrap();

        assert!(second.id > first.id);
        assert_eq!(document.expenses, vec![first, second]);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut document = get_document();
        let first =
            create_transaction(Transaction::build("A", 1.0, "X"), now(), &mut document).unwrap();
        delete_transaction(first.id, &mut document).unwrap();

        let second =
            create_transaction(Transaction::build("B", 2.0, "X"), now(), &mut document).unwrap();

        assert!(second.id > first.id);
    }

    #[test]
    fn create_rejects_non_finite_amount() {
        let mut document = get_document();

        let result = create_transaction(
            Transaction::build("A", f64::NAN, "X"),
            now(),
            &mut document,
        );

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(document, get_document());
    }

    #[test]
    fn update_from_incoming_100_to_outgoing_40_moves_balance_by_minus_140() {
        let mut document = get_document();
        let transaction = create_transaction(
            Transaction::build("Salary", 100.0, "Work"),
            now(),
            &mut document,
        )
        .unwrap();
        let balance_before = document.account.balance;

        let updated = update_transaction(
            transaction.id,
            TransactionPatch {
                amount: Some(40.0),
                direction: Some(Direction::Out),
                ..Default::default()
            },
            &mut document,
        )
        .unwrap();

        assert_eq!(updated.amount, 40.0);
        assert_eq!(updated.direction, Direction::Out);
        assert_eq!(document.account.balance - balance_before, -140.0);
        assert_balance_consistent(&document);
    }

    #[test]
    fn update_with_negative_amount_and_no_direction_becomes_outgoing() {
        let mut document = get_document();
        let transaction = create_transaction(
            Transaction::build("Salary", 100.0, "Work"),
            now(),
            &mut document,
        )
        .unwrap();

        let updated = update_transaction(
            transaction.id,
            TransactionPatch {
                amount: Some(-25.0),
                ..Default::default()
            },
            &mut document,
        )
        .unwrap();

        assert_eq!(updated.direction, Direction::Out);
        assert_eq!(updated.amount, 25.0);
        assert_eq!(document.account.balance, OPENING_BALANCE - 25.0);
    }

    #[test]
    fn update_with_positive_amount_keeps_direction() {
        let mut document = get_document();
        let transaction =
            create_transaction(Transaction::build("Rent", -500.0, "Home"), now(), &mut document)
                .unwrap();

        let updated = update_transaction(
            transaction.id,
            TransactionPatch {
                amount: Some(450.0),
                ..Default::default()
            },
            &mut document,
        )
        .unwrap();

        assert_eq!(updated.direction, Direction::Out);
        assert_eq!(document.account.balance, OPENING_BALANCE - 450.0);
    }

    #[test]
    fn update_of_descriptive_fields_leaves_balance_alone() {
        let mut document = get_document();
        let transaction =
            create_transaction(Transaction::build("Food", -12.0, "Kyiv"), now(), &mut document)
                .unwrap();
        let balance_before = document.account.balance;

        let updated = update_transaction(
            transaction.id,
            TransactionPatch {
                kind: Some("Coffee".to_owned()),
                location: Some("London".to_owned()),
                ..Default::default()
            },
            &mut document,
        )
        .unwrap();

        assert_eq!(updated.kind, "Coffee");
        assert_eq!(updated.location, "London");
        assert_eq!(updated.id, transaction.id);
        assert_eq!(document.account.balance, balance_before);
    }

    #[test]
    fn update_missing_transaction_fails() {
        let mut document = get_document();

        let result = update_transaction(42, TransactionPatch::default(), &mut document);

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn delete_restores_pre_creation_balance() {
        let mut document = get_document();
        let balance_before = document.account.balance;
        let transaction =
            create_transaction(Transaction::build("Food", -50.0, "Kyiv"), now(), &mut document)
                .unwrap();

        let removed = delete_transaction(transaction.id, &mut document).unwrap();

        assert_eq!(removed, transaction);
        assert_eq!(document.account.balance, balance_before);
        assert!(document.expenses.is_empty());
    }

    #[test]
    fn delete_missing_transaction_fails() {
        let mut document = get_document();

        assert_eq!(
            delete_transaction(1, &mut document),
            Err(Error::DeleteMissingTransaction)
        );
    }

    #[test]
    fn balance_matches_recompute_after_mixed_operations() {
        let mut document = get_document();
        let amounts = [120.0, -35.5, 0.0, -1000.0, 42.25, 7.0, -3.0];
        let mut ids = Vec::new();

        for (i, amount) in amounts.iter().enumerate() {
            let transaction = create_transaction(
                Transaction::build(&format!("T{i}"), *amount, "Somewhere"),
                now(),
                &mut document,
            )
            .unwrap();
            ids.push(transaction.id);
            assert_balance_consistent(&document);
        }

        update_transaction(
            ids[0],
            TransactionPatch {
                amount: Some(-60.0),
                ..Default::default()
            },
            &mut document,
        )
        .unwrap();
        assert_balance_consistent(&document);

        update_transaction(
            ids[3],
            TransactionPatch {
                direction: Some(Direction::In),
                ..Default::default()
            },
            &mut document,
        )
        .unwrap();
        assert_balance_consistent(&document);

        delete_transaction(ids[1], &mut document).unwrap();
        delete_transaction(ids[5], &mut document).unwrap();
        assert_balance_consistent(&document);

        update_transaction(
            ids[4],
            TransactionPatch {
                amount: Some(10.0),
                direction: Some(Direction::Out),
                ..Default::default()
            },
            &mut document,
        )
        .unwrap();
        assert_balance_consistent(&document);
    }

    #[test]
    fn balance_stays_consistent_with_inexact_amounts() {
        let mut document = get_document();
        let mut ids = Vec::new();

        for amount in [0.1, 0.2, -0.3, 19.99, -0.07, 1.1] {
            let transaction = create_transaction(
                Transaction::build("Small", amount, "Kiosk"),
                now(),
                &mut document,
            )
            .unwrap();
            ids.push(transaction.id);
            assert_balance_consistent(&document);
        }

        update_transaction(
            ids[3],
            TransactionPatch {
                amount: Some(-0.01),
                ..Default::default()
            },
            &mut document,
        )
        .unwrap();
        delete_transaction(ids[0], &mut document).unwrap();

        assert_balance_consistent(&document);
    }

    #[test]
    fn create_rejects_amount_that_overflows_balance() {
        let mut document = get_document();
        create_transaction(Transaction::build("Big", 1.0e308, "X"), now(), &mut document)
            .unwrap();
        let before = document.clone();

        let result =
            create_transaction(Transaction::build("Big", 1.0e308, "X"), now(), &mut document);

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(document, before);
    }

    #[test]
    fn update_rejects_change_that_overflows_balance() {
        let mut document = get_document();
        let transaction = create_transaction(
            Transaction::build("Big", -1.0e308, "X"),
            now(),
            &mut document,
        )
        .unwrap();
        let before = document.clone();

        let result = update_transaction(
            transaction.id,
            TransactionPatch {
                amount: Some(1.0e308),
                direction: Some(Direction::In),
                ..Default::default()
            },
            &mut document,
        );

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(document, before);
    }

    #[test]
    fn update_rejects_blank_text_fields() {
        let mut document = get_document();
        let transaction =
            create_transaction(Transaction::build("Food", -5.0, "Kyiv"), now(), &mut document)
                .unwrap();
        let before = document.clone();

        for patch in [
            TransactionPatch {
                kind: Some(String::new()),
                ..Default::default()
            },
            TransactionPatch {
                location: Some("   ".to_owned()),
                ..Default::default()
            },
        ] {
            let result = update_transaction(transaction.id, patch, &mut document);

            assert!(matches!(result, Err(Error::Validation(_))));
        }
        assert_eq!(document, before);
    }

    #[test]
    fn recompute_balance_of_empty_list_is_opening_balance() {
        assert_eq!(recompute_balance(78160.0, &[]), 78160.0);
    }
}
