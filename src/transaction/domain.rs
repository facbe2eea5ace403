//! Core transaction domain types.

use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, TransactionType, database_id::TransactionId};

/// The largest amount a single transaction may record.
///
/// Keeps every achievable total finite, so the net balance is always
/// `total_income - total_expense`.
pub const MAX_AMOUNT: f64 = 1e12;

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Parse a `YYYY-MM-DD` date string.
///
/// # Errors
///
/// Returns [Error::ConstraintViolation] if `text` is not a valid calendar date
/// in that format.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), DATE_FORMAT).map_err(|error| {
        Error::ConstraintViolation(format!(
            "\"{text}\" is not a valid date in the format YYYY-MM-DD: {error}"
        ))
    })
}

/// An income or expense recorded in the ledger.
///
/// Values of this type are snapshots of a stored row; changing them does not
/// change the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID assigned by the store.
    pub id: TransactionId,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for. May be empty.
    pub description: String,
    /// The non-negative amount of money earned or spent. The sign is implied
    /// by `kind`.
    pub amount: f64,
    /// Whether this is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

/// The fields of a transaction that callers supply when adding or updating a
/// transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money, must be non-negative and at most [MAX_AMOUNT].
    pub amount: f64,
    /// Whether this is income or an expense.
    pub kind: TransactionType,
}

impl NewTransaction {
    /// Create the input for a transaction.
    pub fn new(date: Date, description: &str, amount: f64, kind: TransactionType) -> Self {
        Self {
            date,
            description: description.to_owned(),
            amount,
            kind,
        }
    }

    /// Check the amount is a valid magnitude.
    ///
    /// # Errors
    ///
    /// Returns [Error::ConstraintViolation] if the amount is negative, NaN,
    /// infinite or larger than [MAX_AMOUNT].
    pub fn validate(&self) -> Result<(), Error> {
        if !self.amount.is_finite() {
            return Err(Error::ConstraintViolation(format!(
                "{} is not a valid amount",
                self.amount
            )));
        }

        if self.amount < 0.0 {
            return Err(Error::ConstraintViolation(format!(
                "the amount must not be negative, got {}",
                self.amount
            )));
        }

        if self.amount > MAX_AMOUNT {
            return Err(Error::ConstraintViolation(format!(
                "the amount must not be larger than {MAX_AMOUNT}, got {}",
                self.amount
            )));
        }

        Ok(())
    }
}
