//! The income/expense enumeration shared by transactions and categories.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Whether money was earned or spent.
///
/// Stored in the database as the text `Income` or `Expense`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransactionType {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    /// The stable text encoding used in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    /// Parse the exact labels `Income` and `Expense`.
    ///
    /// # Errors
    ///
    /// Returns [Error::ConstraintViolation] for any other string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Income" => Ok(TransactionType::Income),
            "Expense" => Ok(TransactionType::Expense),
            other => Err(Error::ConstraintViolation(format!(
                "\"{other}\" is not a transaction type, expected \"Income\" or \"Expense\""
            ))),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}
