//! Derives total income, total expense and the net balance from the ledger.
//!
//! The aggregator only reads from the store and keeps no state between
//! calls.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{Error, LedgerStore, TransactionType};

/// What [SummaryAggregator::summarize] does when the store cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SummaryPolicy {
    /// Return an all-zero [Summary] marked as degraded.
    #[default]
    FailSoft,
    /// Return the storage error to the caller.
    Propagate,
}

/// Totals over the current set of transactions.
///
/// Amounts are accumulated without rounding; rounding for display is up to
/// the caller.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    /// The sum of the amounts of all income transactions.
    pub total_income: f64,
    /// The sum of the amounts of all expense transactions.
    pub total_expense: f64,
    /// `total_income - total_expense`.
    pub net_balance: f64,
    /// Whether the totals are zero because the store could not be read.
    pub degraded: bool,
}

impl Summary {
    /// Sum `(amount, type label)` pairs.
    ///
    /// Pairs whose label is neither `Income` nor `Expense` are left out of
    /// both totals.
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = (f64, &'a str)>) -> Self {
        let mut total_income = 0.0;
        let mut total_expense = 0.0;

        for (amount, label) in rows {
            match label.parse() {
                Ok(TransactionType::Income) => total_income += amount,
                Ok(TransactionType::Expense) => total_expense += amount,
                Err(_) => tracing::debug!("Skipping unrecognised transaction type {label:?}"),
            }
        }

        Self {
            total_income,
            total_expense,
            net_balance: total_income - total_expense,
            degraded: false,
        }
    }

    fn degraded() -> Self {
        Self {
            degraded: true,
            ..Self::default()
        }
    }
}

/// Compute the summary of every transaction in the database.
///
/// The type column is read as plain text so that rows with an unexpected
/// type do not fail the whole query.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub(crate) fn get_summary(connection: &Connection) -> Result<Summary, Error> {
    let rows = connection
        .prepare("SELECT amount, type FROM transactions")?
        .query_map([], |row| Ok((row.get::<_, f64>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Summary::from_rows(
        rows.iter().map(|(amount, label)| (*amount, label.as_str())),
    ))
}

/// Computes [Summary] values from a [LedgerStore] on demand.
#[derive(Debug, Clone, Copy)]
pub struct SummaryAggregator<'a> {
    store: &'a LedgerStore,
    policy: SummaryPolicy,
}

impl<'a> SummaryAggregator<'a> {
    /// Create an aggregator that uses the summary policy from the store's
    /// config.
    pub fn new(store: &'a LedgerStore) -> Self {
        Self {
            store,
            policy: store.config().summary_policy,
        }
    }

    /// Override the summary policy.
    pub fn with_policy(mut self, policy: SummaryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Compute the totals over all transactions currently in the store.
    ///
    /// # Errors
    /// With [SummaryPolicy::Propagate], returns the storage error if the store
    /// cannot be read. With [SummaryPolicy::FailSoft] this function does not
    /// fail and returns a degraded all-zero summary instead.
    pub fn summarize(&self) -> Result<Summary, Error> {
        match self.store.with_connection(get_summary) {
            Ok(summary) => Ok(summary),
            Err(error) => match self.policy {
                SummaryPolicy::FailSoft => {
                    tracing::warn!("Could not compute summary, reporting zero totals: {error}");
                    Ok(Summary::degraded())
                }
                SummaryPolicy::Propagate => Err(error),
            },
        }
    }
}

#[cfg(test)]
mod summary_tests {
    use crate::Summary;

    #[test]
    fn empty_set_sums_to_zero() {
        let summary = Summary::from_rows(Vec::<(f64, &str)>::new());

        assert_eq!(summary, Summary::default());
    }

    #[test]
    fn totals_partition_by_type() {
        let rows = [
            (1000.0, "Income"),
            (50.0, "Expense"),
            (12.5, "Expense"),
            (0.25, "Income"),
            (0.0, "Expense"),
        ];

        let summary = Summary::from_rows(rows);

        assert_eq!(summary.total_income, 1000.25);
        assert_eq!(summary.total_expense, 62.5);
        assert_eq!(summary.net_balance, 937.75);
        assert!(!summary.degraded);
    }

    #[test]
    fn net_balance_is_income_minus_expense() {
        let sets: [&[(f64, &str)]; 4] = [
            &[(0.1, "Income"), (0.2, "Income"), (0.3, "Expense")],
            &[(5.0, "Expense")],
            &[(123.45, "Income"), (678.9, "Expense"), (3.33, "Income")],
            &[(1e9, "Income"), (1e-9, "Expense")],
        ];

        for rows in sets {
            let summary = Summary::from_rows(rows.iter().copied());

            let want_income: f64 = rows
                .iter()
                .filter(|(_, label)| *label == "Income")
                .map(|(amount, _)| amount)
                .sum();
            let want_expense: f64 = rows
                .iter()
                .filter(|(_, label)| *label == "Expense")
                .map(|(amount, _)| amount)
                .sum();
            assert_eq!(summary.total_income, want_income);
            assert_eq!(summary.total_expense, want_expense);
            assert_eq!(
                summary.net_balance,
                summary.total_income - summary.total_expense
            );
        }
    }

    #[test]
    fn unrecognised_types_are_ignored() {
        let summary = Summary::from_rows([(10.0, "Income"), (99.0, "Transfer"), (4.0, "Expense")]);

        assert_eq!(summary.total_income, 10.0);
        assert_eq!(summary.total_expense, 4.0);
        assert_eq!(summary.net_balance, 6.0);
    }
}
