//! The ledger store: durable CRUD over transactions and categories.
//!
//! Every operation opens its own connection to the database file and closes
//! it before returning, so no handle is shared between calls. Mutating
//! operations are additionally serialised by a process-wide write lock.

use std::{
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use rusqlite::Connection;

use crate::{
    Category, CategoryId, CategoryName, Error, LedgerConfig, NewTransaction, Transaction,
    TransactionId, TransactionType, category, db::initialize, transaction,
};

/// How long a connection waits for another process holding the database
/// file lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A file-backed store of transactions and categories.
///
/// Callers receive copies of stored rows, never live handles.
#[derive(Debug)]
pub struct LedgerStore {
    config: LedgerConfig,
    write_lock: Mutex<()>,
}

impl LedgerStore {
    /// Open the store described by `config`, creating the database file and
    /// its tables if they do not exist.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the database cannot be opened or
    /// initialised.
    pub fn open(config: LedgerConfig) -> Result<Self, Error> {
        let store = Self {
            config,
            write_lock: Mutex::new(()),
        };

        store.with_write_connection(|connection| initialize(connection).map_err(Error::from))?;
        tracing::info!("Opened ledger at {:?}", store.config.db_path);

        Ok(store)
    }

    /// The configuration the store was opened with.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Add a transaction and return its new ID.
    ///
    /// # Errors
    /// Returns an [Error::ConstraintViolation] if the amount is negative, not
    /// finite or above [crate::MAX_AMOUNT], or an [Error::SqlError] if the
    /// database fails.
    pub fn add_transaction(
        &self,
        new_transaction: &NewTransaction,
    ) -> Result<TransactionId, Error> {
        let transaction = self.with_write_connection(|connection| {
            transaction::create_transaction(new_transaction, connection)
        })?;
        tracing::debug!("Added transaction {}", transaction.id);

        Ok(transaction.id)
    }

    /// All transactions, most recent date first with ties broken by the
    /// newest ID.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the database fails.
    pub fn get_all_transactions(&self) -> Result<Vec<Transaction>, Error> {
        let transactions = self.with_connection(transaction::get_all_transactions)?;
        tracing::debug!("Listed {} transactions", transactions.len());

        Ok(transactions)
    }

    /// The transaction with `id`, or `None` if there is none.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the database fails.
    pub fn get_transaction_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, Error> {
        let transaction =
            self.with_connection(|connection| transaction::get_transaction(id, connection))?;

        if transaction.is_none() {
            tracing::debug!("Transaction {id} not found");
        } else {
            tracing::debug!("Loaded transaction {id}");
        }

        Ok(transaction)
    }

    /// Replace every field of the transaction with `id`.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if there is no such transaction, an
    /// [Error::ConstraintViolation] if the amount is invalid, or an
    /// [Error::SqlError] if the database fails.
    pub fn update_transaction(
        &self,
        id: TransactionId,
        new_transaction: &NewTransaction,
    ) -> Result<(), Error> {
        self.with_write_connection(|connection| {
            transaction::update_transaction(id, new_transaction, connection)
        })?;
        tracing::debug!("Updated transaction {id}");

        Ok(())
    }

    /// Delete the transaction with `id`.
    ///
    /// Deleting a transaction that does not exist succeeds and changes
    /// nothing.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the database fails.
    pub fn delete_transaction(&self, id: TransactionId) -> Result<(), Error> {
        let rows_affected = self.with_write_connection(|connection| {
            transaction::delete_transaction(id, connection)
        })?;

        if rows_affected == 0 {
            tracing::debug!("Transaction {id} did not exist, nothing to delete");
        } else {
            tracing::debug!("Deleted transaction {id}");
        }

        Ok(())
    }

    /// Add a category and return its new ID.
    ///
    /// # Errors
    /// Returns an [Error::DuplicateName] if the name is taken by any category,
    /// or an [Error::SqlError] if the database fails.
    pub fn add_category(
        &self,
        name: CategoryName,
        kind: TransactionType,
    ) -> Result<CategoryId, Error> {
        let category = self.with_write_connection(|connection| {
            category::create_category(name, kind, connection)
        })?;
        tracing::debug!("Added category {} ({})", category.id, category.name);

        Ok(category.id)
    }

    /// Categories ordered by type then name, or only those of type `kind`
    /// ordered by name.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the database fails.
    pub fn get_categories(&self, kind: Option<TransactionType>) -> Result<Vec<Category>, Error> {
        let categories =
            self.with_connection(|connection| category::get_categories(kind, connection))?;
        tracing::debug!("Listed {} categories (filter: {kind:?})", categories.len());

        Ok(categories)
    }

    /// Run `operation` on a connection that is opened for this call only and
    /// closed on every exit path.
    pub(crate) fn with_connection<T>(
        &self,
        operation: impl FnOnce(&Connection) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let connection = Connection::open(&self.config.db_path)?;
        connection.busy_timeout(BUSY_TIMEOUT)?;

        let result = operation(&connection);

        match connection.close() {
            Ok(()) => result,
            Err((_, error)) => result.and(Err(error.into())),
        }
    }

    fn with_write_connection<T>(
        &self,
        operation: impl FnOnce(&Connection) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let _guard = self.lock()?;

        self.with_connection(operation)
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, Error> {
        self.write_lock.lock().map_err(|_| Error::DatabaseLockError)
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use tempfile::TempDir;
    use time::macros::date;

    use crate::{
        CategoryName, Error, ErrorKind, LedgerConfig, LedgerStore, NewTransaction,
        TransactionType,
    };

    fn get_test_store() -> (TempDir, LedgerStore) {
        let dir = TempDir::new().expect("Could not create temp dir");
        let config = LedgerConfig::new(dir.path().join("ledger.db"));
        let store = LedgerStore::open(config).expect("Could not open store");

        (dir, store)
    }

    fn lunch() -> NewTransaction {
        NewTransaction::new(date!(2024 - 05 - 01), "lunch", 50.0, TransactionType::Expense)
    }

    #[test]
    fn added_transaction_round_trips() {
        let (_dir, store) = get_test_store();
        let inputs = [
            lunch(),
            NewTransaction::new(date!(2023 - 12 - 31), "", 0.0, TransactionType::Income),
            NewTransaction::new(
                date!(2024 - 02 - 29),
                "rent 🏠",
                1234.56,
                TransactionType::Expense,
            ),
        ];

        for input in inputs {
            let id = store.add_transaction(&input).expect("Could not add transaction");

            let got = store
                .get_transaction_by_id(id)
                .expect("Could not get transaction")
                .expect("Transaction should exist");
            assert_eq!(got.id, id);
            assert_eq!(got.date, input.date);
            assert_eq!(got.description, input.description);
            assert_eq!(got.amount, input.amount);
            assert_eq!(got.kind, input.kind);
        }
    }

    #[test]
    fn add_rejects_invalid_amount_without_writing() {
        let (_dir, store) = get_test_store();

        for amount in [-5.0, f64::MAX] {
            let input = NewTransaction { amount, ..lunch() };

            let result = store.add_transaction(&input);

            assert_eq!(
                result.map_err(|error| error.kind()),
                Err(ErrorKind::ConstraintViolation),
                "want constraint violation for amount {amount}"
            );
        }
        assert_eq!(store.get_all_transactions(), Ok(Vec::new()));
    }

    #[test]
    fn get_missing_transaction_is_not_an_error() {
        let (_dir, store) = get_test_store();

        assert_eq!(store.get_transaction_by_id(7), Ok(None));
    }

    #[test]
    fn update_replaces_old_values() {
        let (_dir, store) = get_test_store();
        let id = store.add_transaction(&lunch()).expect("Could not add transaction");
        let replacement =
            NewTransaction::new(date!(2024 - 05 - 03), "dinner", 75.5, TransactionType::Expense);

        store
            .update_transaction(id, &replacement)
            .expect("Could not update transaction");

        let got = store
            .get_transaction_by_id(id)
            .expect("Could not get transaction")
            .expect("Transaction should exist");
        assert_eq!(got.date, replacement.date);
        assert_eq!(got.description, "dinner");
        assert_eq!(got.amount, 75.5);
    }

    #[test]
    fn update_missing_transaction_fails_and_leaves_table_unchanged() {
        let (_dir, store) = get_test_store();
        store.add_transaction(&lunch()).expect("Could not add transaction");
        let before = store.get_all_transactions().expect("Could not list");

        let result = store.update_transaction(42, &lunch());

        assert_eq!(result, Err(Error::NotFound(42)));
        assert_eq!(store.get_all_transactions(), Ok(before));
    }

    #[test]
    fn delete_is_idempotent() {
        let (_dir, store) = get_test_store();
        let id = store.add_transaction(&lunch()).expect("Could not add transaction");
        let other = store.add_transaction(&lunch()).expect("Could not add transaction");

        assert_eq!(store.delete_transaction(id), Ok(()));
        assert_eq!(store.delete_transaction(id), Ok(()));
        assert_eq!(store.delete_transaction(999), Ok(()));

        let remaining: Vec<_> = store
            .get_all_transactions()
            .expect("Could not list")
            .into_iter()
            .map(|transaction| transaction.id)
            .collect();
        assert_eq!(remaining, vec![other]);
    }

    #[test]
    fn duplicate_category_leaves_table_unchanged() {
        let (_dir, store) = get_test_store();
        store
            .add_category(CategoryName::new("Salary").unwrap(), TransactionType::Income)
            .expect("Could not add category");
        let before = store.get_categories(None).expect("Could not list");

        let result =
            store.add_category(CategoryName::new("Salary").unwrap(), TransactionType::Expense);

        assert_eq!(result, Err(Error::DuplicateName("Salary".to_owned())));
        assert_eq!(store.get_categories(None), Ok(before));
    }

    #[test]
    fn data_survives_reopening() {
        let (dir, store) = get_test_store();
        let id = store.add_transaction(&lunch()).expect("Could not add transaction");
        store
            .add_category(CategoryName::new("Food").unwrap(), TransactionType::Expense)
            .expect("Could not add category");
        drop(store);

        let reopened = LedgerStore::open(LedgerConfig::new(dir.path().join("ledger.db")))
            .expect("Could not reopen store");

        assert!(matches!(reopened.get_transaction_by_id(id), Ok(Some(_))));
        assert_eq!(reopened.get_categories(None).map(|c| c.len()), Ok(1));
    }

    #[test]
    fn open_fails_with_storage_error_on_unusable_path() {
        let dir = TempDir::new().expect("Could not create temp dir");

        let result = LedgerStore::open(LedgerConfig::new(dir.path()));

        assert_eq!(
            result.map(|_| ()).map_err(|error| error.kind()),
            Err(ErrorKind::Storage)
        );
    }

    #[test]
    fn concurrent_writers_get_distinct_ids() {
        let (_dir, store) = get_test_store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    (0..5)
                        .map(|_| store.add_transaction(&lunch()).expect("Could not add"))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<_> = handles
            .into_iter()
            .flat_map(|handle| handle.join().expect("Writer thread panicked"))
            .collect();
        ids.sort();
        ids.dedup();

        assert_eq!(ids.len(), 20);
        assert_eq!(store.get_all_transactions().map(|t| t.len()), Ok(20));
    }
}
