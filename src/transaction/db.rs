//! Database operations for transactions.

use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    Error,
    database_id::TransactionId,
    transaction::{NewTransaction, Transaction},
};

/// Insert a transaction and return it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::ConstraintViolation] if the amount is negative or not finite,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: &NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    new_transaction.validate()?;

    let transaction = connection
        .prepare(
            "INSERT INTO transactions (date, description, amount, type)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, date, description, amount, type",
        )?
        .query_row(
            (
                new_transaction.date,
                &new_transaction.description,
                new_transaction.amount,
                new_transaction.kind,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction by its `id`, or `None` if there is no such
/// transaction.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<Option<Transaction>, Error> {
    connection
        .prepare("SELECT id, date, description, amount, type FROM transactions WHERE id = :id")?
        .query_row(&[(":id", &id)], map_transaction_row)
        .optional()
        .map_err(|error| error.into())
}

/// Retrieve all transactions, most recent date first. Transactions on the
/// same date are ordered by ID, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, date, description, amount, type FROM transactions
             ORDER BY date DESC, id DESC",
        )?
        .query_map([], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Replace every field except the ID of an existing transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction,
/// - [Error::ConstraintViolation] if the amount is negative or not finite,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    new_transaction: &NewTransaction,
    connection: &Connection,
) -> Result<(), Error> {
    new_transaction.validate()?;

    let rows_affected = connection.execute(
        "UPDATE transactions SET date = ?1, description = ?2, amount = ?3, type = ?4
         WHERE id = ?5",
        (
            new_transaction.date,
            &new_transaction.description,
            new_transaction.amount,
            new_transaction.kind,
            id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound(id));
    }

    Ok(())
}

/// Delete a transaction by ID and return the number of deleted rows.
///
/// Deleting a transaction that does not exist is not an error, zero is
/// returned instead.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<usize, Error> {
    let rows_affected = connection.execute("DELETE FROM transactions WHERE id = ?1", [id])?;

    Ok(rows_affected)
}

/// Get the total number of transactions in the database.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM transactions;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                description TEXT,
                amount REAL NOT NULL,
                type TEXT NOT NULL CHECK(type IN ('Income', 'Expense'))
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT INTO sqlite_sequence (name, seq)
         SELECT 'transactions', 0
         WHERE NOT EXISTS (SELECT 1 FROM sqlite_sequence WHERE name = 'transactions')",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date, id);",
        (),
    )?;

    Ok(())
}

fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let date = row.get(1)?;
    let description: Option<String> = row.get(2)?;
    let amount = row.get(3)?;
    let kind = row.get(4)?;

    Ok(Transaction {
        id,
        date,
        description: description.unwrap_or_default(),
        amount,
        kind,
    })
}
