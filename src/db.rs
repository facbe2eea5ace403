//! Schema initialisation for the ledger database.

use rusqlite::Connection;

use crate::{category::create_category_table, transaction::create_transaction_table};

/// Create the ledger tables if they do not exist yet.
///
/// Safe to call on every start up; an existing database is left untouched.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    create_transaction_table(connection)?;
    create_category_table(connection)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("First initialization failed");
        initialize(&connection).expect("Second initialization failed");

        let sequence_rows: u32 = connection
            .query_row("SELECT COUNT(*) FROM sqlite_sequence", [], |row| row.get(0))
            .unwrap();
        assert_eq!(sequence_rows, 2);
    }

    #[test]
    fn initialize_creates_both_tables() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");

        let mut tables: Vec<String> = connection
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name IN ('transactions', 'categories')
                 ORDER BY name",
            )
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        tables.sort();

        assert_eq!(tables, vec!["categories", "transactions"]);
    }
}
