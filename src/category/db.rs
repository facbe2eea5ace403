//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error, TransactionType,
    category::{Category, CategoryName},
};

/// Create a category and return it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateName] if a category with the same name exists, whatever
///   its type,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_category(
    name: CategoryName,
    kind: TransactionType,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT INTO categories (name, type) VALUES (?1, ?2);",
            (name.as_ref(), kind),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateName(name.to_string()),
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(Category { id, name, kind })
}

/// Retrieve categories.
///
/// With no filter, categories are ordered by type and then by name. With a
/// filter, only categories of that type are returned, ordered by name.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_categories(
    kind: Option<TransactionType>,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    let categories = match kind {
        Some(kind) => connection
            .prepare("SELECT id, name, type FROM categories WHERE type = ?1 ORDER BY name ASC;")?
            .query_map([kind], map_row)?
            .collect::<Result<Vec<_>, _>>()?,
        None => connection
            .prepare("SELECT id, name, type FROM categories ORDER BY type ASC, name ASC;")?
            .query_map([], map_row)?
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok(categories)
}

/// Initialize the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            type TEXT NOT NULL CHECK(type IN ('Income', 'Expense'))
        );

        INSERT INTO sqlite_sequence (name, seq)
        SELECT 'categories', 0
        WHERE NOT EXISTS (SELECT 1 FROM sqlite_sequence WHERE name = 'categories');",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);
    let kind = row.get(2)?;

    Ok(Category { id, name, kind })
}
