//! Transaction management for the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` record and the validated `NewTransaction` input
//! - Database functions for storing, querying, and managing transactions

mod db;
mod domain;

pub use db::{
    create_transaction, create_transaction_table, delete_transaction, get_all_transactions,
    get_transaction, update_transaction,
};
pub use domain::{MAX_AMOUNT, NewTransaction, Transaction, parse_date};

#[cfg(test)]
pub use db::count_transactions;
