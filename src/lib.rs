//! Pocket Ledger is a personal finance ledger for a single user on a single
//! device.
//!
//! This library provides the persistence and aggregation layer: a SQLite
//! backed store of income and expense transactions and their categories, and
//! a summary aggregator that derives total income, total expense and the net
//! balance from the stored transactions.
//!
//! Presentation code talks to [LedgerStore] and [SummaryAggregator] only, and
//! re-renders after every mutating call.

#![warn(missing_docs)]

mod category;
mod config;
mod database_id;
mod db;
mod error;
mod store;
mod summary;
mod transaction;
mod transaction_type;

pub use category::{Category, CategoryName};
pub use config::{DEFAULT_DB_PATH, LedgerConfig};
pub use database_id::{CategoryId, TransactionId};
pub use db::initialize as initialize_db;
pub use error::{Error, ErrorKind};
pub use store::LedgerStore;
pub use summary::{Summary, SummaryAggregator, SummaryPolicy};
pub use transaction::{MAX_AMOUNT, NewTransaction, Transaction, parse_date};
pub use transaction_type::TransactionType;
