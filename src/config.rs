//! Configuration for the ledger store.

use std::path::{Path, PathBuf};

use crate::SummaryPolicy;

/// The database file used when no path is configured.
pub const DEFAULT_DB_PATH: &str = "pocketledger.db";

/// Where the ledger is stored and how storage failures are reported.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    /// File path to the SQLite database. Created on first use.
    pub db_path: PathBuf,

    /// What the summary aggregator does when the store cannot be read.
    pub summary_policy: SummaryPolicy,
}

impl LedgerConfig {
    /// Create a config for the database at `db_path` with the default summary
    /// policy.
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
            summary_policy: SummaryPolicy::default(),
        }
    }

    /// Set the database path.
    pub fn with_db_path(mut self, db_path: impl AsRef<Path>) -> Self {
        self.db_path = db_path.as_ref().to_path_buf();
        self
    }

    /// Set the summary policy.
    pub fn with_summary_policy(mut self, summary_policy: SummaryPolicy) -> Self {
        self.summary_policy = summary_policy;
        self
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DB_PATH)
    }
}
