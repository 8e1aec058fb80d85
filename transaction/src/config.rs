//! Transaction configuration.

use serde::{Deserialize, Serialize};

/// What to do with the implicit transaction a native resource keeps open
/// when an explicit base-level transaction starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplicitTransaction {
    /// Finalize pending implicit work as a success.
    #[default]
    Commit,
    /// Discard pending implicit work.
    Rollback,
    /// Leave it open; its writes become part of the new transaction.
    Ignore,
}

/// Per-resource transaction settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Treat the resource as non-native even if it supports transactions.
    ///
    /// This does not stop the resource from opening implicit transactions
    /// of its own.
    pub disable_transactions: bool,
    /// Policy applied before each base-level transaction.
    pub implicit_transaction: ImplicitTransaction,
}

/// Options for a single `transaction` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionOptions {
    /// Allow this call to nest inside an open real transaction.
    pub nesting: bool,
}

impl TransactionOptions {
    /// Options that allow nesting.
    pub fn nested() -> Self {
        Self { nesting: true }
    }
}
