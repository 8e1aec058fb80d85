//! The backing resource a transaction manager coordinates.

use crate::TransactionResult;

/// A store whose writes are bracketed by transactions.
///
/// A native resource keeps an implicit transaction open at all times:
/// `commit_all` finalizes everything written since the last boundary and
/// `abort_all` discards it. Non-native resources only need to answer the
/// capability probe; their boundary operations are never invoked.
pub trait TransactionalResource: Send + Sync {
    /// Whether this resource natively supports commit/abort boundaries.
    fn supports_transactions(&self) -> bool;

    /// Close the current transaction as a success.
    fn commit_all(&self) -> TransactionResult<()>;

    /// Close the current transaction as a failure.
    fn abort_all(&self) -> TransactionResult<()>;
}
