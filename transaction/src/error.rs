//! Transaction error types.

use thiserror::Error;

/// Transaction errors.
///
/// The three `*Rollback` variants are rollback requests raised by a
/// finalizer; they travel outward until a caller that owns a real
/// transaction aborts it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// A nested transaction was requested on a native resource without opting in.
    #[error("To use nested transactions, use nesting: true")]
    NestedTransaction,

    /// Rollback requested inside a nested real transaction.
    #[error("nested transaction rollback: {message}")]
    NestedTransactionRollback { message: String },

    /// Rollback requested inside a mock (non-native) transaction.
    #[error("mock transaction rollback: {message}")]
    MockTransactionRollback { message: String },

    /// Rollback requested inside a nested mock transaction.
    #[error("nested mock transaction rollback: {message}")]
    NestedMockTransactionRollback { message: String },

    /// A finalizer was used outside the transaction that created it.
    #[error("internal error: {message}")]
    Internal { message: String },

    /// The backing resource failed to commit or abort.
    #[error("resource error: {message}")]
    Resource { message: String },
}

impl TransactionError {
    pub fn nested_rollback(message: impl Into<String>) -> Self {
        Self::NestedTransactionRollback {
            message: message.into(),
        }
    }

    pub fn mock_rollback(message: impl Into<String>) -> Self {
        Self::MockTransactionRollback {
            message: message.into(),
        }
    }

    pub fn nested_mock_rollback(message: impl Into<String>) -> Self {
        Self::NestedMockTransactionRollback {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn resource(message: impl Into<String>) -> Self {
        Self::Resource {
            message: message.into(),
        }
    }

    /// Returns true for the rollback requests raised by finalizers.
    pub fn is_rollback(&self) -> bool {
        matches!(
            self,
            Self::NestedTransactionRollback { .. }
                | Self::MockTransactionRollback { .. }
                | Self::NestedMockTransactionRollback { .. }
        )
    }
}

/// Result type for transaction operations.
pub type TransactionResult<T> = Result<T, TransactionError>;
