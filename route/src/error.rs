//! Route error types.

use thiserror::Error;
use waypath_core::GraphError;
use waypath_transaction::TransactionError;

/// Result type for route operations.
pub type RouteResult<T> = Result<T, RouteError>;

/// Errors surfaced to the consumer pulling a route.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Paths differ in length: expected {expected}, got {actual} at path {position}")]
    ShapeMismatch {
        expected: usize,
        actual: usize,
        position: usize,
    },

    #[error("Can't create a subgraph within itself")]
    SelfSubgraph,

    #[error("Index {index} out of range for path of length {len}")]
    IndexOutOfRange { index: isize, len: usize },

    #[error("Route has no source graph")]
    NoGraph,

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

impl RouteError {
    pub fn shape_mismatch(expected: usize, actual: usize, position: usize) -> Self {
        Self::ShapeMismatch {
            expected,
            actual,
            position,
        }
    }

    pub fn index_out_of_range(index: isize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Whether this error is a rollback request from a transaction finalizer.
    pub fn is_rollback(&self) -> bool {
        matches!(self, Self::Transaction(err) if err.is_rollback())
    }
}
