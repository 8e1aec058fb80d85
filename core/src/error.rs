//! Common error types for graph storage.

use crate::{EdgeId, VertexId};
use thiserror::Error;

/// Errors that can occur during graph operations.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Vertex not found.
    #[error("Vertex not found: {0}")]
    VertexNotFound(VertexId),

    /// Edge not found.
    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),

    /// An edge could not be cloned because its endpoints are absent in the target.
    #[error("Vertex not found for edge {edge}: {out_vertex} -> {in_vertex}")]
    MissingEndpoints {
        edge: EdgeId,
        out_vertex: VertexId,
        in_vertex: VertexId,
    },

    /// Invalid operation.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl GraphError {
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
