//! Undo log for the store's implicit transaction.
//!
//! A transactional store records every write here until the transaction is
//! committed (the log is cleared) or aborted (the log is replayed in
//! reverse).

use waypath_core::{Edge, EdgeId, GraphId, Value, Vertex, VertexId};

/// One reversible write.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// A vertex was created.
    CreatedVertex(VertexId),
    /// An edge was created.
    CreatedEdge(EdgeId),
    /// A vertex was removed; the full vertex is kept for restore.
    RemovedVertex(Vertex),
    /// An edge was removed; the full edge is kept for restore.
    RemovedEdge(Edge),
    /// A vertex property changed.
    PropertyUpdate {
        vertex_id: VertexId,
        name: String,
        old_value: Option<Value>,
    },
    /// A vertex clone was registered in the clone index.
    VertexCloned { source: GraphId, source_id: VertexId },
    /// An edge clone was registered in the clone index.
    EdgeCloned { source: GraphId, source_id: EdgeId },
}

/// Ordered record of uncommitted writes.
#[derive(Debug, Clone, Default)]
pub struct UndoLog {
    changes: Vec<Change>,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn clear(&mut self) {
        self.changes.clear();
    }

    /// Take every change, newest first, leaving the log empty.
    pub fn drain_newest_first(&mut self) -> impl Iterator<Item = Change> {
        std::mem::take(&mut self.changes).into_iter().rev()
    }
}
