//! Shared graph handle.

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use waypath_core::{
    Edge, EdgeId, GraphError, GraphId, GraphResult, Properties, Value, Vertex, VertexId,
};
use waypath_transaction::{
    Transaction, TransactionConfig, TransactionError, TransactionManager, TransactionOptions,
    TransactionResult, TransactionalResource,
};

use crate::store::Store;

/// Flags controlling how an edge is cloned when its endpoints have no
/// clone in the target yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloneOptions {
    /// Return `Ok(None)` instead of failing.
    pub ignore_missing_vertices: bool,
    /// Log a warning naming the edge and its missing endpoints.
    pub show_missing_vertices: bool,
    /// Clone the missing endpoints from the source first.
    pub create_vertices: bool,
}

impl CloneOptions {
    /// Options that skip edges with missing endpoints.
    pub fn ignore_missing() -> Self {
        Self {
            ignore_missing_vertices: true,
            ..Self::default()
        }
    }

    /// Options that clone missing endpoints on demand.
    pub fn create_vertices() -> Self {
        Self {
            create_vertices: true,
            ..Self::default()
        }
    }
}

struct Shared {
    id: GraphId,
    store: RwLock<Store>,
}

impl TransactionalResource for Shared {
    fn supports_transactions(&self) -> bool {
        self.store.read().is_transactional()
    }

    fn commit_all(&self) -> TransactionResult<()> {
        self.store.write().commit();
        tracing::trace!(graph = %self.id, "implicit transaction committed");
        Ok(())
    }

    fn abort_all(&self) -> TransactionResult<()> {
        let mut store = self.store.write();
        if !store.is_transactional() {
            return Err(TransactionError::resource(format!(
                "graph {} does not support transactions",
                self.id
            )));
        }
        store.abort();
        tracing::trace!(graph = %self.id, "implicit transaction aborted");
        Ok(())
    }
}

/// An in-memory graph with its own transaction manager.
///
/// Cloning the handle shares the underlying storage.
#[derive(Clone)]
pub struct Graph {
    shared: Arc<Shared>,
    transactions: Arc<TransactionManager>,
}

impl Graph {
    /// Create an empty, natively transactional graph.
    pub fn new() -> Self {
        Self::with_config(true, TransactionConfig::default())
    }

    /// Create an empty graph without native transactions. Every
    /// transaction on it is mocked.
    pub fn non_transactional() -> Self {
        Self::with_config(false, TransactionConfig::default())
    }

    pub fn with_config(transactional: bool, config: TransactionConfig) -> Self {
        let shared = Arc::new(Shared {
            id: GraphId::next(),
            store: RwLock::new(Store::new(transactional)),
        });
        let resource: Arc<dyn TransactionalResource> = shared.clone();
        Self {
            shared,
            transactions: Arc::new(TransactionManager::with_config(resource, config)),
        }
    }

    pub fn id(&self) -> GraphId {
        self.shared.id
    }

    pub fn transactions(&self) -> &TransactionManager {
        &self.transactions
    }

    /// Run `body` in a transaction on this graph.
    pub fn transaction<T, E, F>(&self, options: TransactionOptions, body: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction) -> Result<T, E>,
        E: From<TransactionError> + fmt::Display,
    {
        self.transactions.transaction(options, body)
    }

    /// Read access to the store.
    pub fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.shared.store.read()
    }

    // ==================== CRUD ====================

    pub fn add_vertex(&self, properties: Properties) -> VertexId {
        self.shared.store.write().add_vertex(properties)
    }

    pub fn add_edge(
        &self,
        label: &str,
        out_vertex: VertexId,
        in_vertex: VertexId,
        properties: Properties,
    ) -> GraphResult<EdgeId> {
        self.shared
            .store
            .write()
            .add_edge(label, out_vertex, in_vertex, properties)
    }

    pub fn set_vertex_property(&self, id: VertexId, name: &str, value: Value) -> GraphResult<()> {
        self.shared.store.write().set_vertex_property(id, name, value)
    }

    pub fn remove_vertex(&self, id: VertexId) -> GraphResult<()> {
        self.shared.store.write().remove_vertex(id)
    }

    pub fn remove_edge(&self, id: EdgeId) -> GraphResult<()> {
        self.shared.store.write().remove_edge(id)
    }

    pub fn vertex(&self, id: VertexId) -> Option<Vertex> {
        self.read().vertex(id).cloned()
    }

    pub fn edge(&self, id: EdgeId) -> Option<Edge> {
        self.read().edge(id).cloned()
    }

    /// All vertices in id order.
    pub fn vertices(&self) -> Vec<Vertex> {
        let store = self.read();
        store
            .vertex_ids()
            .into_iter()
            .filter_map(|id| store.vertex(id).cloned())
            .collect()
    }

    /// All edges in id order.
    pub fn edges(&self) -> Vec<Edge> {
        let store = self.read();
        store
            .edge_ids()
            .into_iter()
            .filter_map(|id| store.edge(id).cloned())
            .collect()
    }

    pub fn edges_out(&self, id: VertexId) -> Vec<Edge> {
        self.collect_edges(|store| store.edges_out(id).collect())
    }

    pub fn edges_in(&self, id: VertexId) -> Vec<Edge> {
        self.collect_edges(|store| store.edges_in(id).collect())
    }

    pub fn edges_by_label(&self, label: &str) -> Vec<Edge> {
        self.collect_edges(|store| store.edges_by_label(label).collect())
    }

    pub fn vertex_count(&self) -> usize {
        self.read().vertex_count()
    }

    pub fn edge_count(&self) -> usize {
        self.read().edge_count()
    }

    /// Whether the implicit transaction holds uncommitted writes.
    pub fn has_pending_changes(&self) -> bool {
        self.read().has_pending_changes()
    }

    // ==================== Cloning ====================

    /// Copy a vertex of `source` into this graph.
    ///
    /// Idempotent: a vertex already cloned from the same source returns the
    /// existing clone.
    pub fn clone_vertex_from(&self, source: &Graph, vertex: &Vertex) -> GraphResult<VertexId> {
        self.ensure_foreign(source)?;
        let mut store = self.shared.store.write();
        if let Some(existing) = store.vertex_clone(source.id(), vertex.id) {
            return Ok(existing);
        }
        let id = store.add_vertex(vertex.properties.clone());
        store.record_vertex_clone(source.id(), vertex.id, id);
        tracing::trace!(source = %vertex.id, clone = %id, "vertex cloned");
        Ok(id)
    }

    /// Copy an edge of `source` into this graph, attaching it to the clones
    /// of its endpoints.
    ///
    /// Returns `Ok(None)` when an endpoint has no clone and
    /// `ignore_missing_vertices` is set.
    pub fn clone_edge_from(
        &self,
        source: &Graph,
        edge: &Edge,
        options: CloneOptions,
    ) -> GraphResult<Option<EdgeId>> {
        self.ensure_foreign(source)?;
        let source_id = source.id();

        if let Some(existing) = self.read().edge_clone(source_id, edge.id) {
            return Ok(Some(existing));
        }

        if options.create_vertices {
            for endpoint in edge.endpoints() {
                let vertex = source
                    .vertex(endpoint)
                    .ok_or(GraphError::VertexNotFound(endpoint))?;
                self.clone_vertex_from(source, &vertex)?;
            }
        }

        let mut store = self.shared.store.write();
        let out_vertex = store.vertex_clone(source_id, edge.out_vertex);
        let in_vertex = store.vertex_clone(source_id, edge.in_vertex);
        let (Some(out_vertex), Some(in_vertex)) = (out_vertex, in_vertex) else {
            if options.show_missing_vertices {
                tracing::warn!(
                    edge = %edge.id,
                    out_vertex = %edge.out_vertex,
                    in_vertex = %edge.in_vertex,
                    found_out = out_vertex.is_some(),
                    found_in = in_vertex.is_some(),
                    "vertex not found for edge"
                );
            }
            if options.ignore_missing_vertices {
                return Ok(None);
            }
            return Err(GraphError::MissingEndpoints {
                edge: edge.id,
                out_vertex: edge.out_vertex,
                in_vertex: edge.in_vertex,
            });
        };

        let id = store.add_edge(&edge.label, out_vertex, in_vertex, edge.properties.clone())?;
        store.record_edge_clone(source_id, edge.id, id);
        tracing::trace!(source = %edge.id, clone = %id, "edge cloned");
        Ok(Some(id))
    }

    /// The clone of a source vertex in this graph, if any.
    pub fn cloned_vertex(&self, source: &Graph, id: VertexId) -> Option<VertexId> {
        self.read().vertex_clone(source.id(), id)
    }

    /// The clone of a source edge in this graph, if any.
    pub fn cloned_edge(&self, source: &Graph, id: EdgeId) -> Option<EdgeId> {
        self.read().edge_clone(source.id(), id)
    }

    fn ensure_foreign(&self, source: &Graph) -> GraphResult<()> {
        if source == self {
            return Err(GraphError::invalid_operation(format!(
                "can not clone elements of {} into itself",
                self.id()
            )));
        }
        Ok(())
    }

    fn collect_edges(&self, ids: impl FnOnce(&Store) -> Vec<EdgeId>) -> Vec<Edge> {
        let store = self.read();
        let mut ids = ids(&*store);
        ids.sort();
        ids.into_iter()
            .filter_map(|id| store.edge(id).cloned())
            .collect()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Graph {}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.read();
        f.debug_struct("Graph")
            .field("id", &self.id())
            .field("vertices", &store.vertex_count())
            .field("edges", &store.edge_count())
            .field("transactional", &store.is_transactional())
            .finish()
    }
}
