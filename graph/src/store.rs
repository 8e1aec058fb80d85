//! In-memory element storage.

use std::collections::HashMap;

use waypath_core::{
    Edge, EdgeId, GraphError, GraphId, GraphResult, Properties, Value, Vertex, VertexId,
};

use crate::buffer::{Change, UndoLog};
use crate::index::{AdjacencyIndex, LabelIndex};

/// ID allocator for vertices and edges.
#[derive(Debug)]
struct IdAllocator {
    next_vertex_id: u64,
    next_edge_id: u64,
}

impl IdAllocator {
    fn new() -> Self {
        Self {
            next_vertex_id: 1,
            next_edge_id: 1,
        }
    }

    fn alloc_vertex_id(&mut self) -> VertexId {
        let id = VertexId::new(self.next_vertex_id);
        self.next_vertex_id += 1;
        id
    }

    fn alloc_edge_id(&mut self) -> EdgeId {
        let id = EdgeId::new(self.next_edge_id);
        self.next_edge_id += 1;
        id
    }
}

/// Vertex and edge storage with indexes, a clone index, and an optional
/// undo log.
///
/// When the undo log is enabled every write is part of an implicit
/// transaction that stays open until [`Store::commit`] or [`Store::abort`].
#[derive(Debug)]
pub struct Store {
    vertices: HashMap<VertexId, Vertex>,
    edges: HashMap<EdgeId, Edge>,
    id_alloc: IdAllocator,
    adjacency: AdjacencyIndex,
    labels: LabelIndex,
    /// (source graph, source vertex) -> local clone
    vertex_clones: HashMap<(GraphId, VertexId), VertexId>,
    /// (source graph, source edge) -> local clone
    edge_clones: HashMap<(GraphId, EdgeId), EdgeId>,
    undo: Option<UndoLog>,
}

impl Store {
    /// Create an empty store. `transactional` enables the undo log.
    pub fn new(transactional: bool) -> Self {
        Self {
            vertices: HashMap::new(),
            edges: HashMap::new(),
            id_alloc: IdAllocator::new(),
            adjacency: AdjacencyIndex::new(),
            labels: LabelIndex::new(),
            vertex_clones: HashMap::new(),
            edge_clones: HashMap::new(),
            undo: transactional.then(UndoLog::new),
        }
    }

    // ==================== Vertex Operations ====================

    /// Create a new vertex with the given properties.
    pub fn add_vertex(&mut self, properties: Properties) -> VertexId {
        let id = self.id_alloc.alloc_vertex_id();
        self.vertices.insert(id, Vertex::new(id, properties));
        self.record(Change::CreatedVertex(id));
        id
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    /// Set a property on a vertex.
    pub fn set_vertex_property(
        &mut self,
        id: VertexId,
        name: &str,
        value: Value,
    ) -> GraphResult<()> {
        let vertex = self
            .vertices
            .get_mut(&id)
            .ok_or(GraphError::VertexNotFound(id))?;
        let old_value = vertex.properties.insert(name.to_string(), value);
        self.record(Change::PropertyUpdate {
            vertex_id: id,
            name: name.to_string(),
            old_value,
        });
        Ok(())
    }

    /// Remove a vertex and every edge touching it.
    pub fn remove_vertex(&mut self, id: VertexId) -> GraphResult<()> {
        if !self.vertices.contains_key(&id) {
            return Err(GraphError::VertexNotFound(id));
        }

        let incident: Vec<EdgeId> = self.adjacency.edges_involving(id).collect();
        for edge_id in incident {
            self.remove_edge(edge_id)?;
        }

        if let Some(vertex) = self.vertices.remove(&id) {
            self.record(Change::RemovedVertex(vertex));
        }
        Ok(())
    }

    // ==================== Edge Operations ====================

    /// Create a new edge. Both endpoints must exist.
    pub fn add_edge(
        &mut self,
        label: &str,
        out_vertex: VertexId,
        in_vertex: VertexId,
        properties: Properties,
    ) -> GraphResult<EdgeId> {
        for endpoint in [out_vertex, in_vertex] {
            if !self.vertices.contains_key(&endpoint) {
                return Err(GraphError::VertexNotFound(endpoint));
            }
        }

        let id = self.id_alloc.alloc_edge_id();
        self.attach_edge(Edge::new(id, label, out_vertex, in_vertex, properties));
        self.record(Change::CreatedEdge(id));
        Ok(id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> GraphResult<()> {
        let edge = self.detach_edge(id).ok_or(GraphError::EdgeNotFound(id))?;
        self.record(Change::RemovedEdge(edge));
        Ok(())
    }

    // ==================== Query Operations ====================

    pub fn edges_out(&self, vertex_id: VertexId) -> impl Iterator<Item = EdgeId> + '_ {
        self.adjacency.edges_out(vertex_id)
    }

    pub fn edges_in(&self, vertex_id: VertexId) -> impl Iterator<Item = EdgeId> + '_ {
        self.adjacency.edges_in(vertex_id)
    }

    pub fn edges_by_label(&self, label: &str) -> impl Iterator<Item = EdgeId> + '_ {
        self.labels.get(label)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All vertex ids in ascending order.
    pub fn vertex_ids(&self) -> Vec<VertexId> {
        let mut ids: Vec<VertexId> = self.vertices.keys().copied().collect();
        ids.sort();
        ids
    }

    /// All edge ids in ascending order.
    pub fn edge_ids(&self) -> Vec<EdgeId> {
        let mut ids: Vec<EdgeId> = self.edges.keys().copied().collect();
        ids.sort();
        ids
    }

    // ==================== Clone Index ====================

    /// The local clone of a vertex from another graph, if it still exists.
    pub fn vertex_clone(&self, source: GraphId, source_id: VertexId) -> Option<VertexId> {
        self.vertex_clones
            .get(&(source, source_id))
            .copied()
            .filter(|id| self.vertices.contains_key(id))
    }

    /// The local clone of an edge from another graph, if it still exists.
    pub fn edge_clone(&self, source: GraphId, source_id: EdgeId) -> Option<EdgeId> {
        self.edge_clones
            .get(&(source, source_id))
            .copied()
            .filter(|id| self.edges.contains_key(id))
    }

    pub fn record_vertex_clone(&mut self, source: GraphId, source_id: VertexId, local: VertexId) {
        self.vertex_clones.insert((source, source_id), local);
        self.record(Change::VertexCloned { source, source_id });
    }

    pub fn record_edge_clone(&mut self, source: GraphId, source_id: EdgeId, local: EdgeId) {
        self.edge_clones.insert((source, source_id), local);
        self.record(Change::EdgeCloned { source, source_id });
    }

    // ==================== Implicit Transaction ====================

    pub fn is_transactional(&self) -> bool {
        self.undo.is_some()
    }

    /// Whether writes are waiting for a commit or abort.
    pub fn has_pending_changes(&self) -> bool {
        self.undo.as_ref().is_some_and(|log| !log.is_empty())
    }

    /// Make every pending write permanent.
    pub fn commit(&mut self) {
        if let Some(log) = self.undo.as_mut() {
            log.clear();
        }
    }

    /// Undo every pending write, newest first.
    pub fn abort(&mut self) {
        let Some(mut log) = self.undo.take() else {
            return;
        };
        for change in log.drain_newest_first() {
            self.revert(change);
        }
        self.undo = Some(log);
    }

    fn revert(&mut self, change: Change) {
        match change {
            Change::CreatedVertex(id) => {
                self.vertices.remove(&id);
            }
            Change::CreatedEdge(id) => {
                self.detach_edge(id);
            }
            Change::RemovedVertex(vertex) => {
                self.vertices.insert(vertex.id, vertex);
            }
            Change::RemovedEdge(edge) => {
                self.attach_edge(edge);
            }
            Change::PropertyUpdate {
                vertex_id,
                name,
                old_value,
            } => {
                if let Some(vertex) = self.vertices.get_mut(&vertex_id) {
                    match old_value {
                        Some(value) => vertex.properties.insert(name, value),
                        None => vertex.properties.remove(&name),
                    };
                }
            }
            Change::VertexCloned { source, source_id } => {
                self.vertex_clones.remove(&(source, source_id));
            }
            Change::EdgeCloned { source, source_id } => {
                self.edge_clones.remove(&(source, source_id));
            }
        }
    }

    fn record(&mut self, change: Change) {
        if let Some(log) = self.undo.as_mut() {
            log.record(change);
        }
    }

    fn attach_edge(&mut self, edge: Edge) {
        self.adjacency.insert(edge.id, edge.out_vertex, edge.in_vertex);
        self.labels.insert(&edge.label, edge.id);
        self.edges.insert(edge.id, edge);
    }

    fn detach_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(&id)?;
        self.adjacency.remove(id, edge.out_vertex, edge.in_vertex);
        self.labels.remove(&edge.label, id);
        Some(edge)
    }
}
