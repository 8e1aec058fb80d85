//! Indexes for edge lookups.

use std::collections::{HashMap, HashSet};

use waypath_core::{EdgeId, VertexId};

/// Adjacency index: VertexId -> outgoing and incoming edges.
#[derive(Debug, Default)]
pub struct AdjacencyIndex {
    outgoing: HashMap<VertexId, HashSet<EdgeId>>,
    incoming: HashMap<VertexId, HashSet<EdgeId>>,
}

impl AdjacencyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, edge_id: EdgeId, out_vertex: VertexId, in_vertex: VertexId) {
        self.outgoing.entry(out_vertex).or_default().insert(edge_id);
        self.incoming.entry(in_vertex).or_default().insert(edge_id);
    }

    pub fn remove(&mut self, edge_id: EdgeId, out_vertex: VertexId, in_vertex: VertexId) {
        remove_from(&mut self.outgoing, out_vertex, edge_id);
        remove_from(&mut self.incoming, in_vertex, edge_id);
    }

    pub fn edges_out(&self, vertex_id: VertexId) -> impl Iterator<Item = EdgeId> + '_ {
        self.outgoing
            .get(&vertex_id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn edges_in(&self, vertex_id: VertexId) -> impl Iterator<Item = EdgeId> + '_ {
        self.incoming
            .get(&vertex_id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// All edges touching a vertex, each reported once.
    pub fn edges_involving(&self, vertex_id: VertexId) -> impl Iterator<Item = EdgeId> + '_ {
        let mut seen = HashSet::new();
        self.edges_out(vertex_id)
            .chain(self.edges_in(vertex_id))
            .filter(move |id| seen.insert(*id))
    }
}

/// Label index: label -> Set<EdgeId>
#[derive(Debug, Default)]
pub struct LabelIndex {
    index: HashMap<String, HashSet<EdgeId>>,
}

impl LabelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: &str, edge_id: EdgeId) {
        self.index.entry(label.to_string()).or_default().insert(edge_id);
    }

    pub fn remove(&mut self, label: &str, edge_id: EdgeId) {
        if let Some(set) = self.index.get_mut(label) {
            set.remove(&edge_id);
            if set.is_empty() {
                self.index.remove(label);
            }
        }
    }

    pub fn get(&self, label: &str) -> impl Iterator<Item = EdgeId> + '_ {
        self.index
            .get(label)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }
}

fn remove_from(map: &mut HashMap<VertexId, HashSet<EdgeId>>, key: VertexId, edge_id: EdgeId) {
    if let Some(set) = map.get_mut(&key) {
        set.remove(&edge_id);
        if set.is_empty() {
            map.remove(&key);
        }
    }
}
