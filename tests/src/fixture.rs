//! Graph fixtures addressed by name.

use std::collections::HashMap;

use waypath_core::{props, EdgeId, Element, Path, VertexId};
use waypath_graph::Graph;

/// Builds a graph whose vertices and edges are looked up by name.
///
/// Every vertex gets a `name` property equal to its fixture name.
pub struct GraphFixture {
    graph: Graph,
    vertices: HashMap<String, VertexId>,
    edges: HashMap<String, EdgeId>,
}

impl GraphFixture {
    pub fn new() -> Self {
        Self::with_graph(Graph::new())
    }

    pub fn with_graph(graph: Graph) -> Self {
        Self {
            graph,
            vertices: HashMap::new(),
            edges: HashMap::new(),
        }
    }

    pub fn vertex(mut self, name: &str) -> Self {
        let id = self.graph.add_vertex(props! { "name" => name });
        self.vertices.insert(name.to_string(), id);
        self
    }

    pub fn edge(mut self, name: &str, label: &str, from: &str, to: &str) -> Self {
        let id = self
            .graph
            .add_edge(label, self.vertex_id(from), self.vertex_id(to), props!())
            .unwrap_or_else(|e| panic!("edge {name}: {e}"));
        self.edges.insert(name.to_string(), id);
        self
    }

    /// Commit the graph's implicit transaction.
    pub fn committed(self) -> Self {
        self.graph
            .transactions()
            .commit_implicit_transaction()
            .unwrap_or_else(|e| panic!("commit failed: {e}"));
        self
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn vertex_id(&self, name: &str) -> VertexId {
        *self
            .vertices
            .get(name)
            .unwrap_or_else(|| panic!("no vertex named {name}"))
    }

    pub fn edge_id(&self, name: &str) -> EdgeId {
        *self
            .edges
            .get(name)
            .unwrap_or_else(|| panic!("no edge named {name}"))
    }

    /// Snapshot of the named element.
    pub fn element(&self, name: &str) -> Element {
        if let Some(id) = self.vertices.get(name) {
            if let Some(vertex) = self.graph.vertex(*id) {
                return vertex.into();
            }
        }
        if let Some(id) = self.edges.get(name) {
            if let Some(edge) = self.graph.edge(*id) {
                return edge.into();
            }
        }
        panic!("no element named {name}")
    }

    /// A path over the named elements.
    pub fn path(&self, names: &[&str]) -> Path {
        Path::from(names.iter().map(|name| self.element(name)).collect::<Vec<_>>())
    }
}

impl Default for GraphFixture {
    fn default() -> Self {
        Self::new()
    }
}
