//! Graph elements.
//!
//! Vertices and edges are snapshots of stored elements as they travel
//! through a route. Either may carry an attached payload that is not part of
//! the stored element.

use crate::{EdgeId, Properties, Value, VertexId};
use std::fmt;

/// The declared element type of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Vertex,
    Edge,
    Path,
    Hash,
    Scalar,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::Vertex => "vertex",
            ElementType::Edge => "edge",
            ElementType::Path => "path",
            ElementType::Hash => "hash",
            ElementType::Scalar => "scalar",
        };
        f.write_str(name)
    }
}

/// A vertex in the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// Identifier within the owning graph.
    pub id: VertexId,
    /// Property values.
    pub properties: Properties,
    /// Attached payload, if any.
    pub payload: Option<Value>,
}

impl Vertex {
    /// Create a new vertex without a payload.
    pub fn new(id: VertexId, properties: Properties) -> Self {
        Self {
            id,
            properties,
            payload: None,
        }
    }

    /// Attach a payload to this vertex.
    pub fn with_payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Get a property value by name.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

/// A directed, labelled edge between two vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Identifier within the owning graph.
    pub id: EdgeId,
    /// Edge label.
    pub label: String,
    /// The vertex this edge leaves.
    pub out_vertex: VertexId,
    /// The vertex this edge enters.
    pub in_vertex: VertexId,
    /// Property values.
    pub properties: Properties,
    /// Attached payload, if any.
    pub payload: Option<Value>,
}

impl Edge {
    /// Create a new edge without a payload.
    pub fn new(
        id: EdgeId,
        label: impl Into<String>,
        out_vertex: VertexId,
        in_vertex: VertexId,
        properties: Properties,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            out_vertex,
            in_vertex,
            properties,
            payload: None,
        }
    }

    /// Attach a payload to this edge.
    pub fn with_payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Get a property value by name.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Both endpoints, out vertex first.
    pub fn endpoints(&self) -> [VertexId; 2] {
        [self.out_vertex, self.in_vertex]
    }
}

/// Any value a route can carry inside a path.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Vertex(Vertex),
    Edge(Edge),
    Scalar(Value),
}

impl Element {
    /// The type tag of this element.
    pub fn element_type(&self) -> ElementType {
        match self {
            Element::Vertex(_) => ElementType::Vertex,
            Element::Edge(_) => ElementType::Edge,
            Element::Scalar(_) => ElementType::Scalar,
        }
    }

    /// The attached payload of a vertex or edge.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Element::Vertex(v) => v.payload.as_ref(),
            Element::Edge(e) => e.payload.as_ref(),
            Element::Scalar(_) => None,
        }
    }

    pub fn as_vertex(&self) -> Option<&Vertex> {
        match self {
            Element::Vertex(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_edge(&self) -> Option<&Edge> {
        match self {
            Element::Edge(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Vertex> for Element {
    fn from(vertex: Vertex) -> Self {
        Element::Vertex(vertex)
    }
}

impl From<Edge> for Element {
    fn from(edge: Edge) -> Self {
        Element::Edge(edge)
    }
}

impl From<Value> for Element {
    fn from(value: Value) -> Self {
        Element::Scalar(value)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Vertex(v) => write!(f, "#<V[{}]>", v.id.raw()),
            Element::Edge(e) => write!(
                f,
                "#<E[{}]:{}-{}-{}>",
                e.id.raw(),
                e.out_vertex.raw(),
                e.label,
                e.in_vertex.raw()
            ),
            Element::Scalar(value) => write!(f, "{}", value),
        }
    }
}
