//! Routes: typed, lazy sequences built by stacking pipes.

use std::fmt;

use waypath_core::{Edge, EdgeId, ElementType, GraphError, Path, Vertex};
use waypath_graph::Graph;

use crate::pipe::{IterPipe, MapPipe, Pipe, SelectPipe};
use crate::{RouteError, RouteResult};

/// A boxed pipe producing `T`.
pub type BoxPipe<'a, T> = Box<dyn Pipe<Item = T> + 'a>;

/// A lazy, single-pass sequence of `T`.
///
/// A route records the element type it declares, an optional name used in
/// logs, and the graph its elements come from.
pub struct Route<'a, T> {
    pipe: BoxPipe<'a, T>,
    element_type: ElementType,
    name: Option<String>,
    graph: Option<Graph>,
}

impl<'a, T: 'a> Route<'a, T> {
    /// Wrap a pipe as a route.
    pub fn new(pipe: impl Pipe<Item = T> + 'a, element_type: ElementType) -> Self {
        Self {
            pipe: Box::new(pipe),
            element_type,
            name: None,
            graph: None,
        }
    }

    /// A route over in-memory items.
    pub fn from_iter<I>(items: I, element_type: ElementType) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'a,
    {
        Self::new(IterPipe::new(items.into_iter()), element_type)
    }

    pub fn with_graph(mut self, graph: Graph) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The graph this route's elements come from.
    pub fn graph(&self) -> Option<&Graph> {
        self.graph.as_ref()
    }

    /// Transform every item. The result declares `element_type` and keeps
    /// this route's graph.
    pub fn map<U, F>(self, element_type: ElementType, transform: F) -> Route<'a, U>
    where
        U: 'a,
        F: FnMut(T) -> RouteResult<U> + 'a,
    {
        self.chain(element_type, |pipe| MapPipe::new(pipe, transform))
    }

    /// Keep the items accepted by `predicate`.
    pub fn select<F>(self, predicate: F) -> Route<'a, T>
    where
        F: FnMut(&T) -> bool + 'a,
    {
        let element_type = self.element_type;
        let name = self.name.clone();
        let route = self.chain(element_type, |pipe| SelectPipe::new(pipe, predicate));
        Route { name, ..route }
    }

    /// Stack a stage built from this route's pipe. The result keeps this
    /// route's graph.
    pub fn chain<U, P, B>(self, element_type: ElementType, build: B) -> Route<'a, U>
    where
        U: 'a,
        P: Pipe<Item = U> + 'a,
        B: FnOnce(BoxPipe<'a, T>) -> P,
    {
        Route {
            pipe: Box::new(build(self.pipe)),
            element_type,
            name: None,
            graph: self.graph,
        }
    }

    /// Pull the next item.
    pub fn pull_next(&mut self) -> RouteResult<Option<T>> {
        self.pipe.pull_next()
    }

    /// Pull every remaining item.
    pub fn collect_all(self) -> RouteResult<Vec<T>> {
        self.collect()
    }
}

impl<'a> Route<'a, Path> {
    /// A route over paths drawn from `graph`.
    pub fn paths<I>(graph: &Graph, paths: I) -> Self
    where
        I: IntoIterator<Item = Path>,
        I::IntoIter: 'a,
    {
        Self::from_iter(paths, ElementType::Path).with_graph(graph.clone())
    }
}

impl<'a> Route<'a, Vertex> {
    /// Every vertex of `graph`, in id order.
    pub fn vertices(graph: &Graph) -> Self {
        Self::from_iter(graph.vertices(), ElementType::Vertex).with_graph(graph.clone())
    }
}

impl<'a> Route<'a, Edge> {
    /// The edges of `graph` with the given ids, looked up as they are pulled.
    pub fn edges<I>(graph: &Graph, ids: I) -> Self
    where
        I: IntoIterator<Item = EdgeId>,
        I::IntoIter: 'a,
    {
        let lookup = graph.clone();
        Route::from_iter(ids, ElementType::Edge)
            .map(ElementType::Edge, move |id| {
                lookup
                    .edge(id)
                    .ok_or_else(|| RouteError::from(GraphError::EdgeNotFound(id)))
            })
            .with_graph(graph.clone())
    }
}

impl<'a, T: 'a> Iterator for Route<'a, T> {
    type Item = RouteResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.pull_next().transpose()
    }
}

impl<T> fmt::Debug for Route<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("element_type", &self.element_type)
            .field("name", &self.name)
            .field("graph", &self.graph.as_ref().map(Graph::id))
            .finish()
    }
}
