//! Operations over routes of paths.

use std::collections::HashSet;
use std::ops::{Range, RangeFrom, RangeInclusive, RangeTo, RangeToInclusive};

use waypath_core::{EdgeId, Element, ElementType, Path, Properties, Slot, Value};
use waypath_graph::{CloneOptions, Graph};

use crate::bulk::{bulk_job, DEFAULT_BULK_JOB_SIZE};
use crate::route::Route;
use crate::{RouteError, RouteResult};

/// Options for [`Route::subgraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubgraphOptions {
    /// Skip deferred edges whose endpoints are still missing.
    pub ignore_missing_vertices: bool,
    /// Warn about deferred edges whose endpoints are still missing.
    pub show_missing_vertices: bool,
    /// Clone the missing endpoints of deferred edges from the source.
    pub create_vertices: bool,
    /// Elements processed between commits on the target.
    pub bulk_job_size: usize,
}

impl Default for SubgraphOptions {
    fn default() -> Self {
        Self {
            ignore_missing_vertices: false,
            show_missing_vertices: false,
            create_vertices: false,
            bulk_job_size: DEFAULT_BULK_JOB_SIZE,
        }
    }
}

impl SubgraphOptions {
    fn retry_options(&self) -> CloneOptions {
        CloneOptions {
            ignore_missing_vertices: self.ignore_missing_vertices,
            show_missing_vertices: self.show_missing_vertices,
            create_vertices: self.create_vertices,
        }
    }
}

/// Accepts or rejects a path length.
pub trait LengthMatcher {
    fn matches(&self, len: usize) -> bool;
}

impl LengthMatcher for usize {
    fn matches(&self, len: usize) -> bool {
        *self == len
    }
}

macro_rules! range_matcher {
    ($($range:ty),+) => {
        $(
            impl LengthMatcher for $range {
                fn matches(&self, len: usize) -> bool {
                    self.contains(&len)
                }
            }
        )+
    };
}

range_matcher!(
    Range<usize>,
    RangeInclusive<usize>,
    RangeFrom<usize>,
    RangeTo<usize>,
    RangeToInclusive<usize>
);

impl<'a> Route<'a, Path> {
    /// Materialize every path and transpose the resulting matrix, so that
    /// `result[i][j] == input[j][i]`.
    ///
    /// All paths must have the same length.
    pub fn transpose(self) -> RouteResult<Vec<Path>> {
        let paths = self.collect_all()?;
        let Some(width) = paths.first().map(Path::len) else {
            return Ok(Vec::new());
        };
        if let Some((position, path)) = paths
            .iter()
            .enumerate()
            .find(|(_, path)| path.len() != width)
        {
            return Err(RouteError::shape_mismatch(width, path.len(), position));
        }

        let mut rows: Vec<Vec<Slot>> = (0..width)
            .map(|_| Vec::with_capacity(paths.len()))
            .collect();
        for path in paths {
            for (row, slot) in rows.iter_mut().zip(path) {
                row.push(slot);
            }
        }
        Ok(rows.into_iter().map(Path::new).collect())
    }

    /// Copy every vertex and edge on this route's paths into `target`, or
    /// into a fresh graph when no target is given. Returns the target.
    ///
    /// Edges whose endpoints are not in the target yet are deferred and
    /// retried from the source graph once all paths have been copied; the
    /// retry honours the missing-vertex options.
    pub fn subgraph(self, target: Option<Graph>, options: SubgraphOptions) -> RouteResult<Graph> {
        let source = self.graph().cloned().ok_or(RouteError::NoGraph)?;
        if target.as_ref() == Some(&source) {
            return Err(RouteError::SelfSubgraph);
        }
        let target = target.unwrap_or_default();

        let mut deferred: Vec<EdgeId> = Vec::new();
        let mut seen: HashSet<EdgeId> = HashSet::new();
        bulk_job(self, &target, options.bulk_job_size, |path| {
            for vertex in path.elements().filter_map(Element::as_vertex) {
                target.clone_vertex_from(&source, vertex)?;
            }
            for edge in path.elements().filter_map(Element::as_edge) {
                let cloned = target.clone_edge_from(&source, edge, CloneOptions::ignore_missing())?;
                if cloned.is_none() && seen.insert(edge.id) {
                    deferred.push(edge.id);
                }
            }
            Ok(())
        })?;

        if !deferred.is_empty() {
            tracing::debug!(
                source = %source.id(),
                target = %target.id(),
                count = deferred.len(),
                "retrying deferred edges"
            );
            let retry = options.retry_options();
            bulk_job(
                Route::edges(&source, deferred),
                &target,
                options.bulk_job_size,
                |edge| {
                    target.clone_edge_from(&source, &edge, retry)?;
                    Ok(())
                },
            )?;
        }

        Ok(target)
    }

    /// Replace every element by its payload, leaving a hole where an
    /// element carries none.
    pub fn payloads(self) -> Route<'a, Path> {
        self.map(ElementType::Path, |path| {
            Ok(path
                .into_iter()
                .map(|slot| slot.and_then(|e| e.payload().cloned()).map(Element::Scalar))
                .collect::<Path>())
        })
        .with_name("payloads")
    }

    /// Drop the holes of every path.
    pub fn compact_paths(self) -> Route<'a, Path> {
        self.map(ElementType::Path, |path| Ok(path.compact()))
            .with_name("compact")
    }

    /// The first position of every path. `element_type` only labels the
    /// resulting route.
    pub fn heads(self, element_type: ElementType) -> Route<'a, Slot> {
        self.map(element_type, |path| slot_at(&path, 0))
            .with_name("heads")
    }

    /// The last position of every path. `element_type` only labels the
    /// resulting route.
    pub fn tails(self, element_type: ElementType) -> Route<'a, Slot> {
        self.map(element_type, |path| slot_at(&path, -1))
            .with_name("tails")
    }

    /// Two-position paths holding the slots at `head` and `tail`. Negative
    /// indices count from the end.
    pub fn pairs(self, head: isize, tail: isize) -> Route<'a, Path> {
        self.map(ElementType::Path, move |path| {
            Ok(Path::new(vec![slot_at(&path, head)?, slot_at(&path, tail)?]))
        })
        .with_name(format!("pairs[{},{}]", head, tail))
    }

    /// Keep the paths whose length satisfies `matcher`.
    pub fn len<L>(self, matcher: L) -> Route<'a, Path>
    where
        L: LengthMatcher + 'a,
    {
        self.select(move |path| matcher.matches(path.len()))
    }

    /// Fold every path, right to left, into a tree: a vertex merges its
    /// properties into the tree, an edge wraps it as `{label: [tree]}`.
    pub fn hashify(self) -> Route<'a, Value> {
        self.map(ElementType::Hash, |path| Ok(Value::Map(fold_tree(&path))))
            .with_name("trees")
    }
}

fn slot_at(path: &Path, index: isize) -> RouteResult<Slot> {
    path.get(index)
        .cloned()
        .ok_or_else(|| RouteError::index_out_of_range(index, path.len()))
}

fn fold_tree(path: &Path) -> Properties {
    path.iter().rev().flatten().fold(Properties::new(), |mut tree, element| match element {
        Element::Vertex(vertex) => {
            tree.extend(vertex.properties.clone());
            tree
        }
        Element::Edge(edge) => {
            let mut wrapped = Properties::new();
            wrapped.insert(edge.label.clone(), Value::List(vec![Value::Map(tree)]));
            wrapped
        }
        Element::Scalar(_) => tree,
    })
}
