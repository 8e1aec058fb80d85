//! Pull-based pipeline stages.
//!
//! A stage owns its upstream and produces one item per `pull_next` call.
//! `Ok(None)` is end-of-sequence; errors surface to the puller unchanged.

use crate::RouteResult;

/// A pull-based producer.
pub trait Pipe {
    type Item;

    /// Produce the next item, or `None` once the sequence has ended.
    fn pull_next(&mut self) -> RouteResult<Option<Self::Item>>;
}

impl<P: Pipe + ?Sized> Pipe for Box<P> {
    type Item = P::Item;

    fn pull_next(&mut self) -> RouteResult<Option<Self::Item>> {
        (**self).pull_next()
    }
}

/// Leaf stage over an in-memory iterator.
pub struct IterPipe<I> {
    iter: I,
}

impl<I: Iterator> IterPipe<I> {
    pub fn new(iter: I) -> Self {
        Self { iter }
    }
}

impl<I: Iterator> Pipe for IterPipe<I> {
    type Item = I::Item;

    fn pull_next(&mut self) -> RouteResult<Option<Self::Item>> {
        Ok(self.iter.next())
    }
}

/// Applies a fallible transform to every upstream item.
pub struct MapPipe<P, F> {
    upstream: P,
    transform: F,
}

impl<P, F> MapPipe<P, F> {
    pub fn new(upstream: P, transform: F) -> Self {
        Self {
            upstream,
            transform,
        }
    }
}

impl<P, F, U> Pipe for MapPipe<P, F>
where
    P: Pipe,
    F: FnMut(P::Item) -> RouteResult<U>,
{
    type Item = U;

    fn pull_next(&mut self) -> RouteResult<Option<U>> {
        match self.upstream.pull_next()? {
            Some(item) => (self.transform)(item).map(Some),
            None => Ok(None),
        }
    }
}

/// Passes through the upstream items accepted by a predicate.
pub struct SelectPipe<P, F> {
    upstream: P,
    predicate: F,
}

impl<P, F> SelectPipe<P, F> {
    pub fn new(upstream: P, predicate: F) -> Self {
        Self {
            upstream,
            predicate,
        }
    }
}

impl<P, F> Pipe for SelectPipe<P, F>
where
    P: Pipe,
    F: FnMut(&P::Item) -> bool,
{
    type Item = P::Item;

    fn pull_next(&mut self) -> RouteResult<Option<P::Item>> {
        while let Some(item) = self.upstream.pull_next()? {
            if (self.predicate)(&item) {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }
}
