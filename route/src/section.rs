//! Sections: windows of a stream delimited by start and end events.
//!
//! A section source is not a data channel. Stages that care about window
//! boundaries register callbacks on it, and the source fires them while it
//! is being pulled.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use waypath_core::ElementType;

use crate::pipe::Pipe;
use crate::route::{BoxPipe, Route};
use crate::RouteResult;

/// Callback fired with a section's marker and its index.
pub type SectionCallback<'a, M> = Box<dyn FnMut(&M, usize) + 'a>;

/// Callback registration for section boundaries.
pub trait SectionSource<'a, M> {
    fn on_section_start(&self, callback: SectionCallback<'a, M>);
    fn on_section_end(&self, callback: SectionCallback<'a, M>);
}

struct Listeners<'a, M> {
    start: Vec<SectionCallback<'a, M>>,
    end: Vec<SectionCallback<'a, M>>,
}

/// Shared handle to the listeners of one section stage.
pub struct SectionEvents<'a, M> {
    listeners: Rc<RefCell<Listeners<'a, M>>>,
}

impl<'a, M> SectionEvents<'a, M> {
    pub fn new() -> Self {
        Self {
            listeners: Rc::new(RefCell::new(Listeners {
                start: Vec::new(),
                end: Vec::new(),
            })),
        }
    }

    pub fn fire_start(&self, marker: &M, index: usize) {
        for callback in self.listeners.borrow_mut().start.iter_mut() {
            callback(marker, index);
        }
    }

    pub fn fire_end(&self, marker: &M, index: usize) {
        for callback in self.listeners.borrow_mut().end.iter_mut() {
            callback(marker, index);
        }
    }
}

impl<M> Default for SectionEvents<'_, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for SectionEvents<'_, M> {
    fn clone(&self) -> Self {
        Self {
            listeners: Rc::clone(&self.listeners),
        }
    }
}

impl<'a, M> SectionSource<'a, M> for SectionEvents<'a, M> {
    fn on_section_start(&self, callback: SectionCallback<'a, M>) {
        self.listeners.borrow_mut().start.push(callback);
    }

    fn on_section_end(&self, callback: SectionCallback<'a, M>) {
        self.listeners.borrow_mut().end.push(callback);
    }
}

/// Expands each upstream marker into its children, firing a start event
/// before the first child and an end event after the last.
pub struct Sections<'a, M, T> {
    upstream: BoxPipe<'a, M>,
    expand: Box<dyn FnMut(&M) -> RouteResult<Vec<T>> + 'a>,
    events: SectionEvents<'a, M>,
    current: Option<M>,
    children: VecDeque<T>,
    index: usize,
}

impl<'a, M, T> Sections<'a, M, T> {
    pub fn new<F>(upstream: BoxPipe<'a, M>, expand: F) -> Self
    where
        F: FnMut(&M) -> RouteResult<Vec<T>> + 'a,
    {
        Self {
            upstream,
            expand: Box::new(expand),
            events: SectionEvents::new(),
            current: None,
            children: VecDeque::new(),
            index: 0,
        }
    }

    /// The event source of this stage.
    pub fn events(&self) -> SectionEvents<'a, M> {
        self.events.clone()
    }
}

impl<M, T> Pipe for Sections<'_, M, T> {
    type Item = T;

    fn pull_next(&mut self) -> RouteResult<Option<T>> {
        loop {
            if let Some(child) = self.children.pop_front() {
                return Ok(Some(child));
            }
            if let Some(marker) = self.current.take() {
                self.events.fire_end(&marker, self.index);
                self.index += 1;
            }
            let Some(marker) = self.upstream.pull_next()? else {
                return Ok(None);
            };
            self.events.fire_start(&marker, self.index);
            self.children = (self.expand)(&marker)?.into();
            self.current = Some(marker);
        }
    }
}

impl<'a, M: 'a> Route<'a, M> {
    /// Expand every item into a section of children.
    ///
    /// Returns the child route together with the section events that stages
    /// further down can subscribe to.
    pub fn sections<T, F>(
        self,
        element_type: ElementType,
        expand: F,
    ) -> (Route<'a, T>, SectionEvents<'a, M>)
    where
        T: 'a,
        F: FnMut(&M) -> RouteResult<Vec<T>> + 'a,
    {
        let mut events = None;
        let route = self.chain(element_type, |pipe| {
            let sections = Sections::new(pipe, expand);
            events = Some(sections.events());
            sections
        });
        (route, events.unwrap_or_default())
    }
}
