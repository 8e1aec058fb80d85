//! Section-scoped sorting.
//!
//! Elements are buffered per section window. When a window ends, its buffer
//! is sorted (stable, ties keep arrival order) and emitted in full before
//! any element of the next window. Without a section source the whole
//! stream is one window.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::pipe::Pipe;
use crate::route::{BoxPipe, Route};
use crate::section::SectionSource;
use crate::RouteResult;

type Sorter<'a, T, M> = Box<dyn FnMut(&mut Vec<T>, Option<&M>, usize) + 'a>;

struct Window<'a, T, M> {
    index: usize,
    to_sort: Vec<T>,
    to_emit: VecDeque<T>,
    sorter: Sorter<'a, T, M>,
}

impl<T, M> Window<'_, T, M> {
    fn start(&mut self, index: usize) {
        self.index = index;
        self.to_sort.clear();
        tracing::trace!(window = index, "section started");
    }

    fn end(&mut self, marker: Option<&M>, index: usize) {
        if self.to_sort.is_empty() {
            return;
        }
        let mut sorted = std::mem::take(&mut self.to_sort);
        (self.sorter)(&mut sorted, marker, index);
        tracing::trace!(window = index, count = sorted.len(), "section sorted");
        self.to_emit.extend(sorted);
    }
}

/// Stage that sorts each section window before emitting it.
pub struct SortSection<'a, T, M> {
    upstream: BoxPipe<'a, T>,
    window: Rc<RefCell<Window<'a, T, M>>>,
    exhausted: bool,
}

impl<'a, T: 'a, M: 'a> SortSection<'a, T, M> {
    /// Sort by a key computed from the element, the section marker and the
    /// window index.
    pub fn by_key<K, F>(
        upstream: BoxPipe<'a, T>,
        section: Option<&dyn SectionSource<'a, M>>,
        mut key: F,
    ) -> Self
    where
        K: Ord,
        F: FnMut(&T, Option<&M>, usize) -> K + 'a,
    {
        let sorter: Sorter<'a, T, M> = Box::new(move |buffer, marker, index| {
            let mut keyed: Vec<(K, T)> = buffer
                .drain(..)
                .map(|element| (key(&element, marker, index), element))
                .collect();
            keyed.sort_by(|(a, _), (b, _)| a.cmp(b));
            buffer.extend(keyed.into_iter().map(|(_, element)| element));
        });
        Self::with_sorter(upstream, section, sorter)
    }

    fn with_sorter(
        upstream: BoxPipe<'a, T>,
        section: Option<&dyn SectionSource<'a, M>>,
        sorter: Sorter<'a, T, M>,
    ) -> Self {
        let window = Rc::new(RefCell::new(Window {
            index: 0,
            to_sort: Vec::new(),
            to_emit: VecDeque::new(),
            sorter,
        }));

        match section {
            Some(source) => {
                let on_start = Rc::clone(&window);
                source.on_section_start(Box::new(move |_, index| {
                    on_start.borrow_mut().start(index)
                }));
                let on_end = Rc::clone(&window);
                source.on_section_end(Box::new(move |marker, index| {
                    on_end.borrow_mut().end(Some(marker), index)
                }));
            }
            None => window.borrow_mut().start(0),
        }

        Self {
            upstream,
            window,
            exhausted: false,
        }
    }
}

impl<'a, T: Ord + 'a, M: 'a> SortSection<'a, T, M> {
    /// Sort by the elements' natural order.
    pub fn natural(upstream: BoxPipe<'a, T>, section: Option<&dyn SectionSource<'a, M>>) -> Self {
        Self::with_sorter(upstream, section, Box::new(|buffer, _, _| buffer.sort()))
    }
}

impl<T, M> Pipe for SortSection<'_, T, M> {
    type Item = T;

    fn pull_next(&mut self) -> RouteResult<Option<T>> {
        loop {
            if let Some(element) = self.window.borrow_mut().to_emit.pop_front() {
                return Ok(Some(element));
            }
            if self.exhausted {
                return Ok(None);
            }
            match self.upstream.pull_next()? {
                Some(element) => self.window.borrow_mut().to_sort.push(element),
                None => {
                    // Upstream ended mid-window: close it as if its end event fired.
                    self.exhausted = true;
                    let mut window = self.window.borrow_mut();
                    let index = window.index;
                    window.end(None, index);
                    tracing::trace!(window = index, "upstream exhausted");
                }
            }
        }
    }
}

impl<'a, T: 'a> Route<'a, T> {
    /// Sort the whole route by natural order.
    pub fn sort(self) -> Route<'a, T>
    where
        T: Ord,
    {
        let element_type = self.element_type();
        self.chain(element_type, |pipe| SortSection::<T, ()>::natural(pipe, None))
    }

    /// Sort the whole route by a key.
    pub fn sort_by_key<K, F>(self, mut key: F) -> Route<'a, T>
    where
        K: Ord,
        F: FnMut(&T) -> K + 'a,
    {
        let element_type = self.element_type();
        self.chain(element_type, |pipe| {
            SortSection::<T, ()>::by_key(pipe, None, move |element, _, _| key(element))
        })
    }

    /// Sort each window of `section` by natural order.
    pub fn sort_section<M: 'a>(self, section: &dyn SectionSource<'a, M>) -> Route<'a, T>
    where
        T: Ord,
    {
        let element_type = self.element_type();
        self.chain(element_type, |pipe| SortSection::natural(pipe, Some(section)))
    }

    /// Sort each window of `section` by a key computed from the element,
    /// the window's marker and its index.
    pub fn sort_section_by<M: 'a, K, F>(
        self,
        section: &dyn SectionSource<'a, M>,
        key: F,
    ) -> Route<'a, T>
    where
        K: Ord,
        F: FnMut(&T, Option<&M>, usize) -> K + 'a,
    {
        let element_type = self.element_type();
        self.chain(element_type, |pipe| {
            SortSection::by_key(pipe, Some(section), key)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipe::IterPipe;
    use std::cmp::Reverse;
    use waypath_core::{ElementType, SortKey, Value};

    /// Upstream whose pull count is observable.
    struct Counting {
        items: std::vec::IntoIter<i32>,
        pulls: Rc<RefCell<usize>>,
    }

    impl Pipe for Counting {
        type Item = i32;

        fn pull_next(&mut self) -> RouteResult<Option<i32>> {
            *self.pulls.borrow_mut() += 1;
            Ok(self.items.next())
        }
    }

    fn windows(groups: Vec<Vec<i32>>) -> (Route<'static, i32>, crate::SectionEvents<'static, Vec<i32>>) {
        Route::from_iter(groups, ElementType::Path)
            .sections(ElementType::Scalar, |group: &Vec<i32>| Ok(group.clone()))
    }

    // ========== TEST: windows_sorted_independently ==========
    #[test]
    fn test_windows_sorted_independently() {
        // GIVEN windows [3, 1, 2] and [9, 7]
        let (route, events) = windows(vec![vec![3, 1, 2], vec![9, 7]]);

        // WHEN sorted per section
        let sorted = route.sort_section(&events).collect_all().unwrap();

        // THEN each window is sorted AND windows keep arrival order
        assert_eq!(sorted, vec![1, 2, 3, 7, 9]);
    }

    // ========== TEST: implicit_window_without_section_source ==========
    #[test]
    fn test_implicit_window_without_section_source() {
        let sorted = Route::from_iter(vec![5, 3, 4, 1], ElementType::Scalar)
            .sort()
            .collect_all()
            .unwrap();
        assert_eq!(sorted, vec![1, 3, 4, 5]);
    }

    // ========== TEST: last_window_closed_at_exhaustion ==========
    #[test]
    fn test_last_window_closed_at_exhaustion() {
        // GIVEN a first window closed by its end event AND a trailing
        // window that only ends because upstream does
        let events = crate::SectionEvents::<()>::new();
        let upstream = Route::from_iter(vec![3, 1, 2, 9, 7], ElementType::Scalar);
        let trigger = events.clone();
        let mut seen = 0;
        let route = upstream
            .map(ElementType::Scalar, move |n| {
                if seen == 0 {
                    trigger.fire_start(&(), 0);
                }
                if seen == 3 {
                    trigger.fire_end(&(), 0);
                    trigger.fire_start(&(), 1);
                }
                seen += 1;
                Ok(n)
            })
            .sort_section(&events);

        // THEN [3, 1, 2] then [9, 7] are each sorted
        assert_eq!(route.collect_all().unwrap(), vec![1, 2, 3, 7, 9]);
    }

    // ========== TEST: key_selector_sees_marker_and_index ==========
    #[test]
    fn test_key_selector_sees_marker_and_index() {
        // GIVEN windows whose key depends on the window index
        let (route, events) = windows(vec![vec![1, 3, 2], vec![1, 3, 2]]);

        // WHEN window 0 sorts ascending and window 1 descending
        let sorted = route
            .sort_section_by(&events, |n: &i32, marker: Option<&Vec<i32>>, index| {
                assert_eq!(marker.map(Vec::len), Some(3));
                if index == 0 {
                    *n
                } else {
                    -*n
                }
            })
            .collect_all()
            .unwrap();

        // THEN
        assert_eq!(sorted, vec![1, 2, 3, 3, 2, 1]);
    }

    // ========== TEST: sort_is_stable ==========
    #[test]
    fn test_sort_is_stable() {
        let pairs = vec![(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')];
        let sorted = Route::from_iter(pairs, ElementType::Scalar)
            .sort_by_key(|(k, _)| *k)
            .collect_all()
            .unwrap();
        assert_eq!(sorted, vec![(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);
    }

    // ========== TEST: values_sort_through_sort_key ==========
    #[test]
    fn test_values_sort_through_sort_key() {
        let values = vec![Value::from(2.5), Value::from(1i64), Value::from("z")];
        let sorted = Route::from_iter(values, ElementType::Scalar)
            .sort_by_key(|v| Reverse(SortKey(v.clone())))
            .collect_all()
            .unwrap();
        assert_eq!(
            sorted,
            vec![Value::from("z"), Value::from(2.5), Value::from(1i64)]
        );
    }

    // ========== TEST: exhausted_stage_stops_pulling ==========
    #[test]
    fn test_exhausted_stage_stops_pulling() {
        // GIVEN an upstream that counts pulls
        let pulls = Rc::new(RefCell::new(0));
        let upstream = Counting {
            items: vec![2, 1].into_iter(),
            pulls: Rc::clone(&pulls),
        };
        let mut stage = SortSection::<i32, ()>::natural(Box::new(upstream), None);

        // WHEN drained and pulled again
        assert_eq!(stage.pull_next().unwrap(), Some(1));
        assert_eq!(stage.pull_next().unwrap(), Some(2));
        assert_eq!(stage.pull_next().unwrap(), None);
        assert_eq!(stage.pull_next().unwrap(), None);

        // THEN upstream saw exactly one end-of-sequence
        assert_eq!(*pulls.borrow(), 3);
    }

    // ========== TEST: empty_upstream ==========
    #[test]
    fn test_empty_upstream() {
        let mut stage =
            SortSection::<i32, ()>::natural(Box::new(IterPipe::new(Vec::new().into_iter())), None);
        assert_eq!(stage.pull_next().unwrap(), None);
    }
}
