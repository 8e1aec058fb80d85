//! Paths: ordered sequences of elements produced by one traversal.
//!
//! A position may hold a hole (`None`) after a transformation such as
//! payload extraction. Paths are not mutated in place; every transformation
//! builds a new path.

use crate::Element;

/// One position of a path: an element or a hole.
pub type Slot = Option<Element>;

/// An ordered sequence of elements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    slots: Vec<Slot>,
}

impl Path {
    /// Create a path from its slots.
    pub fn new(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    /// Number of positions, holes included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Resolve a possibly negative index to a position.
    ///
    /// Negative indices count from the end (`-1` is the last position).
    pub fn resolve_index(&self, index: isize) -> Option<usize> {
        let len = self.slots.len() as isize;
        let resolved = if index < 0 { len + index } else { index };
        (0..len).contains(&resolved).then_some(resolved as usize)
    }

    /// The slot at a possibly negative index.
    pub fn get(&self, index: isize) -> Option<&Slot> {
        self.resolve_index(index).map(|i| &self.slots[i])
    }

    /// The first slot.
    pub fn first(&self) -> Option<&Slot> {
        self.slots.first()
    }

    /// The last slot.
    pub fn last(&self) -> Option<&Slot> {
        self.slots.last()
    }

    /// Iterate over all slots.
    pub fn iter(&self) -> std::slice::Iter<'_, Slot> {
        self.slots.iter()
    }

    /// Iterate over the elements, skipping holes.
    pub fn elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.slots.iter().flatten()
    }

    /// A copy of this path with every hole removed, order preserved.
    pub fn compact(&self) -> Path {
        Path::new(self.slots.iter().flatten().cloned().map(Some).collect())
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }
}

impl From<Vec<Element>> for Path {
    fn from(elements: Vec<Element>) -> Self {
        Path::new(elements.into_iter().map(Some).collect())
    }
}

impl From<Vec<Slot>> for Path {
    fn from(slots: Vec<Slot>) -> Self {
        Path::new(slots)
    }
}

impl FromIterator<Slot> for Path {
    fn from_iter<I: IntoIterator<Item = Slot>>(iter: I) -> Self {
        Path::new(iter.into_iter().collect())
    }
}

impl IntoIterator for Path {
    type Item = Slot;
    type IntoIter = std::vec::IntoIter<Slot>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.into_iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Slot;
    type IntoIter = std::slice::Iter<'a, Slot>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}
