use core::iter::FusedIterator;

use crate::Record;
use crate::raw::{Handle, RawIndex};

/// An in-order iterator over the records of an [`OrderedIndex`](super::OrderedIndex).
///
/// Created by [`OrderedIndex::iter`](super::OrderedIndex::iter).
#[derive(Clone)]
pub struct Iter<'a> {
    raw: &'a RawIndex,
    next: Option<Handle>,
    remaining: usize,
}

impl<'a> Iter<'a> {
    pub(super) fn new(raw: &'a RawIndex) -> Self {
        Self {
            raw,
            next: raw.first(),
            remaining: raw.len(),
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<&'a Record> {
        let handle = self.next?;
        self.next = self.raw.successor(handle);
        self.remaining -= 1;
        Some(self.raw.node(handle).record())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}
