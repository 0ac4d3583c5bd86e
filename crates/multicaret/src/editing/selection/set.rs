use std::ops::Index;

use crate::editing::buffer::SpanTracker;
use crate::editing::span::Span;
use crate::errors::{SelectionError, SelectionResult};
use crate::prelude::MoveDir1D;

use super::TrackedSelection;

/// Default number of selections a new [SelectionSet] has room for.
pub const DEFAULT_CAPACITY: usize = 10;

/// Default number of slots added to a [SelectionSet] when it runs out of room.
pub const DEFAULT_GROW_BY: usize = 10;

/// Where a newly inserted selection belongs within a [SelectionSet].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Placement {
    /// The selection overlaps nothing, and goes at this index.
    At(usize),

    /// The selection overlaps the entries from `first` to `last`, inclusive.
    Run { first: usize, last: usize },
}

/// Iterate over the selections within a [SelectionSet], in ascending order.
pub struct SelectionSetIter<'a, T> {
    items: std::slice::Iter<'a, TrackedSelection<T>>,
}

impl<'a, T> Iterator for SelectionSetIter<'a, T> {
    type Item = &'a TrackedSelection<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for SelectionSetIter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.items.next_back()
    }
}

impl<'a, T> ExactSizeIterator for SelectionSetIter<'a, T> {}

/// An ordered collection of selections, where no two selections overlap.
///
/// Selections are kept sorted by position. Inserting a selection that overlaps existing entries
/// merges them into a single entry, following the boundary rules of [Span::is_before] and
/// [Span::is_after]. Each insertion method reports whether the selected text changed, so that
/// callers can decide whether anything needs to be redrawn.
///
/// There are three ways to insert:
///
/// - [SelectionSet::insert] performs a binary search, and is suitable for selections arriving in
///   any order.
/// - [SelectionSet::insert_expect_end] scans backwards from the last entry, and is fastest when
///   rebuilding a set from front to back.
/// - [SelectionSet::insert_expect_start] scans forwards from the first entry, and is fastest when
///   adding selections in front of the existing ones.
#[derive(Clone, Debug)]
pub struct SelectionSet<T> {
    items: Vec<TrackedSelection<T>>,
    grow_by: usize,
}

impl<T> SelectionSet<T>
where
    T: SpanTracker,
{
    /// Create a new, empty set using the default storage sizes.
    pub fn new() -> Self {
        SelectionSet::with_capacity(DEFAULT_CAPACITY, DEFAULT_GROW_BY)
    }

    /// Create a new, empty set with room for `initial` selections, which grows by `grow_by`
    /// slots each time it fills up.
    pub fn with_capacity(initial: usize, grow_by: usize) -> Self {
        let grow_by = grow_by.max(1);
        let items = Vec::with_capacity(initial + grow_by);

        SelectionSet { items, grow_by }
    }

    /// The number of selections in this set.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this set contains no selections.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The number of selections this set can hold before it needs to grow.
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// The earliest selection in the set.
    pub fn first(&self) -> Option<&TrackedSelection<T>> {
        self.items.first()
    }

    /// The latest selection in the set.
    pub fn last(&self) -> Option<&TrackedSelection<T>> {
        self.items.last()
    }

    /// Get the selection at an index, if there is one.
    pub fn get(&self, index: usize) -> Option<&TrackedSelection<T>> {
        self.items.get(index)
    }

    /// Get the selection at an index, or fail with [SelectionError::OutOfBounds].
    pub fn try_get(&self, index: usize) -> SelectionResult<&TrackedSelection<T>> {
        let len = self.items.len();

        self.items.get(index).ok_or(SelectionError::OutOfBounds { index, len })
    }

    /// Iterate over the selections in ascending order.
    pub fn iter(&self) -> SelectionSetIter<'_, T> {
        SelectionSetIter { items: self.items.iter() }
    }

    /// Resolve each selection in the set against the latest contents of its buffer.
    pub fn spans(&self) -> Vec<Span> {
        self.items.iter().map(TrackedSelection::span).collect()
    }

    /// Remove all selections, keeping the allocated storage for reuse.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Remove and return the last selection, so that it can become the host's live selection.
    pub fn remove_last(&mut self) -> SelectionResult<TrackedSelection<T>> {
        self.items.pop().ok_or(SelectionError::Empty)
    }

    /// Insert a selection arriving in any order.
    pub fn insert(&mut self, inserted: TrackedSelection<T>) -> bool {
        let span = inserted.span();
        let placement = self.locate(&span);

        self.place(inserted, span, placement)
    }

    /// Insert a selection that most likely belongs at the end of the set.
    pub fn insert_expect_end(&mut self, inserted: TrackedSelection<T>) -> bool {
        let span = inserted.span();
        let placement = self.scan(&span, MoveDir1D::Previous, self.items.len());

        self.place(inserted, span, placement)
    }

    /// Insert a selection that most likely belongs at the start of the set.
    pub fn insert_expect_start(&mut self, inserted: TrackedSelection<T>) -> bool {
        let span = inserted.span();
        let placement = self.scan(&span, MoveDir1D::Next, 0);

        self.place(inserted, span, placement)
    }

    /// Insert several selections arriving in any order, returning whether any of them changed
    /// the set.
    pub fn insert_all<I>(&mut self, selections: I) -> bool
    where
        I: IntoIterator<Item = TrackedSelection<T>>,
    {
        selections.into_iter().fold(false, |changed, sel| self.insert(sel) || changed)
    }

    /// Insert several selections that most likely belong at the end of the set, returning
    /// whether any of them changed the set.
    pub fn insert_expect_end_all<I>(&mut self, selections: I) -> bool
    where
        I: IntoIterator<Item = TrackedSelection<T>>,
    {
        selections
            .into_iter()
            .fold(false, |changed, sel| self.insert_expect_end(sel) || changed)
    }

    /// Find where a selection belongs by searching the whole set.
    fn locate(&self, inserted: &Span) -> Placement {
        let count = self.items.len();

        if count == 0 {
            return Placement::At(0);
        }

        let first = self.items[0].span();

        if inserted.is_before(&first) {
            return Placement::At(0);
        }

        if count == 1 {
            if inserted.is_after(&first) {
                return Placement::At(1);
            } else {
                return Placement::Run { first: 0, last: 0 };
            }
        }

        if inserted.is_after(&self.items[count - 1].span()) {
            return Placement::At(count);
        }

        // The first entry that the inserted selection doesn't come after either overlaps it,
        // or is the entry it needs to be placed in front of.
        let start = self.items.partition_point(|sel| inserted.is_after(&sel.span()));

        return self.scan(inserted, MoveDir1D::Next, start);
    }

    /// Walk the set from an index in the given direction, collecting the run of entries that
    /// overlap the inserted selection.
    ///
    /// When scanning forward, `from` is the first index visited. When scanning backward, it is
    /// one past the first index visited. The scan stops at the first entry that lies entirely
    /// beyond the inserted selection in the direction of travel.
    fn scan(&self, inserted: &Span, dir: MoveDir1D, from: usize) -> Placement {
        let mut run: Option<(usize, usize)> = None;
        let mut idx = from;

        match dir {
            MoveDir1D::Next => {
                while idx < self.items.len() {
                    let span = self.items[idx].span();

                    if span.is_after(inserted) {
                        break;
                    }

                    if !span.is_before(inserted) {
                        run = Some(run.map_or((idx, idx), |(first, _)| (first, idx)));
                    }

                    idx += 1;
                }
            },
            MoveDir1D::Previous => {
                while idx > 0 {
                    let span = self.items[idx - 1].span();

                    if span.is_before(inserted) {
                        break;
                    }

                    if !span.is_after(inserted) {
                        run = Some(run.map_or((idx - 1, idx - 1), |(_, last)| (idx - 1, last)));
                    }

                    idx -= 1;
                }
            },
        }

        match run {
            Some((first, last)) => Placement::Run { first, last },
            None => Placement::At(idx),
        }
    }

    fn place(&mut self, inserted: TrackedSelection<T>, span: Span, placement: Placement) -> bool {
        match placement {
            Placement::At(idx) => {
                self.insert_at(idx, inserted);

                return true;
            },
            Placement::Run { first, last } if first == last => {
                return self.merge_single(inserted, span, first);
            },
            Placement::Run { first, last } => {
                return self.merge_range(inserted, span, first, last);
            },
        }
    }

    fn insert_at(&mut self, idx: usize, selection: TrackedSelection<T>) {
        if self.items.len() == self.items.capacity() {
            // Grow in fixed steps, since sets rarely hold more than a few dozen selections.
            self.items.reserve_exact(self.grow_by);
        }

        self.items.insert(idx, selection);
    }

    /// Merge a selection with the one existing entry it overlaps.
    fn merge_single(&mut self, inserted: TrackedSelection<T>, span: Span, idx: usize) -> bool {
        let existing = self.items[idx].span();

        if span.contains(&existing) {
            // The new selection covers the existing one, so it replaces it. The selected text
            // only changes if the ranges differ.
            self.items[idx] = inserted;

            return span != existing;
        }

        if existing.contains(&span) {
            // The existing selection already covers the new one, so only take on its caret side.
            self.items[idx] = self.items[idx].with_direction(&inserted);

            return false;
        }

        // Neither covers the other, so select everything in both.
        self.items[idx] = inserted.expand_to(existing.start(), existing.end());

        return true;
    }

    /// Merge a selection with the two or more existing entries it overlaps.
    fn merge_range(
        &mut self,
        inserted: TrackedSelection<T>,
        span: Span,
        first: usize,
        last: usize,
    ) -> bool {
        let start = self.items[first].span().start();
        let end = self.items[last].span().end();

        self.items[first] = if span.start() <= start && span.end() >= end {
            inserted
        } else {
            inserted.expand_to(start, end)
        };

        // Close the gap left by the absorbed entries.
        self.items.drain(first + 1..=last);

        return true;
    }
}

impl<T> Default for SelectionSet<T>
where
    T: SpanTracker,
{
    fn default() -> Self {
        SelectionSet::new()
    }
}

impl<T> Index<usize> for SelectionSet<T> {
    type Output = TrackedSelection<T>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a SelectionSet<T> {
    type Item = &'a TrackedSelection<T>;
    type IntoIter = SelectionSetIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        SelectionSetIter { items: self.items.iter() }
    }
}
