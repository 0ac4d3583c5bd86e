use crate::editing::buffer::SpanTracker;

use super::{SelectionSet, DEFAULT_CAPACITY, DEFAULT_GROW_BY};

/// A pair of [SelectionSet] values, one of which holds the current selections.
///
/// Commands that rebuild the selections read from the current set and write into the other one,
/// and then make the other one current. Both sets keep their storage between commands.
#[derive(Clone, Debug)]
pub struct SelectionSwap<T> {
    sets: [SelectionSet<T>; 2],
    active: usize,
}

impl<T> SelectionSwap<T>
where
    T: SpanTracker,
{
    /// Create a pair of empty sets using the default storage sizes.
    pub fn new() -> Self {
        SelectionSwap::with_capacity(DEFAULT_CAPACITY, DEFAULT_GROW_BY)
    }

    /// Create a pair of empty sets using the given storage sizes.
    pub fn with_capacity(initial: usize, grow_by: usize) -> Self {
        let sets = [
            SelectionSet::with_capacity(initial, grow_by),
            SelectionSet::with_capacity(initial, grow_by),
        ];

        SelectionSwap { sets, active: 0 }
    }

    /// The set holding the current selections.
    pub fn current(&self) -> &SelectionSet<T> {
        &self.sets[self.active]
    }

    /// Mutable access to the set holding the current selections.
    pub fn current_mut(&mut self) -> &mut SelectionSet<T> {
        &mut self.sets[self.active]
    }

    /// Make the other set current, and return the previous set and the new one.
    ///
    /// The newly current set is cleared before it's returned, so that it can be filled from the
    /// previous one.
    pub fn begin(&mut self) -> (&mut SelectionSet<T>, &mut SelectionSet<T>) {
        self.active = 1 - self.active;

        let (a, b) = self.sets.split_at_mut(1);
        let (source, target) = if self.active == 1 {
            (&mut a[0], &mut b[0])
        } else {
            (&mut b[0], &mut a[0])
        };

        target.clear();

        return (source, target);
    }

    /// Make the previous set current again, after a failed rebuild.
    pub fn abort(&mut self) {
        self.active = 1 - self.active;
    }
}

impl<T> Default for SelectionSwap<T>
where
    T: SpanTracker,
{
    fn default() -> Self {
        SelectionSwap::new()
    }
}
