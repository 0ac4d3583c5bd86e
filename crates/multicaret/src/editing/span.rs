//! # Text ranges
//!
//! ## Overview
//!
//! This module contains [Span], a range of character offsets within one snapshot of a buffer,
//! along with the rules for deciding whether two selections come before, after, or overlap each
//! other, and the logic for moving spans after a buffer has been modified.
//!
//! ## Overlap rules
//!
//! Two spans that both contain text may touch without overlapping:
//!
//! ```
//! use multicaret::editing::span::Span;
//!
//! let a = Span::new(0, 5);
//! let b = Span::new(5, 10);
//!
//! assert!(a.is_before(&b));
//! assert!(b.is_after(&a));
//! assert!(!a.overlaps(&b));
//! ```
//!
//! But a zero-length span sitting on the boundary of another span overlaps it:
//!
//! ```
//! use multicaret::editing::span::Span;
//!
//! let a = Span::new(0, 5);
//! let b = Span::new(5, 5);
//!
//! assert!(!a.is_before(&b));
//! assert!(a.overlaps(&b));
//! ```
use std::fmt;

use crate::util::sort2;

/// A range of character offsets within a single snapshot of a buffer.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Span {
    start: usize,
    end: usize,
}

/// Describes the replacement of a region of text, so that positions can be moved to account
/// for it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OffsetAdjustment {
    /// The start of the replaced region, before the change.
    pub start: usize,

    /// The end of the replaced region, before the change.
    pub end: usize,

    /// The number of characters inserted in place of the region.
    pub inserted: usize,
}

/// Trait for adjusting spans and objects that contain spans after a buffer modification.
pub trait Adjustable {
    /// Apply a sequence of [OffsetAdjustment] values, in order.
    fn adjust(&mut self, adjs: &[OffsetAdjustment]);
}

impl Span {
    /// Create a new span. The two offsets may be given in either order.
    pub fn new(a: usize, b: usize) -> Self {
        let (start, end) = sort2(a, b);

        Span { start, end }
    }

    /// Create a zero-length span at the given offset.
    pub fn point(offset: usize) -> Self {
        Span { start: offset, end: offset }
    }

    /// The first offset in this span.
    pub fn start(&self) -> usize {
        self.start
    }

    /// The offset just past the end of this span.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The number of characters covered by this span.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether this is a caret-only span.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether this span lies entirely before `other`.
    ///
    /// If either span is zero-length, then sharing a boundary counts as overlapping. Otherwise,
    /// touching endpoints are only adjacent.
    pub fn is_before(&self, other: &Span) -> bool {
        if self.is_empty() || other.is_empty() {
            self.end < other.start
        } else {
            self.end <= other.start
        }
    }

    /// Whether this span lies entirely after `other`.
    ///
    /// This follows the same boundary rules as [Span::is_before].
    pub fn is_after(&self, other: &Span) -> bool {
        if self.is_empty() || other.is_empty() {
            self.start > other.end
        } else {
            self.start >= other.end
        }
    }

    /// Whether these spans need to be merged when both are selected.
    pub fn overlaps(&self, other: &Span) -> bool {
        !self.is_before(other) && !self.is_after(other)
    }

    /// Whether this span covers all of `other`.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    /// The smallest span covering both this span and `[start, end]`.
    pub fn expand_to(&self, start: usize, end: usize) -> Span {
        Span { start: self.start.min(start), end: self.end.max(end) }
    }

    /// The region shared by two spans, if they overlap or touch.
    pub fn intersection(&self, other: &Span) -> Option<Span> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);

        if start <= end {
            Some(Span { start, end })
        } else {
            None
        }
    }

    /// Limit this span to a buffer of the given length.
    pub fn clamp(&self, len: usize) -> Span {
        Span { start: self.start.min(len), end: self.end.min(len) }
    }

    fn adjust1(&mut self, adj: &OffsetAdjustment) {
        let removed = adj.end - adj.start;
        let shift = |off: usize| off + adj.inserted - removed;
        let insertion = removed == 0;

        // The start stays behind text inserted at it, and is pulled back to the start of any
        // region that swallows it.
        if self.start > adj.start {
            if self.start >= adj.end {
                self.start = shift(self.start);
            } else {
                self.start = adj.start;
            }
        }

        // The end takes in text inserted at it, and is pushed forward to the end of any
        // replacement that swallows it.
        if self.end > adj.start || (insertion && self.end == adj.start) {
            if self.end >= adj.end {
                self.end = shift(self.end);
            } else {
                self.end = adj.start + adj.inserted;
            }
        }
    }
}

impl OffsetAdjustment {
    /// Describe replacing `span` with `inserted` characters.
    pub fn new(span: Span, inserted: usize) -> Self {
        OffsetAdjustment { start: span.start, end: span.end, inserted }
    }
}

impl Adjustable for Span {
    fn adjust(&mut self, adjs: &[OffsetAdjustment]) {
        for adj in adjs {
            self.adjust1(adj);
        }
    }
}

impl<T> Adjustable for Vec<T>
where
    T: Adjustable,
{
    fn adjust(&mut self, adjs: &[OffsetAdjustment]) {
        for item in self.iter_mut() {
            item.adjust(adjs);
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}
