//! # Tracked selections
//!
//! ## Overview
//!
//! This module contains the types for representing selections that stay valid while their
//! buffer is edited, and for collecting many of them into an ordered, non-overlapping
//! [SelectionSet].
use crate::editing::buffer::{SelectionHost, SpanTracker, TextBuffer};
use crate::editing::span::Span;
use crate::errors::SelectionResult;

mod set;
mod swap;

pub use self::set::{SelectionSet, SelectionSetIter, DEFAULT_CAPACITY, DEFAULT_GROW_BY};
pub use self::swap::SelectionSwap;

/// A range of text that follows edits to its buffer, along with which end of the range the
/// caret sits at.
#[derive(Clone, Debug)]
pub struct TrackedSelection<T> {
    tracker: T,
    anchor_at_start: bool,
}

impl<T> TrackedSelection<T>
where
    T: SpanTracker,
{
    /// Create a selection from an existing tracker.
    pub fn new(tracker: T, anchor_at_start: bool) -> Self {
        TrackedSelection { tracker, anchor_at_start }
    }

    /// Start tracking a span of a snapshot as a new selection.
    pub fn create<B>(
        buffer: &B,
        snapshot: &B::Snapshot,
        span: Span,
        anchor_at_start: bool,
    ) -> SelectionResult<Self>
    where
        B: TextBuffer<Tracker = T>,
    {
        let tracker = buffer.track(snapshot, span)?;

        Ok(TrackedSelection::new(tracker, anchor_at_start))
    }

    /// Start tracking a caret at an offset within a snapshot.
    pub fn create_caret<B>(
        buffer: &B,
        snapshot: &B::Snapshot,
        offset: usize,
        anchor_at_start: bool,
    ) -> SelectionResult<Self>
    where
        B: TextBuffer<Tracker = T>,
    {
        Self::create(buffer, snapshot, Span::point(offset), anchor_at_start)
    }

    /// Track each of the host's current selections.
    ///
    /// Spans that can't be tracked are left out.
    pub fn from_host<H>(host: &H) -> Vec<Self>
    where
        H: SelectionHost<Tracker = T>,
    {
        let snapshot = host.snapshot();
        let reversed = host.is_reversed();

        host.selected_spans()
            .into_iter()
            .filter_map(|span| match Self::create(host, &snapshot, span, reversed) {
                Ok(selection) => Some(selection),
                Err(e) => {
                    log::debug!("Dropping host selection {span}: {e}");
                    None
                },
            })
            .collect()
    }

    /// Resolve this selection against the latest contents of its buffer.
    pub fn span(&self) -> Span {
        self.tracker.span()
    }

    /// Whether the caret sits at the start of the range.
    pub fn anchor_at_start(&self) -> bool {
        self.anchor_at_start
    }

    /// The offset of the caret.
    pub fn caret(&self) -> usize {
        let span = self.span();

        if self.anchor_at_start {
            span.start()
        } else {
            span.end()
        }
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// Copy this selection's range, but place the caret on the same side as in `other`.
    pub fn with_direction(&self, other: &Self) -> Self {
        TrackedSelection { tracker: self.tracker.clone(), anchor_at_start: other.anchor_at_start }
    }

    /// Create a selection covering both this one and `[start, end]`, keeping this selection's
    /// caret side.
    pub fn expand_to(&self, start: usize, end: usize) -> Self {
        let span = self.span().expand_to(start, end);
        let tracker = self.tracker.retrack(span);

        TrackedSelection { tracker, anchor_at_start: self.anchor_at_start }
    }

    /// Make this the host's live selection.
    pub fn select<H>(&self, host: &mut H)
    where
        H: SelectionHost<Tracker = T>,
    {
        host.set_selection(self.span(), self.anchor_at_start);
    }
}
