//! # Host buffer interfaces
//!
//! ## Overview
//!
//! These traits describe what this crate needs from the editing surface that owns the text:
//!
//! - Immutable, versioned [snapshots](Snapshot) of the text
//! - [Trackers](SpanTracker) that keep a range valid while the text changes
//! - Atomic application of an [EditTransaction]
//! - Access to the surface's own live selection, through [SelectionHost]
//!
//! The [rope](crate::editing::rope) module implements all of them for an in-memory buffer.
use crate::editing::span::Span;
use crate::errors::{EditResult, SelectionResult};

mod edit;

pub use self::edit::{Change, EditTransaction};

/// Identifies one generation of a buffer's contents.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    derive_more::Display,
    derive_more::From,
    derive_more::Into,
)]
pub struct Version(u64);

impl Version {
    /// The version following this one.
    pub fn next(self) -> Version {
        Version(self.0 + 1)
    }
}

/// An immutable view of a buffer's contents at a given [Version].
pub trait Snapshot {
    /// The version of the buffer this snapshot was taken from.
    fn version(&self) -> Version;

    /// The number of characters in the snapshot.
    fn len(&self) -> usize;

    /// Get the text within a span.
    fn text(&self, span: Span) -> String;

    /// Get the character at an offset.
    fn char_at(&self, offset: usize) -> Option<char>;

    /// The number of lines in the snapshot.
    fn line_count(&self) -> usize;

    /// The line containing the given offset.
    fn line_of_offset(&self, offset: usize) -> usize;

    /// The span of a line, excluding its line break.
    fn line_extent(&self, line: usize) -> Option<Span>;
}

/// A handle to a span that stays valid across later edits to its buffer.
pub trait SpanTracker: Clone {
    /// Resolve the tracked span against the latest contents of its buffer.
    fn span(&self) -> Span;

    /// Track a new span in the same buffer, against its latest contents.
    ///
    /// The span is clamped to the bounds of the buffer.
    fn retrack(&self, span: Span) -> Self;
}

/// A buffer whose text can be snapshotted, tracked and edited.
pub trait TextBuffer {
    /// The type of snapshot this buffer produces.
    type Snapshot: Snapshot;

    /// The type of tracker this buffer produces.
    type Tracker: SpanTracker;

    /// Get the current contents of the buffer.
    fn snapshot(&self) -> Self::Snapshot;

    /// Start tracking a span of a snapshot.
    ///
    /// This fails with [SelectionError::TrackingFailure] if the span lies outside the snapshot.
    ///
    /// [SelectionError::TrackingFailure]: crate::errors::SelectionError::TrackingFailure
    fn track(&self, snapshot: &Self::Snapshot, span: Span) -> SelectionResult<Self::Tracker>;

    /// Apply all of the changes in an edit, or none of them.
    ///
    /// The version of the buffer after the edit is returned.
    fn apply(&mut self, edit: EditTransaction) -> EditResult<Version>;

    /// Begin staging an edit against the current contents of the buffer.
    fn edit(&self) -> EditTransaction {
        EditTransaction::new(self.snapshot().version())
    }
}

/// A buffer that is displayed with its own live selection.
pub trait SelectionHost: TextBuffer {
    /// The spans currently selected by the host.
    fn selected_spans(&self) -> Vec<Span>;

    /// Whether the host's caret sits at the start of its selected spans.
    fn is_reversed(&self) -> bool;

    /// Replace the host's selection, placing the caret at the start when `anchor_at_start` is
    /// set, and at the end otherwise.
    fn set_selection(&mut self, span: Span, anchor_at_start: bool);

    /// Replace the host's selection with a caret.
    fn set_caret(&mut self, offset: usize) {
        self.set_selection(Span::point(offset), false);
    }
}
