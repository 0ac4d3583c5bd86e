//! # Error Types
//!
//! ## Overview
//!
//! This module contains the errors returned while building selection sets and while editing
//! through them.
use crate::editing::buffer::Version;
use crate::editing::clipboard::ClipboardError;

/// Errors returned while creating or manipulating selections.
#[derive(thiserror::Error, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum SelectionError {
    /// The host could not track the given range against a snapshot.
    #[error("Cannot track {start}..{end} in a snapshot of length {len}")]
    TrackingFailure {
        /// Start of the requested range.
        start: usize,

        /// End of the requested range.
        end: usize,

        /// Length of the snapshot the range was requested against.
        len: usize,
    },

    /// Attempted to remove a selection from an empty set.
    #[error("Selection set is empty")]
    Empty,

    /// Attempted to access a selection past the end of a set.
    #[error("Selection index {index} is out of range for a set of {len}")]
    OutOfBounds {
        /// The requested index.
        index: usize,

        /// The number of selections in the set.
        len: usize,
    },
}

/// Errors returned from editing operations.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum EditError {
    /// An edit was applied against a different buffer version than it was staged against.
    #[error("Edit expected buffer version {expected}, but the buffer is at {actual}")]
    Conflict {
        /// The version the edit was staged against.
        expected: Version,

        /// The version of the buffer when the edit was applied.
        actual: Version,
    },

    /// Two changes within the same edit overlap each other.
    #[error("Edit contains overlapping changes at {0}")]
    OverlappingEdits(usize),

    /// A change within an edit lies outside of the buffer.
    #[error("Edit range {start}..{end} is outside of a buffer of length {len}")]
    OutOfBounds {
        /// Start of the change.
        start: usize,

        /// End of the change.
        end: usize,

        /// Length of the buffer.
        len: usize,
    },

    /// Failure while creating or manipulating selections.
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    /// Failure due to a bad search expression.
    #[error("Invalid regular expression: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// Failure while reading or writing the clipboard.
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    /// Generic failure.
    #[error("Error: {0}")]
    Failure(String),
}

/// Common result type for selection operations.
pub type SelectionResult<V> = Result<V, SelectionError>;

/// Common result type for editing operations.
pub type EditResult<V> = Result<V, EditError>;
