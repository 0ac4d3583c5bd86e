//! # Common set of types used for multiple selections
//!
//! ## Overview
//!
//! Usually you will just want to import everything in this module into your application via:
//!
//! ```
//! use multicaret::prelude::*;
//! ```
pub use crate::commands::{CommandStatus, MultiCaretCommand};
pub use crate::config::{MouseSelectionAddKey, MultiCaretConfig};
pub use crate::editing::buffer::{
    EditTransaction,
    SelectionHost,
    Snapshot,
    SpanTracker,
    TextBuffer,
    Version,
};
pub use crate::editing::editor::{Modifiers, MultiCaret, SelectionMode};
pub use crate::editing::search::{FindOptions, FindQuery, SearchService};
pub use crate::editing::selection::{SelectionSet, SelectionSwap, TrackedSelection};
pub use crate::editing::span::Span;
pub use crate::errors::{EditError, EditResult, SelectionError, SelectionResult};

/// Represent movement along a 1-dimensional line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MoveDir1D {
    /// Move backwards, or to a previous point.
    Previous,

    /// Move forwards, or to a following point.
    Next,
}
