//! # multicaret
//!
//! ## Overview
//!
//! This crate allows an editor to maintain many simultaneous selections and carets, and to apply
//! edits to all of them as a single logical operation.
//!
//! The [editing::selection] module contains the sorted, non-overlapping [SelectionSet] and the
//! rules for merging overlapping selections into it. The [editing::buffer] module describes what
//! this crate needs from a host editing surface, and [editing::rope] provides an in-memory host
//! built on top of [ropey]. The [MultiCaret] controller in [editing::editor] ties these together
//! to implement the multi-selection commands in [commands].
//!
//! ## Example
//!
//! ```
//! use multicaret::editing::rope::RopeBuffer;
//! use multicaret::editing::search::RegexSearch;
//! use multicaret::prelude::*;
//!
//! let mut buffer = RopeBuffer::from("foo bar foo baz foo\n");
//! let mut editor = MultiCaret::default();
//!
//! // Select the first "foo", and then add every other occurrence.
//! buffer.set_selection(Span::new(0, 3), false);
//! editor.exec(&mut buffer, &RegexSearch, &MultiCaretCommand::SelectAllInDocument).unwrap();
//!
//! // Replace all of them at once.
//! editor.exec(&mut buffer, &RegexSearch, &MultiCaretCommand::TypeText("qux".into())).unwrap();
//!
//! assert_eq!(buffer.to_string(), "qux bar qux baz qux\n");
//! assert_eq!(editor.selections().len(), 2);
//! ```
//!
//! [SelectionSet]: crate::editing::selection::SelectionSet
//! [MultiCaret]: crate::editing::editor::MultiCaret

// Require docs for public APIs, and disable the more annoying clippy lints.
#![deny(missing_docs)]
#![allow(clippy::bool_to_int_with_if)]
#![allow(clippy::field_reassign_with_default)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::match_like_matches_macro)]
#![allow(clippy::needless_return)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

#[macro_use]
mod util;

pub mod commands;
pub mod config;
pub mod editing;
pub mod errors;
pub mod prelude;
