//! # Editing support
//!
//! ## Overview
//!
//! This module contains the types and code needed to track multiple selections within a buffer,
//! and to edit through all of them at once, independent of the specific editor hosting them.
pub mod buffer;
pub mod clipboard;
pub mod editor;
pub mod rope;
pub mod search;
pub mod selection;
pub mod span;
