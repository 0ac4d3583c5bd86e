//! # In-memory text buffer
//!
//! ## Overview
//!
//! This module contains [RopeBuffer], an implementation of the [buffer](crate::editing::buffer)
//! traits that keeps its text in a [Rope]. It's suitable for driving a [MultiCaret] in tests, or
//! for embedding in applications that don't already have their own text storage.
//!
//! Trackers created by a [RopeBuffer] share a slot with the buffer, which gets updated each time
//! an edit is applied. Trackers that are dropped are forgotten by the buffer on the next edit.
//!
//! [MultiCaret]: crate::editing::editor::MultiCaret
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use ropey::Rope;

use crate::editing::buffer::{
    EditTransaction,
    SelectionHost,
    Snapshot,
    SpanTracker,
    TextBuffer,
    Version,
};
use crate::editing::span::{Adjustable, OffsetAdjustment, Span};
use crate::errors::{EditError, EditResult, SelectionError, SelectionResult};
use crate::util::is_line_break;

/// An immutable copy of a [RopeBuffer]'s contents.
#[derive(Clone, Debug)]
pub struct RopeSnapshot {
    rope: Rope,
    version: Version,
}

#[derive(Debug, Default)]
struct Registry {
    slots: Vec<Weak<Cell<Span>>>,
    len: usize,
}

/// Tracks a [Span] within a [RopeBuffer] as it gets edited.
#[derive(Clone, Debug)]
pub struct RopeTracker {
    slot: Rc<Cell<Span>>,
    registry: Weak<RefCell<Registry>>,
}

/// A text buffer backed by a [Rope], with a single live selection.
#[derive(Debug)]
pub struct RopeBuffer {
    rope: Rope,
    version: Version,

    /// The adjustments made by each edit, indexed by the version they were applied to.
    history: Vec<Vec<OffsetAdjustment>>,
    registry: Rc<RefCell<Registry>>,

    selection: Vec<Span>,
    reversed: bool,
}

impl RopeSnapshot {
    /// Get a reference to the underlying text.
    pub fn rope(&self) -> &Rope {
        &self.rope
    }
}

impl Snapshot for RopeSnapshot {
    fn version(&self) -> Version {
        self.version
    }

    fn len(&self) -> usize {
        self.rope.len_chars()
    }

    fn text(&self, span: Span) -> String {
        let span = span.clamp(self.len());

        self.rope.slice(span.start()..span.end()).to_string()
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        if offset < self.len() {
            Some(self.rope.char(offset))
        } else {
            None
        }
    }

    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line_of_offset(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.len()))
    }

    fn line_extent(&self, line: usize) -> Option<Span> {
        let count = self.rope.len_lines();

        if line >= count {
            return None;
        }

        let start = self.rope.line_to_char(line);
        let mut end = if line + 1 < count {
            self.rope.line_to_char(line + 1)
        } else {
            self.rope.len_chars()
        };

        // Leave off the line break, treating "\r\n" as one.
        if end > start && self.rope.char(end - 1) == '\n' {
            end -= 1;
        }

        if end > start && is_line_break(self.rope.char(end - 1)) {
            end -= 1;
        }

        return Some(Span::new(start, end));
    }
}

impl Registry {
    fn register(&mut self, span: Span) -> Rc<Cell<Span>> {
        if self.slots.len() == self.slots.capacity() {
            // Make room by dropping the slots of trackers that no longer exist.
            self.slots.retain(|slot| slot.strong_count() > 0);
        }

        let slot = Rc::new(Cell::new(span));

        self.slots.push(Rc::downgrade(&slot));

        return slot;
    }

    fn adjust(&mut self, adjs: &[OffsetAdjustment], len: usize) {
        self.len = len;
        self.slots.retain(|slot| {
            match slot.upgrade() {
                Some(slot) => {
                    let mut span = slot.get();
                    span.adjust(adjs);
                    slot.set(span);

                    true
                },
                None => false,
            }
        });
    }
}

impl SpanTracker for RopeTracker {
    fn span(&self) -> Span {
        self.slot.get()
    }

    fn retrack(&self, span: Span) -> Self {
        match self.registry.upgrade() {
            Some(registry) => {
                let mut registry = registry.borrow_mut();
                let span = span.clamp(registry.len);
                let slot = registry.register(span);

                RopeTracker { slot, registry: self.registry.clone() }
            },
            None => {
                // The buffer is gone, so there are no more edits to follow.
                let slot = Rc::new(Cell::new(span));

                RopeTracker { slot, registry: Weak::new() }
            },
        }
    }
}

impl RopeBuffer {
    /// Create a new buffer containing the given text.
    pub fn new(rope: Rope) -> Self {
        let registry = Registry { slots: vec![], len: rope.len_chars() };

        RopeBuffer {
            rope,
            version: Version::default(),
            history: vec![],
            registry: Rc::new(RefCell::new(registry)),
            selection: vec![Span::point(0)],
            reversed: false,
        }
    }

    /// The number of characters in the buffer.
    pub fn len(&self) -> usize {
        self.rope.len_chars()
    }

    /// The current version of the buffer.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Replace the live selection with several spans, such as a block selection.
    pub fn set_selections(&mut self, spans: Vec<Span>, reversed: bool) {
        let len = self.len();

        self.selection = spans.into_iter().map(|span| span.clamp(len)).collect();
        self.reversed = reversed;
    }

    /// Move a span tracked against an older version of the buffer forward to the current one.
    fn translate(&self, snapshot: &RopeSnapshot, mut span: Span) -> SelectionResult<Span> {
        let failure = || {
            let len = snapshot.len();

            SelectionError::TrackingFailure { start: span.start(), end: span.end(), len }
        };

        if span.end() > snapshot.len() || snapshot.version > self.version {
            return Err(failure());
        }

        let from = u64::from(snapshot.version) as usize;
        let to = u64::from(self.version) as usize;

        for adjs in self.history[from..to].iter() {
            span.adjust(adjs);
        }

        return Ok(span);
    }
}

impl TextBuffer for RopeBuffer {
    type Snapshot = RopeSnapshot;
    type Tracker = RopeTracker;

    fn snapshot(&self) -> RopeSnapshot {
        RopeSnapshot { rope: self.rope.clone(), version: self.version }
    }

    fn track(&self, snapshot: &RopeSnapshot, span: Span) -> SelectionResult<RopeTracker> {
        let span = self.translate(snapshot, span)?;
        let slot = self.registry.borrow_mut().register(span);

        Ok(RopeTracker { slot, registry: Rc::downgrade(&self.registry) })
    }

    fn apply(&mut self, edit: EditTransaction) -> EditResult<Version> {
        if edit.base() != self.version {
            return Err(EditError::Conflict { expected: edit.base(), actual: self.version });
        }

        let changes = edit.validate(self.len())?;

        if changes.is_empty() {
            return Ok(self.version);
        }

        // Apply from the end of the buffer backwards, so that the offsets of the remaining
        // changes stay valid.
        let mut adjs = Vec::with_capacity(changes.len());

        for change in changes.iter().rev() {
            let span = change.span;

            self.rope.remove(span.start()..span.end());
            self.rope.insert(span.start(), &change.text);

            adjs.push(change.adjustment());
        }

        self.registry.borrow_mut().adjust(&adjs, self.rope.len_chars());
        self.selection.adjust(&adjs);
        self.history.push(adjs);
        self.version = self.version.next();

        log::trace!("Applied {} changes, buffer is now at version {}", changes.len(), self.version);

        Ok(self.version)
    }
}

impl SelectionHost for RopeBuffer {
    fn selected_spans(&self) -> Vec<Span> {
        self.selection.clone()
    }

    fn is_reversed(&self) -> bool {
        self.reversed
    }

    fn set_selection(&mut self, span: Span, anchor_at_start: bool) {
        self.selection = vec![span.clamp(self.len())];
        self.reversed = anchor_at_start;
    }
}

impl Default for RopeBuffer {
    fn default() -> Self {
        RopeBuffer::new(Rope::new())
    }
}

impl From<&str> for RopeBuffer {
    fn from(s: &str) -> Self {
        RopeBuffer::new(Rope::from_str(s))
    }
}

impl From<String> for RopeBuffer {
    fn from(s: String) -> Self {
        RopeBuffer::from(s.as_str())
    }
}

impl fmt::Display for RopeBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(buffer: &RopeBuffer, span: Span) -> RopeTracker {
        buffer.track(&buffer.snapshot(), span).unwrap()
    }

    #[test]
    fn test_snapshot_text() {
        let buffer = RopeBuffer::from("hello\r\nwörld\n");
        let snapshot = buffer.snapshot();

        assert_eq!(snapshot.len(), 13);
        assert_eq!(snapshot.version(), Version::from(0));
        assert_eq!(snapshot.text(span!(7, 12)), "wörld");
        assert_eq!(snapshot.text(span!(10, 50)), "ld\n");
        assert_eq!(snapshot.char_at(8), Some('ö'));
        assert_eq!(snapshot.char_at(13), None);
    }

    #[test]
    fn test_snapshot_lines() {
        let buffer = RopeBuffer::from("hello\r\nworld\n\nfoo");
        let snapshot = buffer.snapshot();

        assert_eq!(snapshot.line_count(), 4);
        assert_eq!(snapshot.line_extent(0), Some(span!(0, 5)));
        assert_eq!(snapshot.line_extent(1), Some(span!(7, 12)));
        assert_eq!(snapshot.line_extent(2), Some(span!(13)));
        assert_eq!(snapshot.line_extent(3), Some(span!(14, 17)));
        assert_eq!(snapshot.line_extent(4), None);

        assert_eq!(snapshot.line_of_offset(0), 0);
        assert_eq!(snapshot.line_of_offset(5), 0);
        assert_eq!(snapshot.line_of_offset(7), 1);
        assert_eq!(snapshot.line_of_offset(13), 2);
        assert_eq!(snapshot.line_of_offset(100), 3);
    }

    #[test]
    fn test_snapshot_unicode_line_breaks() {
        let buffer = RopeBuffer::from("a\u{2028}b\u{0C}c\u{85}d\u{2029}e\u{0B}f\n");
        let snapshot = buffer.snapshot();

        assert_eq!(snapshot.line_count(), 7);
        assert_eq!(snapshot.line_extent(0), Some(span!(0, 1)));
        assert_eq!(snapshot.line_extent(1), Some(span!(2, 3)));
        assert_eq!(snapshot.line_extent(2), Some(span!(4, 5)));
        assert_eq!(snapshot.line_extent(3), Some(span!(6, 7)));
        assert_eq!(snapshot.line_extent(4), Some(span!(8, 9)));
        assert_eq!(snapshot.line_extent(5), Some(span!(10, 11)));
        assert_eq!(snapshot.line_extent(6), Some(span!(12)));
    }

    #[test]
    fn test_registry_drops_dead_slots() {
        let mut buffer = RopeBuffer::from("hello world\n");
        let live = track(&buffer, span!(6, 11));

        for _ in 0..1000 {
            let _ = track(&buffer, span!(0, 5));
        }

        assert!(buffer.registry.borrow().slots.len() < 16);

        let mut edit = buffer.edit();
        edit.insert(0, ">");
        buffer.apply(edit).unwrap();

        assert_eq!(live.span(), span!(7, 12));
    }

    #[test]
    fn test_snapshot_unchanged_by_edits() {
        let mut buffer = RopeBuffer::from("hello\n");
        let snapshot = buffer.snapshot();

        let mut edit = buffer.edit();
        edit.insert(0, "abc");
        buffer.apply(edit).unwrap();

        assert_eq!(snapshot.text(span!(0, 6)), "hello\n");
        assert_eq!(buffer.to_string(), "abchello\n");
        assert_eq!(buffer.snapshot().version(), Version::from(1));
    }

    #[test]
    fn test_track_out_of_bounds() {
        let buffer = RopeBuffer::from("hello\n");
        let snapshot = buffer.snapshot();

        assert!(buffer.track(&snapshot, span!(6)).is_ok());
        assert_eq!(
            buffer.track(&snapshot, span!(3, 7)).unwrap_err(),
            SelectionError::TrackingFailure { start: 3, end: 7, len: 6 }
        );
    }

    #[test]
    fn test_tracker_edge_inclusive() {
        let mut buffer = RopeBuffer::from("aaa bbb ccc\n");
        let bbb = track(&buffer, span!(4, 7));
        let caret = track(&buffer, span!(8));

        let mut edit = buffer.edit();
        edit.insert(4, "<").insert(7, ">").insert(8, "x");
        buffer.apply(edit).unwrap();

        assert_eq!(buffer.to_string(), "aaa <bbb> xccc\n");
        assert_eq!(bbb.span(), span!(4, 9));
        assert_eq!(caret.span(), span!(10, 11));
    }

    #[test]
    fn test_tracker_replacement() {
        let mut buffer = RopeBuffer::from("one two three\n");
        let two = track(&buffer, span!(4, 7));
        let inner = track(&buffer, span!(5, 6));
        let three = track(&buffer, span!(8, 13));

        let mut edit = buffer.edit();
        edit.replace(span!(4, 7), "2");
        buffer.apply(edit).unwrap();

        assert_eq!(buffer.to_string(), "one 2 three\n");
        assert_eq!(two.span(), span!(4, 5));
        assert_eq!(inner.span(), span!(4, 5));
        assert_eq!(three.span(), span!(6, 11));
    }

    #[test]
    fn test_track_old_snapshot() {
        let mut buffer = RopeBuffer::from("hello world\n");
        let old = buffer.snapshot();

        let mut edit = buffer.edit();
        edit.insert(0, "oh, ");
        buffer.apply(edit).unwrap();

        let mut edit = buffer.edit();
        edit.delete(span!(4, 6));
        buffer.apply(edit).unwrap();

        assert_eq!(buffer.to_string(), "oh, llo world\n");

        let world = buffer.track(&old, span!(6, 11)).unwrap();
        assert_eq!(world.span(), span!(8, 13));
        assert_eq!(buffer.snapshot().text(world.span()), "world");
    }

    #[test]
    fn test_retrack() {
        let mut buffer = RopeBuffer::from("hello world\n");
        let tracker = track(&buffer, span!(0, 5));

        let wider = tracker.retrack(span!(0, 50));
        assert_eq!(wider.span(), span!(0, 12));

        let mut edit = buffer.edit();
        edit.insert(6, "big ");
        buffer.apply(edit).unwrap();

        assert_eq!(tracker.span(), span!(0, 5));
        assert_eq!(wider.span(), span!(0, 16));
    }

    #[test]
    fn test_retrack_after_drop() {
        let buffer = RopeBuffer::from("hello world\n");
        let tracker = track(&buffer, span!(0, 5));
        drop(buffer);

        assert_eq!(tracker.retrack(span!(1, 2)).span(), span!(1, 2));
    }

    #[test]
    fn test_dropped_trackers_forgotten() {
        let mut buffer = RopeBuffer::from("hello world\n");
        let kept = track(&buffer, span!(0, 1));

        for i in 0..5 {
            let _ = track(&buffer, span!(i));
        }

        assert_eq!(buffer.registry.borrow().slots.len(), 6);

        let mut edit = buffer.edit();
        edit.insert(0, "a");
        buffer.apply(edit).unwrap();

        assert_eq!(buffer.registry.borrow().slots.len(), 1);
        assert_eq!(kept.span(), span!(0, 2));
    }

    #[test]
    fn test_apply_conflict() {
        let mut buffer = RopeBuffer::from("hello\n");
        let mut stale = buffer.edit();
        stale.delete(span!(0, 1));

        let mut edit = buffer.edit();
        edit.insert(0, "a");
        buffer.apply(edit).unwrap();

        let res = buffer.apply(stale);
        assert!(matches!(
            res,
            Err(EditError::Conflict { expected, actual })
                if expected == Version::from(0) && actual == Version::from(1)
        ));
        assert_eq!(buffer.to_string(), "ahello\n");
    }

    #[test]
    fn test_apply_all_or_nothing() {
        let mut buffer = RopeBuffer::from("hello\n");
        let tracker = track(&buffer, span!(1, 3));

        let mut edit = buffer.edit();
        edit.delete(span!(0, 1)).delete(span!(4, 9));

        assert!(matches!(buffer.apply(edit), Err(EditError::OutOfBounds { .. })));
        assert_eq!(buffer.to_string(), "hello\n");
        assert_eq!(buffer.version(), Version::from(0));
        assert_eq!(tracker.span(), span!(1, 3));
    }

    #[test]
    fn test_apply_empty() {
        let mut buffer = RopeBuffer::from("hello\n");
        let edit = buffer.edit();

        assert_eq!(buffer.apply(edit).unwrap(), Version::from(0));
    }

    #[test]
    fn test_apply_many() {
        let mut buffer = RopeBuffer::from("a b c d\n");

        let mut edit = buffer.edit();
        edit.replace(span!(0, 1), "1")
            .replace(span!(6, 7), "4444")
            .replace(span!(2, 3), "22")
            .delete(span!(4, 5));
        buffer.apply(edit).unwrap();

        assert_eq!(buffer.to_string(), "1 22  4444\n");
    }

    #[test]
    fn test_live_selection() {
        let mut buffer = RopeBuffer::from("hello world\n");
        assert_eq!(buffer.selected_spans(), vec![span!(0)]);
        assert!(!buffer.is_reversed());

        buffer.set_selection(span!(6, 11), true);
        assert_eq!(buffer.selected_spans(), vec![span!(6, 11)]);
        assert!(buffer.is_reversed());

        let mut edit = buffer.edit();
        edit.insert(0, "big ");
        buffer.apply(edit).unwrap();
        assert_eq!(buffer.selected_spans(), vec![span!(10, 15)]);

        buffer.set_caret(100);
        assert_eq!(buffer.selected_spans(), vec![span!(16)]);
        assert!(!buffer.is_reversed());

        buffer.set_selections(vec![span!(0, 1), span!(4, 5)], false);
        assert_eq!(buffer.selected_spans(), vec![span!(0, 1), span!(4, 5)]);
    }
}
