//! # Multi-caret controller
//!
//! ## Overview
//!
//! [MultiCaret] sits between a host's input handling and its text buffer. The host keeps
//! managing one live selection of its own, while the controller holds every other selection in a
//! [SelectionSet]. When a command arrives, the controller:
//!
//! - Swaps to its spare set, and adds the host's live selection to the previous one
//! - Applies the command to each selection in the previous set, building the new set from the
//!   results
//! - Removes the last selection from the new set, and hands it back to the host as its live
//!   selection
//!
//! When the controller holds no selections it's [idle](SelectionMode::Idle), and most commands
//! are left for the host to handle as it normally would.
//!
//! ## Example
//!
//! ```
//! use multicaret::editing::rope::RopeBuffer;
//! use multicaret::editing::search::RegexSearch;
//! use multicaret::prelude::*;
//!
//! let mut buffer = RopeBuffer::from("a\nb\nc\n");
//! let mut editor = MultiCaret::default();
//!
//! // Select everything, and then put a selection on each line.
//! buffer.set_selection(Span::new(0, 6), false);
//! let cmd = MultiCaretCommand::SplitSelectionIntoLines;
//! assert_eq!(editor.exec(&mut buffer, &RegexSearch, &cmd).unwrap(), CommandStatus::Handled);
//! assert_eq!(editor.mode(), SelectionMode::Active);
//!
//! let cmd = MultiCaretCommand::TypeText("-".into());
//! editor.exec(&mut buffer, &RegexSearch, &cmd).unwrap();
//! assert_eq!(buffer.to_string(), "-\n-\n-\n");
//! ```
use std::collections::HashSet;

use bitflags::bitflags;

use crate::commands::{CommandStatus, MultiCaretCommand};
use crate::config::MultiCaretConfig;
use crate::editing::buffer::{SelectionHost, Snapshot, SpanTracker, TextBuffer, Version};
use crate::editing::clipboard::ClipboardStore;
use crate::editing::search::{FindQuery, SearchService};
use crate::editing::selection::{SelectionSet, SelectionSwap, TrackedSelection};
use crate::editing::span::Span;
use crate::errors::{EditResult, SelectionResult};
use crate::prelude::MoveDir1D;
use crate::util::is_eol;

bitflags! {
    /// Modifier keys held while the pointer is pressed.
    #[derive(Debug, Clone, Copy, Eq, PartialEq)]
    pub struct Modifiers: u32 {
        /// No modifiers held.
        const NONE = 0b00000000;

        /// The Alt key.
        const ALT = 0b00000001;

        /// The Control key.
        const CTRL = 0b00000010;

        /// The Shift key.
        const SHIFT = 0b00000100;
    }
}

/// Whether a [MultiCaret] is currently managing extra selections.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SelectionMode {
    /// Only the host's own selection exists.
    #[default]
    Idle,

    /// There are selections besides the host's own.
    Active,
}

/// Which occurrences a select-in-document command adds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum SearchTarget {
    All,
    Next,
    Previous,
}

/// The state available to a command while it rebuilds the selections.
struct Batch<'a, T> {
    source: &'a mut SelectionSet<T>,
    target: &'a mut SelectionSet<T>,
    clipboard: &'a mut ClipboardStore,
    expected: &'a mut Option<Version>,
}

/// Applies commands across many selections at once.
#[derive(Debug)]
pub struct MultiCaret<T> {
    swap: SelectionSwap<T>,
    config: MultiCaretConfig,
    clipboard: ClipboardStore,

    /// The version that the current command is expected to edit.
    expected_edit_version: Option<Version>,

    mode: SelectionMode,
    dragging: bool,
}

fn create_or_log<H, T>(host: &H, snapshot: &H::Snapshot, span: Span) -> Option<TrackedSelection<T>>
where
    H: TextBuffer<Tracker = T>,
    T: SpanTracker,
{
    match TrackedSelection::create(host, snapshot, span, false) {
        Ok(selection) => Some(selection),
        Err(e) => {
            log::debug!("Dropping candidate selection {span}: {e}");
            None
        },
    }
}

/// The text of each non-empty span, each followed by a line break.
fn copy_text<S: Snapshot>(snapshot: &S, spans: impl IntoIterator<Item = Span>) -> String {
    let mut text = String::new();

    for span in spans.into_iter().filter(|span| !span.is_empty()) {
        text.push_str(&snapshot.text(span));
        text.push('\n');
    }

    return text;
}

/// The characters removed when deleting at a caret, treating "\r\n" as one character.
fn caret_deletion<S: Snapshot>(snapshot: &S, offset: usize, dir: MoveDir1D) -> Option<Span> {
    match dir {
        MoveDir1D::Next => {
            if offset >= snapshot.len() {
                return None;
            }

            let crlf = snapshot.char_at(offset) == Some('\r') &&
                snapshot.char_at(offset + 1) == Some('\n');
            let end = if crlf { offset + 2 } else { offset + 1 };

            Some(Span::new(offset, end))
        },
        MoveDir1D::Previous => {
            if offset == 0 {
                return None;
            }

            let crlf = offset >= 2 &&
                snapshot.char_at(offset - 1) == Some('\n') &&
                snapshot.char_at(offset - 2) == Some('\r');
            let start = if crlf { offset - 2 } else { offset - 1 };

            Some(Span::new(start, offset))
        },
    }
}

/// Sort deletions, and combine any that overlap.
fn coalesce(mut spans: Vec<Span>) -> Vec<Span> {
    spans.sort_by_key(|span| (span.start(), span.end()));

    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());

    for span in spans {
        match merged.last_mut() {
            Some(prev) if span.start() < prev.end() => {
                *prev = prev.expand_to(span.start(), span.end());
            },
            _ => merged.push(span),
        }
    }

    return merged;
}

impl<'a, T> Batch<'a, T>
where
    T: SpanTracker,
{
    /// Re-insert the source selections, so that any that now overlap get merged.
    fn reinsert(&mut self) {
        self.target.insert_expect_end_all(self.source.iter().cloned());
    }

    fn type_text<H>(&mut self, host: &mut H, text: &str) -> EditResult<()>
    where
        H: SelectionHost<Tracker = T>,
    {
        let mut edit = host.edit();

        for sel in self.source.iter() {
            edit.replace(sel.span(), text);
        }

        host.apply(edit)?;

        // Each selection now covers the typed text, so the carets go at their ends.
        let snapshot = host.snapshot();

        for sel in self.source.iter() {
            let end = sel.span().end();

            match TrackedSelection::create_caret(&*host, &snapshot, end, false) {
                Ok(caret) => {
                    self.target.insert_expect_end(caret);
                },
                Err(e) => {
                    log::debug!("Dropping caret at {end}: {e}");
                },
            }
        }

        Ok(())
    }

    fn delete<H>(&mut self, host: &mut H, dir: MoveDir1D) -> EditResult<()>
    where
        H: SelectionHost<Tracker = T>,
    {
        let snapshot = host.snapshot();
        let deletions = self
            .source
            .iter()
            .filter_map(|sel| {
                let span = sel.span();

                if span.is_empty() {
                    caret_deletion(&snapshot, span.start(), dir)
                } else {
                    Some(span)
                }
            })
            .collect();

        let mut edit = host.edit();

        for span in coalesce(deletions) {
            edit.delete(span);
        }

        host.apply(edit)?;
        self.reinsert();

        Ok(())
    }

    fn cut<H>(&mut self, host: &mut H) -> EditResult<()>
    where
        H: SelectionHost<Tracker = T>,
    {
        let snapshot = host.snapshot();
        let spans = self.source.spans();
        let mut edit = host.edit();

        for span in spans.iter().filter(|span| !span.is_empty()) {
            edit.delete(*span);
        }

        self.clipboard.set(copy_text(&snapshot, spans))?;
        host.apply(edit)?;
        self.reinsert();

        Ok(())
    }

    fn paste<H>(&mut self, host: &mut H, text: &str) -> EditResult<()>
    where
        H: SelectionHost<Tracker = T>,
    {
        let parts = text.split(is_eol).filter(|part| !part.is_empty()).collect::<Vec<_>>();
        let whole = parts.len() != self.source.len();
        let mut edit = host.edit();

        if whole {
            for sel in self.source.iter() {
                edit.replace(sel.span(), text);
            }
        } else {
            for (sel, part) in self.source.iter().zip(parts) {
                edit.replace(sel.span(), part);
            }
        }

        host.apply(edit)?;
        self.reinsert();

        Ok(())
    }

    fn split_into_lines<H>(&mut self, host: &H)
    where
        H: SelectionHost<Tracker = T>,
    {
        let snapshot = host.snapshot();

        for sel in self.source.iter() {
            let span = sel.span();
            let first = snapshot.line_of_offset(span.start());
            let last = snapshot.line_of_offset(span.end());

            // A zero-length piece is only kept if something follows it, or if it's all there is.
            let mut pending = None;
            let mut inserted = false;

            for line in first..=last {
                let piece = match snapshot.line_extent(line) {
                    Some(extent) => extent.intersection(&span),
                    None => break,
                };

                let piece = match piece {
                    Some(piece) => piece,
                    None => continue,
                };

                if let Some(prev) = pending.take() {
                    self.target.insert_expect_end(prev);
                    inserted = true;
                }

                let sel = match create_or_log(host, &snapshot, piece) {
                    Some(sel) => sel,
                    None => continue,
                };

                if piece.is_empty() {
                    pending = Some(sel);
                } else {
                    self.target.insert_expect_end(sel);
                    inserted = true;
                }
            }

            if let (false, Some(prev)) = (inserted, pending) {
                self.target.insert_expect_end(prev);
            }
        }
    }

    fn select_from_search<H, S>(
        &mut self,
        host: &H,
        search: &S,
        target: SearchTarget,
        query: FindQuery,
    ) -> EditResult<()>
    where
        H: SelectionHost<Tracker = T>,
        S: SearchService<H::Snapshot> + ?Sized,
    {
        self.reinsert();

        let (first, last) = match (self.source.first(), self.source.last()) {
            (Some(first), Some(last)) => (first.span(), last.span()),
            _ => return Ok(()),
        };

        // Every direction looks for the latest selection's text.
        if last.is_empty() {
            return Ok(());
        }

        let snapshot = host.snapshot();
        let query = FindQuery { text: snapshot.text(last), ..query };

        match target {
            SearchTarget::All => {
                for found in search.find_all(&snapshot, &query)? {
                    if let Some(sel) = create_or_log(host, &snapshot, found) {
                        self.target.insert_expect_end(sel);
                    }
                }

                Ok(())
            },
            SearchTarget::Next => {
                let query = query.reversed(false);

                self.search_one(host, search, &snapshot, &query, last.end(), MoveDir1D::Next)
            },
            SearchTarget::Previous => {
                let query = query.reversed(true);

                self.search_one(host, search, &snapshot, &query, first.start(), MoveDir1D::Previous)
            },
        }
    }

    /// Add the nearest occurrence that isn't already selected, searching in the given direction
    /// and stopping once the search comes back around.
    fn search_one<H, S>(
        &mut self,
        host: &H,
        search: &S,
        snapshot: &H::Snapshot,
        query: &FindQuery,
        start: usize,
        dir: MoveDir1D,
    ) -> EditResult<()>
    where
        H: SelectionHost<Tracker = T>,
        S: SearchService<H::Snapshot> + ?Sized,
    {
        let mut seen = HashSet::from([start]);
        let mut from = start;

        loop {
            let found = match search.find_next(snapshot, from, true, query)? {
                Some(found) => found,
                None => return Ok(()),
            };

            from = match dir {
                MoveDir1D::Next => found.end(),
                MoveDir1D::Previous => found.start(),
            };

            if !seen.insert(from) {
                return Ok(());
            }

            let sel = match create_or_log(host, snapshot, found) {
                Some(sel) => sel,
                None => return Ok(()),
            };

            let changed = match dir {
                MoveDir1D::Next => self.target.insert_expect_end(sel),
                MoveDir1D::Previous => self.target.insert_expect_start(sel),
            };

            if changed {
                return Ok(());
            }
        }
    }
}

impl<T> MultiCaret<T>
where
    T: SpanTracker,
{
    /// Create a new controller that keeps clipboard text in memory.
    pub fn new(config: MultiCaretConfig) -> Self {
        MultiCaret::with_clipboard(config, ClipboardStore::new())
    }

    /// Create a new controller that uses the given clipboard.
    pub fn with_clipboard(config: MultiCaretConfig, clipboard: ClipboardStore) -> Self {
        let swap = SelectionSwap::with_capacity(config.initial_capacity, config.grow_by);

        MultiCaret {
            swap,
            config,
            clipboard,
            expected_edit_version: None,
            mode: SelectionMode::Idle,
            dragging: false,
        }
    }

    /// Whether there are currently any selections besides the host's own.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// The selections besides the host's own.
    pub fn selections(&self) -> &SelectionSet<T> {
        self.swap.current()
    }

    /// The settings this controller was created with.
    pub fn config(&self) -> &MultiCaretConfig {
        &self.config
    }

    /// The clipboard used by the cut, copy and paste commands.
    pub fn clipboard(&self) -> &ClipboardStore {
        &self.clipboard
    }

    /// Mutable access to the clipboard used by the cut, copy and paste commands.
    pub fn clipboard_mut(&mut self) -> &mut ClipboardStore {
        &mut self.clipboard
    }

    fn update_mode(&mut self) {
        let mode = if self.swap.current().is_empty() {
            SelectionMode::Idle
        } else {
            SelectionMode::Active
        };

        if mode != self.mode {
            log::debug!("Switching from {:?} to {:?} selection mode", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Add selections to the set, such as the host's selection when the pointer is pressed.
    pub fn click_add<I>(&mut self, selections: I) -> bool
    where
        I: IntoIterator<Item = TrackedSelection<T>>,
    {
        let changed = self.swap.current_mut().insert_all(selections);
        self.update_mode();

        return changed;
    }

    /// Drop all of the extra selections.
    pub fn click_clear(&mut self) {
        self.swap.current_mut().clear();
        self.update_mode();
    }

    /// Add the selections made by the pointer, and hand the last selection back to the host.
    pub fn click_complete<H, I>(&mut self, host: &mut H, selections: I) -> SelectionResult<()>
    where
        H: SelectionHost<Tracker = T>,
        I: IntoIterator<Item = TrackedSelection<T>>,
    {
        let set = self.swap.current_mut();
        set.insert_all(selections);

        // Whichever selection comes last may have been merged with others, so it's removed and
        // given to the host after inserting.
        let res = set.remove_last().map(|last| last.select(host));
        self.update_mode();

        return res;
    }

    /// Handle the pointer being pressed.
    ///
    /// When the configured modifier is held, the host's current selections are kept, and this
    /// returns `true` to indicate that the host should start a new selection at the pointer.
    /// Otherwise, all of the extra selections are dropped.
    pub fn pointer_down<H>(&mut self, host: &H, modifiers: Modifiers) -> bool
    where
        H: SelectionHost<Tracker = T>,
    {
        if self.config.mouse_add_key.matches(modifiers) {
            self.click_add(TrackedSelection::from_host(host));
            self.dragging = true;

            return true;
        } else {
            self.click_clear();
            self.dragging = false;

            return false;
        }
    }

    /// Handle the pointer being released, returning whether a new selection was added.
    pub fn pointer_up<H>(&mut self, host: &mut H) -> SelectionResult<bool>
    where
        H: SelectionHost<Tracker = T>,
    {
        if !self.dragging {
            return Ok(false);
        }

        self.dragging = false;

        let selections = TrackedSelection::from_host(&*host);
        self.click_complete(host, selections)?;

        Ok(true)
    }

    /// Rebuild the selections by running `f` with the current set as the source, and the spare
    /// set as the target.
    ///
    /// If `f` fails, the current set is restored.
    fn swap_exec<H, R, F>(&mut self, host: &mut H, f: F) -> EditResult<R>
    where
        H: SelectionHost<Tracker = T>,
        F: FnOnce(&mut Batch<'_, T>, &mut H) -> EditResult<R>,
    {
        let res = {
            let MultiCaret { swap, clipboard, expected_edit_version, .. } = &mut *self;
            let (source, target) = swap.begin();

            source.insert_expect_end_all(TrackedSelection::from_host(&*host));
            log::trace!("Running command across {} selections", source.len());

            let mut batch = Batch { source, target, clipboard, expected: expected_edit_version };

            f(&mut batch, host).and_then(|r| {
                let last = batch.target.remove_last()?;
                last.select(host);

                Ok(r)
            })
        };

        if let Err(e) = &res {
            log::debug!("Restoring previous selections after failure: {e}");
            self.swap.abort();
        }

        self.update_mode();

        return res;
    }

    /// Run a [MultiCaretCommand] across all of the selections.
    ///
    /// When there are no extra selections, only the commands that can start a multiple
    /// selection are handled, and [CommandStatus::PassThrough] is returned for the rest.
    pub fn exec<H, S>(
        &mut self,
        host: &mut H,
        search: &S,
        cmd: &MultiCaretCommand,
    ) -> EditResult<CommandStatus>
    where
        H: SelectionHost<Tracker = T>,
        S: SearchService<H::Snapshot> + ?Sized,
    {
        if self.mode == SelectionMode::Idle && !cmd.is_any_time() {
            self.pass_through();

            return Ok(CommandStatus::PassThrough);
        }

        self.expected_edit_version = Some(host.snapshot().version());

        if cmd.is_edit() {
            log::trace!("Editing through {} selections", self.swap.current().len() + 1);
        }

        let query = FindQuery::new(String::new(), self.config.find_options());

        match cmd {
            MultiCaretCommand::TypeText(text) => {
                self.swap_exec(host, |batch, host| batch.type_text(host, text))?;
            },
            MultiCaretCommand::Delete => {
                self.swap_exec(host, |batch, host| batch.delete(host, MoveDir1D::Next))?;
            },
            MultiCaretCommand::Backspace => {
                self.swap_exec(host, |batch, host| batch.delete(host, MoveDir1D::Previous))?;
            },
            MultiCaretCommand::Cut => {
                self.swap_exec(host, |batch, host| batch.cut(host))?;
            },
            MultiCaretCommand::Copy => {
                self.copy(&*host)?;
            },
            MultiCaretCommand::Paste => {
                let text = match self.clipboard.get()? {
                    Some(text) if !text.is_empty() => text,
                    _ => return Ok(CommandStatus::Handled),
                };

                self.swap_exec(host, |batch, host| batch.paste(host, &text))?;
            },
            MultiCaretCommand::Cancel => {
                self.click_clear();
            },
            MultiCaretCommand::SplitSelectionIntoLines => {
                self.swap_exec(host, |batch, host| {
                    batch.split_into_lines(&*host);

                    Ok(())
                })?;
            },
            MultiCaretCommand::SelectAllInDocument => {
                self.swap_exec(host, |batch, host| {
                    batch.select_from_search(&*host, search, SearchTarget::All, query)
                })?;
            },
            MultiCaretCommand::SelectNextInDocument => {
                self.swap_exec(host, |batch, host| {
                    batch.select_from_search(&*host, search, SearchTarget::Next, query)
                })?;
            },
            MultiCaretCommand::SelectPreviousInDocument => {
                self.swap_exec(host, |batch, host| {
                    batch.select_from_search(&*host, search, SearchTarget::Previous, query)
                })?;
            },
        }

        Ok(CommandStatus::Handled)
    }

    fn copy<H>(&mut self, host: &H) -> EditResult<()>
    where
        H: SelectionHost<Tracker = T>,
    {
        let mut spans = self.swap.current().spans();
        spans.extend(host.selected_spans());
        spans.sort_by_key(|span| (span.start(), span.end()));
        spans.dedup();

        let text = copy_text(&host.snapshot(), spans);
        self.clipboard.set(text)?;

        Ok(())
    }

    /// Run a host command, such as a caret movement, once for each selection.
    ///
    /// Each selection becomes the host's live selection before `f` runs, and whatever the host
    /// has selected afterwards is added to the new set.
    pub fn exec_on_all<H, F>(&mut self, host: &mut H, mut f: F) -> EditResult<CommandStatus>
    where
        H: SelectionHost<Tracker = T>,
        F: FnMut(&mut H) -> EditResult<()>,
    {
        if self.mode == SelectionMode::Idle {
            self.pass_through();

            return Ok(CommandStatus::PassThrough);
        }

        self.swap_exec(host, |batch, host| {
            for sel in batch.source.iter() {
                sel.select(host);
                *batch.expected = Some(host.snapshot().version());

                f(host)?;

                batch.target.insert_expect_end_all(TrackedSelection::from_host(&*host));
            }

            Ok(())
        })?;

        Ok(CommandStatus::Handled)
    }

    /// Run a host command that should only happen once, like undo or redo, while keeping the
    /// selections.
    pub fn undo_redo<H, F>(&mut self, host: &mut H, f: F) -> EditResult<CommandStatus>
    where
        H: SelectionHost<Tracker = T>,
        F: FnOnce(&mut H) -> EditResult<()>,
    {
        if self.mode == SelectionMode::Idle {
            self.pass_through();

            return Ok(CommandStatus::PassThrough);
        }

        self.expected_edit_version = Some(host.snapshot().version());

        self.swap_exec(host, |batch, host| {
            f(host)?;
            batch.reinsert();

            Ok(())
        })?;

        Ok(CommandStatus::Handled)
    }

    /// Note that the host is about to run a command itself, so that any edits it makes are
    /// allowed through.
    pub fn pass_through(&mut self) {
        self.expected_edit_version = None;
    }

    /// Whether a change made against the `before` version of the buffer should be suppressed.
    ///
    /// While there are extra selections, changes other than the ones made by the current
    /// command, such as automatic formatting, would only apply at the host's live selection.
    pub fn should_cancel_change(&self, before: Version) -> bool {
        if self.mode != SelectionMode::Active {
            return false;
        }

        match self.expected_edit_version {
            Some(expected) if expected != before => {
                log::debug!("Suppressing change to {before}, expected an edit to {expected}");

                true
            },
            _ => false,
        }
    }
}

impl<T> Default for MultiCaret<T>
where
    T: SpanTracker,
{
    fn default() -> Self {
        MultiCaret::new(MultiCaretConfig::default())
    }
}
