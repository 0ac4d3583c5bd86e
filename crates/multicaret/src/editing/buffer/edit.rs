use crate::editing::buffer::Version;
use crate::editing::span::{OffsetAdjustment, Span};
use crate::errors::{EditError, EditResult};

/// A single replacement of text within an [EditTransaction].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Change {
    /// The replaced region.
    pub span: Span,

    /// The text to put in its place.
    pub text: String,
}

/// A set of changes staged against one version of a buffer.
///
/// Nothing happens to the buffer until the transaction is handed to
/// [TextBuffer::apply](super::TextBuffer::apply), which applies every change or none of them.
/// Dropping a transaction discards it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EditTransaction {
    base: Version,
    changes: Vec<Change>,
}

impl Change {
    /// The number of characters this change inserts.
    pub fn inserted(&self) -> usize {
        self.text.chars().count()
    }

    /// Describe how this change moves offsets after it.
    pub fn adjustment(&self) -> OffsetAdjustment {
        OffsetAdjustment::new(self.span, self.inserted())
    }
}

impl EditTransaction {
    /// Begin a new transaction against the given version.
    pub fn new(base: Version) -> Self {
        EditTransaction { base, changes: vec![] }
    }

    /// The version these changes were staged against.
    pub fn base(&self) -> Version {
        self.base
    }

    /// The staged changes, in the order they were added.
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Whether any changes have been staged.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Replace the text within a span.
    pub fn replace<T: Into<String>>(&mut self, span: Span, text: T) -> &mut Self {
        self.changes.push(Change { span, text: text.into() });
        self
    }

    /// Delete the text within a span.
    pub fn delete(&mut self, span: Span) -> &mut Self {
        self.replace(span, String::new())
    }

    /// Insert text at an offset.
    pub fn insert<T: Into<String>>(&mut self, offset: usize, text: T) -> &mut Self {
        self.replace(Span::point(offset), text)
    }

    /// Check that every change fits within a buffer of the given length and that no two
    /// changes overlap, returning the changes sorted by position.
    pub(crate) fn validate(self, len: usize) -> EditResult<Vec<Change>> {
        let mut changes = self.changes;
        changes.sort_by_key(|c| (c.span.start(), c.span.end()));

        for change in changes.iter() {
            if change.span.end() > len {
                let (start, end) = (change.span.start(), change.span.end());

                return Err(EditError::OutOfBounds { start, end, len });
            }
        }

        for pair in changes.windows(2) {
            let (a, b) = (&pair[0].span, &pair[1].span);

            if a.end() > b.start() || (a.is_empty() && b.is_empty() && a == b) {
                return Err(EditError::OverlappingEdits(b.start()));
            }
        }

        return Ok(changes);
    }
}
