//! # Multi-selection commands
//!
//! ## Overview
//!
//! These are the commands that a [MultiCaret](crate::editing::editor::MultiCaret) knows how to
//! apply to every selection at once. Hosts forward their own commands to
//! [MultiCaret::exec](crate::editing::editor::MultiCaret::exec), and handle them themselves
//! whenever it returns [CommandStatus::PassThrough].

/// A command applied across all of the current selections.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MultiCaretCommand {
    /// Replace each selection with the given text.
    TypeText(String),

    /// Delete each selection, or the character following each caret.
    Delete,

    /// Delete each selection, or the character preceding each caret.
    Backspace,

    /// Copy the selected text to the clipboard, and then delete it.
    Cut,

    /// Copy the selected text to the clipboard.
    Copy,

    /// Replace each selection with text from the clipboard.
    Paste,

    /// Drop all of the extra selections.
    Cancel,

    /// Break each selection into one selection per line.
    SplitSelectionIntoLines,

    /// Select every occurrence of the selected text.
    SelectAllInDocument,

    /// Add a selection for the next occurrence of the selected text.
    SelectNextInDocument,

    /// Add a selection for the previous occurrence of the selected text.
    SelectPreviousInDocument,
}

impl MultiCaretCommand {
    /// Whether this command is handled even when there are no extra selections yet.
    pub fn is_any_time(&self) -> bool {
        match self {
            MultiCaretCommand::SplitSelectionIntoLines => true,
            MultiCaretCommand::SelectAllInDocument => true,
            MultiCaretCommand::SelectNextInDocument => true,
            MultiCaretCommand::SelectPreviousInDocument => true,

            MultiCaretCommand::TypeText(_) => false,
            MultiCaretCommand::Delete => false,
            MultiCaretCommand::Backspace => false,
            MultiCaretCommand::Cut => false,
            MultiCaretCommand::Copy => false,
            MultiCaretCommand::Paste => false,
            MultiCaretCommand::Cancel => false,
        }
    }

    /// Whether this command modifies the buffer's text.
    pub fn is_edit(&self) -> bool {
        match self {
            MultiCaretCommand::TypeText(_) => true,
            MultiCaretCommand::Delete => true,
            MultiCaretCommand::Backspace => true,
            MultiCaretCommand::Cut => true,
            MultiCaretCommand::Paste => true,

            MultiCaretCommand::Copy => false,
            MultiCaretCommand::Cancel => false,
            MultiCaretCommand::SplitSelectionIntoLines => false,
            MultiCaretCommand::SelectAllInDocument => false,
            MultiCaretCommand::SelectNextInDocument => false,
            MultiCaretCommand::SelectPreviousInDocument => false,
        }
    }
}

/// Whether a [MultiCaretCommand] was handled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CommandStatus {
    /// The command was applied to the selections.
    Handled,

    /// There are no extra selections, so the host should run the command itself.
    PassThrough,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_time() {
        assert!(MultiCaretCommand::SplitSelectionIntoLines.is_any_time());
        assert!(MultiCaretCommand::SelectNextInDocument.is_any_time());
        assert!(!MultiCaretCommand::TypeText("a".into()).is_any_time());
        assert!(!MultiCaretCommand::Cancel.is_any_time());
    }

    #[test]
    fn test_is_edit() {
        assert!(MultiCaretCommand::Cut.is_edit());
        assert!(MultiCaretCommand::Backspace.is_edit());
        assert!(!MultiCaretCommand::Copy.is_edit());
        assert!(!MultiCaretCommand::SelectAllInDocument.is_edit());
    }
}
