//! # Clipboard storage
//!
//! ## Overview
//!
//! The cut, copy and paste commands read and write text through a [ClipboardStore]. By default
//! the store only keeps text in memory. When the `clipboard` feature is enabled,
//! [ClipboardStore::system] also mirrors the text into the operating system's clipboard using
//! [arboard](https://docs.rs/arboard).
use std::fmt;

#[cfg(feature = "clipboard")]
use std::cell::{RefCell, RefMut};

#[cfg(feature = "clipboard")]
use arboard::Clipboard;

/// Error while reading or writing the clipboard.
#[derive(thiserror::Error, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ClipboardError {
    /// The operating system clipboard contains an image instead of text.
    #[error("Clipboard contains image instead of text")]
    Image,

    /// The operating system clipboard rejected an update.
    #[error("Failed to update clipboard: {0}")]
    Failure(String),
}

/// Storage for text that has been cut or copied.
#[derive(Default)]
pub struct ClipboardStore {
    text: Option<String>,

    #[cfg(feature = "clipboard")]
    system: Option<RefCell<Clipboard>>,
}

impl ClipboardStore {
    /// Create a store that only keeps text in memory.
    pub fn new() -> Self {
        ClipboardStore::default()
    }

    /// Create a store that also reads from and writes to the operating system's clipboard.
    ///
    /// If the system clipboard can't be opened, this falls back to keeping text in memory.
    #[cfg(feature = "clipboard")]
    pub fn system() -> Self {
        let system = match Clipboard::new() {
            Ok(clipboard) => Some(RefCell::new(clipboard)),
            Err(e) => {
                log::warn!("Unable to open system clipboard: {e}");
                None
            },
        };

        ClipboardStore { text: None, system }
    }

    #[cfg(feature = "clipboard")]
    fn clipboard(&self) -> Option<RefMut<'_, Clipboard>> {
        self.system.as_ref().map(RefCell::borrow_mut)
    }

    /// Get the most recently stored text.
    pub fn get(&self) -> Result<Option<String>, ClipboardError> {
        #[cfg(feature = "clipboard")]
        if let Some(ref mut clipboard) = self.clipboard() {
            if clipboard.get_image().is_ok() {
                return Err(ClipboardError::Image);
            }

            if let Ok(text) = clipboard.get_text() {
                return Ok(Some(text));
            }
        }

        Ok(self.text.clone())
    }

    /// Replace the stored text.
    pub fn set(&mut self, text: String) -> Result<(), ClipboardError> {
        #[cfg(feature = "clipboard")]
        if let Some(ref mut clipboard) = self.clipboard() {
            clipboard
                .set_text(text.clone())
                .map_err(|e| ClipboardError::Failure(e.to_string()))?;
        }

        self.text = Some(text);

        Ok(())
    }
}

impl fmt::Debug for ClipboardStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipboardStore").field("text", &self.text).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = ClipboardStore::new();
        assert_eq!(store.get().unwrap(), None);

        store.set("hello\n".into()).unwrap();
        assert_eq!(store.get().unwrap(), Some("hello\n".into()));

        store.set("world\n".into()).unwrap();
        assert_eq!(store.get().unwrap(), Some("world\n".into()));
    }

    #[test]
    fn test_debug() {
        let mut store = ClipboardStore::new();
        store.set("abc".into()).unwrap();

        assert!(format!("{store:?}").contains("\"abc\""));
    }
}
