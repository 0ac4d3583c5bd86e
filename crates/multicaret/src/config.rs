//! # Configuration
//!
//! ## Overview
//!
//! [MultiCaretConfig] controls how selection sets allocate storage, how the select-in-document
//! commands match text, and which modifier adds a selection when clicking. It can be loaded from
//! TOML:
//!
//! ```
//! use multicaret::config::{MouseSelectionAddKey, MultiCaretConfig};
//!
//! let config = MultiCaretConfig::from_toml_str(r#"
//!     grow-by = 4
//!     mouse-add-key = "ctrl"
//! "#).unwrap();
//!
//! assert_eq!(config.grow_by, 4);
//! assert_eq!(config.initial_capacity, 10);
//! assert_eq!(config.mouse_add_key, MouseSelectionAddKey::Ctrl);
//! ```
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::editing::editor::Modifiers;
use crate::editing::search::FindOptions;
use crate::editing::selection::{DEFAULT_CAPACITY, DEFAULT_GROW_BY};

/// Error while loading a [MultiCaretConfig].
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// Failure to read the configuration file.
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Failure to parse the configuration file.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration was parsed, but contains an unusable value.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// The modifier key that adds a new selection when the pointer is pressed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MouseSelectionAddKey {
    /// Hold Alt to add a selection.
    #[default]
    Alt,

    /// Hold Control to add a selection.
    Ctrl,
}

impl MouseSelectionAddKey {
    /// Whether the pressed modifiers include this key.
    pub fn matches(&self, modifiers: Modifiers) -> bool {
        match self {
            MouseSelectionAddKey::Alt => modifiers.contains(Modifiers::ALT),
            MouseSelectionAddKey::Ctrl => modifiers.contains(Modifiers::CTRL),
        }
    }
}

/// Settings for a [MultiCaret](crate::editing::editor::MultiCaret).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct MultiCaretConfig {
    /// How many selections a set has room for before it first needs to grow.
    pub initial_capacity: usize,

    /// How many slots are added each time a set fills up.
    pub grow_by: usize,

    /// Whether selecting other occurrences of text requires matching case.
    pub match_case: bool,

    /// Which modifier adds a selection on pointer press.
    pub mouse_add_key: MouseSelectionAddKey,
}

impl MultiCaretConfig {
    /// Parse a configuration from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: MultiCaretConfig = toml::from_str(s)?;

        config.validate()?;

        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&s)?;

        log::debug!("Loaded configuration from {}", path.display());

        Ok(config)
    }

    /// Check that every setting has a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grow_by == 0 {
            let msg = "grow-by must be at least 1".to_string();

            return Err(ConfigError::Invalid(msg));
        }

        Ok(())
    }

    /// The search flags used when selecting other occurrences of text.
    pub fn find_options(&self) -> FindOptions {
        if self.match_case {
            FindOptions::MATCH_CASE
        } else {
            FindOptions::NONE
        }
    }
}

impl Default for MultiCaretConfig {
    fn default() -> Self {
        MultiCaretConfig {
            initial_capacity: DEFAULT_CAPACITY,
            grow_by: DEFAULT_GROW_BY,
            match_case: true,
            mouse_add_key: MouseSelectionAddKey::Alt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use temp_dir::TempDir;

    #[test]
    fn test_defaults() {
        let config = MultiCaretConfig::from_toml_str("").unwrap();

        assert_eq!(config, MultiCaretConfig::default());
        assert_eq!(config.initial_capacity, 10);
        assert_eq!(config.grow_by, 10);
        assert!(config.match_case);
        assert_eq!(config.mouse_add_key, MouseSelectionAddKey::Alt);
        assert_eq!(config.find_options(), FindOptions::MATCH_CASE);
    }

    #[test]
    fn test_parse() {
        let s = "initial-capacity = 2\ngrow-by = 3\nmatch-case = false\nmouse-add-key = \"ctrl\"\n";
        let config = MultiCaretConfig::from_toml_str(s).unwrap();

        assert_eq!(config.initial_capacity, 2);
        assert_eq!(config.grow_by, 3);
        assert!(!config.match_case);
        assert_eq!(config.mouse_add_key, MouseSelectionAddKey::Ctrl);
        assert_eq!(config.find_options(), FindOptions::NONE);
    }

    #[test]
    fn test_parse_errors() {
        let res = MultiCaretConfig::from_toml_str("grow-by = 0\n");
        assert!(matches!(res, Err(ConfigError::Invalid(_))));

        let res = MultiCaretConfig::from_toml_str("unknown-field = 1\n");
        assert!(matches!(res, Err(ConfigError::Parse(_))));

        let res = MultiCaretConfig::from_toml_str("mouse-add-key = \"shift\"\n");
        assert!(matches!(res, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_round_trip_toml() {
        let config = MultiCaretConfig { grow_by: 7, ..Default::default() };
        let s = toml::to_string(&config).unwrap();

        assert!(s.contains("grow-by = 7"));
        assert_eq!(MultiCaretConfig::from_toml_str(&s).unwrap(), config);
    }

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.child("multicaret.toml");
        std::fs::write(&path, "match-case = false\n").unwrap();

        let config = MultiCaretConfig::load(&path).unwrap();
        assert!(!config.match_case);

        let res = MultiCaretConfig::load(dir.child("missing.toml"));
        assert!(matches!(res, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_mouse_add_key() {
        assert!(MouseSelectionAddKey::Alt.matches(Modifiers::ALT));
        assert!(MouseSelectionAddKey::Alt.matches(Modifiers::ALT | Modifiers::SHIFT));
        assert!(!MouseSelectionAddKey::Alt.matches(Modifiers::CTRL));
        assert!(MouseSelectionAddKey::Ctrl.matches(Modifiers::CTRL));
        assert!(!MouseSelectionAddKey::Ctrl.matches(Modifiers::empty()));
    }
}
