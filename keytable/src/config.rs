//! Table configuration.
//!
//! Limits for a [`KeyTable`](crate::KeyTable) and the sort-key encoder,
//! loadable from environment variables.
//!
//! # Environment Variables
//!
//! - `KEYTABLE_MAX_BOOKMARKS`: live bookmarks allowed per table (default: `100`)
//! - `KEYTABLE_SORT_KEY_MAX_CHARS`: code points of a string that take part in
//!   sorting (default: `255`)
//!
//! # Invariants
//!
//! - `max_bookmarks` > 0
//! - `sort_key_max_chars` > 0

/// Configuration of a table and its encoder.
///
/// # Post-conditions
///
/// When constructed via `from_env()` or `from_lookup()`:
/// - every field is a positive integer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyTableConfig {
    /// Maximum number of bookmarks that may exist at once in one table.
    pub max_bookmarks: usize,
    /// Number of leading code points of a string used for its sort key.
    pub sort_key_max_chars: usize,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for KeyTableConfig {
    fn default() -> Self {
        Self {
            max_bookmarks: Self::DEFAULT_MAX_BOOKMARKS,
            sort_key_max_chars: Self::DEFAULT_SORT_KEY_MAX_CHARS,
        }
    }
}

impl KeyTableConfig {
    /// Default bookmark limit.
    pub const DEFAULT_MAX_BOOKMARKS: usize = 100;
    /// Default string sort-key length in code points.
    pub const DEFAULT_SORT_KEY_MAX_CHARS: usize = 255;

    const MAX_BOOKMARKS_VAR: &'static str = "KEYTABLE_MAX_BOOKMARKS";
    const SORT_KEY_MAX_CHARS_VAR: &'static str = "KEYTABLE_SORT_KEY_MAX_CHARS";

    /// Load configuration from environment variables.
    ///
    /// Unset variables take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but is not a positive
    /// integer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_bookmarks =
            Self::load_positive(&lookup, Self::MAX_BOOKMARKS_VAR, Self::DEFAULT_MAX_BOOKMARKS)?;
        let sort_key_max_chars = Self::load_positive(
            &lookup,
            Self::SORT_KEY_MAX_CHARS_VAR,
            Self::DEFAULT_SORT_KEY_MAX_CHARS,
        )?;

        Ok(Self {
            max_bookmarks,
            sort_key_max_chars,
        })
    }

    /// Set the bookmark limit.
    #[must_use]
    pub const fn with_max_bookmarks(mut self, max_bookmarks: usize) -> Self {
        self.max_bookmarks = max_bookmarks;
        self
    }

    /// Set the string sort-key length.
    #[must_use]
    pub const fn with_sort_key_max_chars(mut self, chars: usize) -> Self {
        self.sort_key_max_chars = chars;
        self
    }

    /// Load one positive integer, falling back to `default` when unset.
    fn load_positive<F>(lookup: &F, name: &str, default: usize) -> Result<usize, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(value) = lookup(name) else {
            return Ok(default);
        };

        match value.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::InvalidValue {
                name: name.to_string(),
                message: format!("'{value}' is not a positive integer"),
            }),
        }
    }
}
