//! Sort columns and sort vectors.
//!
//! A row's position in a table is decided by its sort vector: one
//! [`SortColumn`] per sort level, primary level first. Each column carries an
//! opaque byte key plus flags that select how the comparator treats it.

/// One level of a row's sort order.
///
/// # Invariants
///
/// - `is_null` columns have an empty `key`.
/// - `is_float` columns hold an 8-byte big-endian IEEE 754 double.
/// - `is_string` columns hold a collation key produced by a
///   [`Collator`](crate::encoding::Collator).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[allow(clippy::disallowed_methods)] // Vectors are cloned when a caller keeps its own copy
pub struct SortColumn {
    /// Encoded key bytes.
    pub key: Vec<u8>,
    /// The source value was null.
    pub is_null: bool,
    /// The key holds a double and is compared numerically.
    pub is_float: bool,
    /// The key is a string collation key.
    pub is_string: bool,
    /// Invert the ordering of this level.
    pub descending: bool,
}

/// The ordered sort levels of one row.
pub type SortVector = Vec<SortColumn>;

impl SortColumn {
    /// A column holding raw comparable bytes.
    #[must_use]
    pub const fn bytes(key: Vec<u8>) -> Self {
        Self {
            key,
            is_null: false,
            is_float: false,
            is_string: false,
            descending: false,
        }
    }

    /// A null column. Sorts before every non-null value of the same level.
    #[must_use]
    pub const fn null() -> Self {
        Self {
            key: Vec::new(),
            is_null: true,
            is_float: false,
            is_string: false,
            descending: false,
        }
    }

    /// A column compared as a double.
    #[must_use]
    pub fn float(value: f64) -> Self {
        Self {
            key: value.to_be_bytes().to_vec(),
            is_null: false,
            is_float: true,
            is_string: false,
            descending: false,
        }
    }

    /// A column holding a string collation key.
    #[must_use]
    pub const fn collation_key(key: Vec<u8>) -> Self {
        Self {
            key,
            is_null: false,
            is_float: false,
            is_string: true,
            descending: false,
        }
    }

    /// A column holding a 4-byte big-endian unsigned integer.
    #[must_use]
    pub fn u32(value: u32) -> Self {
        Self::bytes(value.to_be_bytes().to_vec())
    }

    /// Set the direction of this level.
    #[must_use]
    pub const fn with_descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }

    /// Decode the double held by a float column.
    ///
    /// Returns `None` if the column is not a float column or the key is not
    /// exactly 8 bytes.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        if !self.is_float {
            return None;
        }
        let bytes: [u8; 8] = self.key.as_slice().try_into().ok()?;
        Some(f64::from_be_bytes(bytes))
    }
}
