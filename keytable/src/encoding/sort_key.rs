//! Typed value to sort column conversion.
//!
//! # Encodings
//!
//! - Integers: big-endian with the sign bit flipped, so unsigned byte order
//!   equals numeric order (`-1 < 0 < 1`).
//! - Times: 8 bytes big-endian.
//! - Floating point: an 8-byte big-endian double flagged `is_float`. These
//!   columns are compared as doubles, never as bytes.
//! - Strings: truncated to a fixed number of code points, then turned into a
//!   collation key and flagged `is_string`.
//! - Binary and GUIDs: raw bytes.
//! - Null: empty key flagged `is_null`.

use crate::config::KeyTableConfig;
use crate::encoding::collation::{CaseFoldCollator, Collator};
use crate::encoding::value::{PropType, PropValue};
use crate::types::SortColumn;

/// Flips the sign bit of a 16-bit two's complement integer.
const SIGN_FLIP_I16: u16 = 0x8000;
/// Flips the sign bit of a 32-bit two's complement integer.
const SIGN_FLIP_I32: u32 = 0x8000_0000;
/// Flips the sign bit of a 64-bit two's complement integer.
const SIGN_FLIP_I64: u64 = 0x8000_0000_0000_0000;

/// Converts typed values into sort columns.
///
/// # Invariants
///
/// - For two values of the same type, comparing the produced columns with
///   [`compare_rows`](crate::compare_rows) gives the same order as comparing
///   the values (strings: the collator's order of their truncated forms).
pub struct SortKeyEncoder<C: Collator = CaseFoldCollator> {
    collator: C,
    max_chars: usize,
}

impl SortKeyEncoder {
    /// Create an encoder with the case-folding collator and the default
    /// string truncation length.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            collator: CaseFoldCollator,
            max_chars: KeyTableConfig::DEFAULT_SORT_KEY_MAX_CHARS,
        }
    }
}

impl Default for SortKeyEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Collator> SortKeyEncoder<C> {
    /// Create an encoder with a custom collator.
    ///
    /// # Pre-conditions
    /// - `max_chars` > 0
    pub fn with_collator(collator: C, max_chars: usize) -> Self {
        debug_assert!(max_chars > 0, "string sort keys need at least one character");
        Self {
            collator,
            max_chars,
        }
    }

    /// Create an encoder with a custom collator and the truncation length
    /// from `config`.
    pub fn from_config(collator: C, config: &KeyTableConfig) -> Self {
        Self::with_collator(collator, config.sort_key_max_chars)
    }

    /// Maximum number of code points of a string that take part in sorting.
    #[must_use]
    pub const fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Encode `value` as an ascending or descending sort column.
    ///
    /// # Errors
    ///
    /// Returns `SortKeyError::InvalidType` for error values and multi-valued
    /// properties.
    pub fn encode(&self, value: &PropValue, descending: bool) -> Result<SortColumn, SortKeyError> {
        let column = match value {
            PropValue::Null => SortColumn::null(),
            PropValue::Boolean(b) => SortColumn::bytes(vec![u8::from(*b)]),
            PropValue::Short(n) => {
                #[allow(clippy::cast_sign_loss)] // Reinterpreting the bits is the point
                let bits = (*n as u16) ^ SIGN_FLIP_I16;
                SortColumn::bytes(bits.to_be_bytes().to_vec())
            }
            PropValue::Long(n) => {
                #[allow(clippy::cast_sign_loss)]
                let bits = (*n as u32) ^ SIGN_FLIP_I32;
                SortColumn::bytes(bits.to_be_bytes().to_vec())
            }
            PropValue::LongLong(n) | PropValue::Currency(n) => {
                #[allow(clippy::cast_sign_loss)]
                let bits = (*n as u64) ^ SIGN_FLIP_I64;
                SortColumn::bytes(bits.to_be_bytes().to_vec())
            }
            PropValue::SystemTime(t) => SortColumn::bytes(t.to_be_bytes().to_vec()),
            PropValue::Float(f) => SortColumn::float(f64::from(*f)),
            PropValue::Double(f) | PropValue::AppTime(f) => SortColumn::float(*f),
            PropValue::String(s) => {
                SortColumn::collation_key(self.collator.sort_key(truncate_chars(s, self.max_chars)))
            }
            PropValue::Binary(bytes) => SortColumn::bytes(bytes.as_slice().to_vec()),
            PropValue::Guid(guid) => SortColumn::bytes(guid.to_vec()),
            PropValue::Error(_) | PropValue::MultiValue(_) => {
                return Err(SortKeyError::InvalidType(value.prop_type()));
            }
        };

        Ok(column.with_descending(descending))
    }

    /// Encode several values into a sort vector, one level per value.
    ///
    /// `levels` pairs each value with its descending flag.
    pub fn encode_all<'a, I>(&self, levels: I) -> Result<Vec<SortColumn>, SortKeyError>
    where
        I: IntoIterator<Item = (&'a PropValue, bool)>,
    {
        levels
            .into_iter()
            .map(|(value, descending)| self.encode(value, descending))
            .collect()
    }
}

/// The longest prefix of `text` with at most `max_chars` code points.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Errors that can occur while encoding a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKeyError {
    /// The value's type has no sort-key encoding.
    InvalidType(PropType),
}

impl std::fmt::Display for SortKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidType(t) => write!(f, "value type {t:?} cannot be used as a sort key"),
        }
    }
}

impl std::error::Error for SortKeyError {}
