//! String collation keys.
//!
//! A collation key is a byte string whose byte order is the desired string
//! order, so string columns can be compared with the same byte comparison as
//! every other column.
//!
//! # Key Format of `CaseFoldCollator`
//!
//! ```text
//! primary   = lowercase(text), each 0x00 escaped as 0x00 0x01
//! separator = 0x00 0x00
//! tertiary  = text as UTF-8
//! ```
//!
//! The primary level makes the order case-insensitive. The terminator sorts
//! below every escaped or regular byte, so `"ab" < "abc"` holds on the primary
//! level before the tertiary level is ever consulted. The tertiary level
//! orders strings that differ only in case (uppercase first).

/// Escape byte: a 0x00 in the primary level becomes 0x00 0x01.
const ESCAPE_BYTE: u8 = 0x01;
/// Terminator of the primary level.
const TERMINATOR: u8 = 0x00;

/// Produces collation keys for string sort columns.
///
/// Implementations must be deterministic: equal input yields equal keys.
pub trait Collator: Send + Sync {
    /// Build the collation key for `text`.
    fn sort_key(&self, text: &str) -> Vec<u8>;
}

/// Locale-independent collator: case-insensitive, then case-sensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseFoldCollator;

impl Collator for CaseFoldCollator {
    fn sort_key(&self, text: &str) -> Vec<u8> {
        let mut key = Vec::with_capacity(text.len() * 2 + 2);
        let mut buf = [0u8; 4];

        for lower in text.chars().flat_map(char::to_lowercase) {
            for &byte in lower.encode_utf8(&mut buf).as_bytes() {
                key.push(byte);
                if byte == 0x00 {
                    key.push(ESCAPE_BYTE);
                }
            }
        }
        key.push(TERMINATOR);
        key.push(TERMINATOR);
        key.extend_from_slice(text.as_bytes());
        key
    }
}
