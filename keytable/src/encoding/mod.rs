//! Binary sort-key encoding.
//!
//! Turns typed property values into [`SortColumn`](crate::types::SortColumn)s
//! whose byte order (or, for floats, numeric order) is the order a table view
//! should present.
//!
//! # Usage
//!
//! ```
//! use keytable::encoding::{PropValue, SortKeyEncoder};
//! use keytable::compare_rows;
//!
//! let encoder = SortKeyEncoder::new();
//! let low = encoder.encode(&PropValue::Long(-7), false).unwrap();
//! let high = encoder.encode(&PropValue::Long(12), false).unwrap();
//!
//! assert!(compare_rows(&[low], &[high]).is_lt());
//! ```

mod collation;
mod sort_key;
mod value;

pub use collation::{CaseFoldCollator, Collator};
pub use sort_key::{SortKeyEncoder, SortKeyError};
pub use value::{PropType, PropValue};
