//! Row comparator.
//!
//! Orders two sort vectors level by level. The same function drives tree
//! ordering, exact lookups and lower-bound searches; [`shares_prefix`] drives
//! the category walks.
//!
//! # Rules
//!
//! 1. Levels present in both vectors are compared in order.
//! 2. Null sorts before non-null; two nulls are equal.
//! 3. Two float columns compare as doubles (IEEE 754 total order).
//! 4. Everything else, string collation keys included, compares as bytes,
//!    with a shorter key that is a prefix of the other sorting first.
//! 5. The first unequal level decides, inverted if that level of the left
//!    vector is descending.
//! 6. If every shared level is equal, the vector with fewer levels sorts
//!    first, regardless of direction.

use std::cmp::Ordering;

use crate::types::SortColumn;

/// Compare two sort vectors.
#[must_use]
pub fn compare_rows(a: &[SortColumn], b: &[SortColumn]) -> Ordering {
    for (left, right) in a.iter().zip(b) {
        let ordering = compare_columns(left, right);
        if ordering != Ordering::Equal {
            return if left.descending {
                ordering.reverse()
            } else {
                ordering
            };
        }
    }

    a.len().cmp(&b.len())
}

/// Whether two sort vectors order identically against each other.
///
/// Direction flags make the comparator asymmetric, so both directions are
/// checked.
#[must_use]
pub fn same_position(a: &[SortColumn], b: &[SortColumn]) -> bool {
    compare_rows(a, b) == Ordering::Equal && compare_rows(b, a) == Ordering::Equal
}

/// Whether `row` starts with every level of `prefix`.
///
/// A row with fewer levels than the prefix never matches.
#[must_use]
pub fn shares_prefix(prefix: &[SortColumn], row: &[SortColumn]) -> bool {
    row.len() >= prefix.len()
        && prefix
            .iter()
            .zip(row)
            .all(|(p, r)| compare_columns(p, r) == Ordering::Equal)
}

/// Compare a single level, ignoring its direction.
fn compare_columns(a: &SortColumn, b: &SortColumn) -> Ordering {
    match (a.is_null, b.is_null) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.total_cmp(&y);
    }

    a.key.as_slice().cmp(b.key.as_slice())
}
