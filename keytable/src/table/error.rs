//! Table errors.

use crate::encoding::{PropType, SortKeyError};
use crate::types::BookmarkId;

/// Errors returned by [`KeyTable`](crate::KeyTable) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTableError {
    /// The row does not exist, is hidden where a visible row is required, or
    /// a category header is collapsed.
    NotFound,
    /// A call argument is out of range.
    InvalidParameter(&'static str),
    /// The bookmark does not exist or its row was deleted.
    InvalidBookmark(BookmarkId),
    /// The bookmark table is full.
    UnableToComplete,
    /// A value could not be encoded as a sort key.
    InvalidType(PropType),
}

impl std::fmt::Display for KeyTableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "row not found"),
            Self::InvalidParameter(what) => write!(f, "invalid parameter: {what}"),
            Self::InvalidBookmark(id) => write!(f, "invalid bookmark: {id}"),
            Self::UnableToComplete => write!(f, "unable to complete: bookmark limit reached"),
            Self::InvalidType(t) => write!(f, "invalid type: {t:?}"),
        }
    }
}

impl std::error::Error for KeyTableError {}

impl From<SortKeyError> for KeyTableError {
    fn from(e: SortKeyError) -> Self {
        match e {
            SortKeyError::InvalidType(t) => Self::InvalidType(t),
        }
    }
}
