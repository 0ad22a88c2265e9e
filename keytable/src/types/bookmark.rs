//! Bookmark identifiers and resolved bookmark positions.

use std::fmt;

/// Identifies a saved cursor position.
///
/// Ids 0, 1 and 2 are reserved for the beginning, the current position and
/// the end of the table. Bookmarks created by a table are numbered from
/// [`BookmarkId::FIRST_ALLOCATED`] upwards and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookmarkId(pub u32);

impl BookmarkId {
    /// The beginning of the table.
    pub const BEGINNING: Self = Self(0);
    /// The current cursor position.
    pub const CURRENT: Self = Self(1);
    /// The end of the table.
    pub const END: Self = Self(2);
    /// The first id handed out by `create_bookmark`.
    pub const FIRST_ALLOCATED: Self = Self(3);

    /// Whether this id is one of the three reserved positions.
    #[must_use]
    pub const fn is_reserved(self) -> bool {
        self.0 < Self::FIRST_ALLOCATED.0
    }
}

impl fmt::Display for BookmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The resolved position of a bookmark.
///
/// `PositionChanged` is not an error: the bookmark is still valid, but rows
/// were inserted, deleted or hidden before it since it was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkPosition {
    /// The bookmark is at the same row number as when it was created.
    Unchanged(usize),
    /// The bookmark's row number differs from the one recorded at creation.
    PositionChanged(usize),
}

impl BookmarkPosition {
    /// The current row number of the bookmark.
    #[must_use]
    pub const fn row(self) -> usize {
        match self {
            Self::Unchanged(row) | Self::PositionChanged(row) => row,
        }
    }

    /// Whether the row number moved since the bookmark was created.
    #[must_use]
    pub const fn has_moved(self) -> bool {
        matches!(self, Self::PositionChanged(_))
    }
}
