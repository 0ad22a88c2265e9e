//! Cursor movement parameters.

use crate::types::BookmarkId;

/// Where a relative seek starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOrigin {
    /// Row 0.
    Beginning,
    /// The cursor's current row number.
    Current,
    /// One past the last visible row.
    End,
    /// The row number a bookmark currently resolves to.
    Bookmark(BookmarkId),
}

impl From<BookmarkId> for SeekOrigin {
    /// Map a bookmark id to an origin, translating the reserved ids.
    fn from(id: BookmarkId) -> Self {
        match id {
            BookmarkId::BEGINNING => Self::Beginning,
            BookmarkId::CURRENT => Self::Current,
            BookmarkId::END => Self::End,
            other => Self::Bookmark(other),
        }
    }
}

/// Options for [`KeyTable::query_rows`](crate::KeyTable::query_rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryFlags {
    /// Walk towards the beginning of the table.
    pub backward: bool,
    /// Return hidden rows as well.
    pub show_hidden: bool,
    /// Leave the cursor where it was before the query.
    pub no_advance: bool,
}

impl QueryFlags {
    /// Forward query that advances the cursor and skips hidden rows.
    #[must_use]
    pub const fn forward() -> Self {
        Self {
            backward: false,
            show_hidden: false,
            no_advance: false,
        }
    }

    /// Set the direction to backward.
    #[must_use]
    pub const fn backward(mut self) -> Self {
        self.backward = true;
        self
    }

    /// Include hidden rows.
    #[must_use]
    pub const fn show_hidden(mut self) -> Self {
        self.show_hidden = true;
        self
    }

    /// Restore the cursor after the query.
    #[must_use]
    pub const fn no_advance(mut self) -> Self {
        self.no_advance = true;
        self
    }
}
