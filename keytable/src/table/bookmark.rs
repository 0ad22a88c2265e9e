//! Bookmark registry.
//!
//! Maps bookmark ids to saved cursor positions. A position is either a tree
//! node or "past the end" (`None`), together with the row number the cursor
//! had when the bookmark was taken.
//!
//! # Invariants
//!
//! - `entries.len() <= capacity`
//! - Every node position refers to a live node; the table calls
//!   `forget_node` before a node is freed.
//! - Ids are allocated from `BookmarkId::FIRST_ALLOCATED` upwards and never
//!   reused.

use std::collections::HashMap;

use crate::table::error::KeyTableError;
use crate::table::node::NodeIdx;
use crate::types::BookmarkId;

/// A saved cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bookmark {
    /// Node the cursor was on; `None` for past the end.
    pub position: Option<NodeIdx>,
    /// Row number at creation time.
    pub row: usize,
}

/// The bookmarks of one table.
#[derive(Debug)]
pub struct BookmarkRegistry {
    entries: HashMap<BookmarkId, Bookmark>,
    next_id: u32,
    capacity: usize,
}

impl BookmarkRegistry {
    /// Create an empty registry holding at most `capacity` bookmarks.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            next_id: BookmarkId::FIRST_ALLOCATED.0,
            capacity,
        }
    }

    /// Number of live bookmarks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Save a position under a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `UnableToComplete` when the registry is full or the id space
    /// is exhausted.
    pub fn create(&mut self, bookmark: Bookmark) -> Result<BookmarkId, KeyTableError> {
        if self.entries.len() >= self.capacity {
            return Err(KeyTableError::UnableToComplete);
        }
        let id = BookmarkId(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or(KeyTableError::UnableToComplete)?;

        self.entries.insert(id, bookmark);
        Ok(id)
    }

    /// Look up a bookmark.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBookmark` if the id is unknown.
    pub fn get(&self, id: BookmarkId) -> Result<Bookmark, KeyTableError> {
        self.entries
            .get(&id)
            .copied()
            .ok_or(KeyTableError::InvalidBookmark(id))
    }

    /// Remove a bookmark.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBookmark` if the id is unknown.
    pub fn free(&mut self, id: BookmarkId) -> Result<(), KeyTableError> {
        self.entries
            .remove(&id)
            .map(|_| ())
            .ok_or(KeyTableError::InvalidBookmark(id))
    }

    /// Drop every bookmark on `node`. Returns how many were dropped.
    pub fn forget_node(&mut self, node: NodeIdx) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, bookmark| bookmark.position != Some(node));
        before - self.entries.len()
    }

    /// Drop every bookmark. The id counter keeps counting.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    pub fn positions(&self) -> impl Iterator<Item = Option<NodeIdx>> + '_ {
        self.entries.values().map(|bookmark| bookmark.position)
    }
}
