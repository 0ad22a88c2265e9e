//! The sorted, pageable table.
//!
//! `KeyTable` wraps the tree, the id index, the cursor and the bookmark
//! registry in one mutex. Every public call takes the lock for its whole
//! duration, so calls are linearized and never observe a half-applied
//! mutation.
//!
//! # Cursor
//!
//! The cursor has three logical positions:
//!
//! - before the first row (on the sentinel), the state after `new()`/`clear()`
//! - on a row
//! - past the last row (`None`)

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::compare::{compare_rows, same_position, shares_prefix};
use crate::config::KeyTableConfig;
use crate::table::bookmark::{Bookmark, BookmarkRegistry};
use crate::table::error::KeyTableError;
use crate::table::node::{NodeIdx, SENTINEL, TableRow};
use crate::table::tree::RowTree;
use crate::types::{
    BookmarkId, BookmarkPosition, QueryFlags, RowKey, RowUpdate, SeekOrigin, SortColumn,
    SortVector, UpdateKind,
};

/// An in-memory sorted table of rows addressed by [`RowKey`].
///
/// # Examples
///
/// ```
/// use keytable::{KeyTable, RowKey, SeekOrigin, SortColumn, UpdateKind};
///
/// let table = KeyTable::new();
/// for id in [3u32, 1, 2] {
///     table
///         .update_row(UpdateKind::Add, RowKey::object(id), vec![SortColumn::u32(id)], false)
///         .unwrap();
/// }
///
/// table.seek_row(SeekOrigin::Beginning, 0).unwrap();
/// assert_eq!(table.current_row(), Some(RowKey::object(1)));
/// assert_eq!(table.row_count(), 3);
/// ```
pub struct KeyTable {
    inner: Mutex<KeyTableInner>,
}

impl Default for KeyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyTable {
    /// Create an empty table with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(KeyTableConfig::default())
    }

    /// Create an empty table.
    #[must_use]
    pub fn with_config(config: KeyTableConfig) -> Self {
        Self {
            inner: Mutex::new(KeyTableInner::new(&config)),
        }
    }

    #[allow(clippy::expect_used)] // Mutex poisoning indicates unrecoverable state
    fn lock(&self) -> MutexGuard<'_, KeyTableInner> {
        self.inner.lock().expect("lock poisoned")
    }

    /// Add, modify or delete a row.
    ///
    /// `hidden` only applies when a new row is created; existing rows keep
    /// their hidden flag.
    ///
    /// # Post-conditions
    /// - `RowUpdate::action` is what was actually done: `Add` of a present
    ///   key becomes `Modify`, `Modify` of an absent key becomes `Add`.
    /// - `RowUpdate::prev` is the nearest visible row before the affected
    ///   row (for `Delete`, as it was before the removal).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when deleting an absent key.
    pub fn update_row(
        &self,
        kind: UpdateKind,
        key: RowKey,
        cols: SortVector,
        hidden: bool,
    ) -> Result<RowUpdate, KeyTableError> {
        self.lock().update_row(kind, key, cols, hidden)
    }

    /// Replace one level of a row's sort vector.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown key and `InvalidParameter` when
    /// `column_index` is past the end of the row's vector.
    pub fn update_partial_sort_key(
        &self,
        key: RowKey,
        column_index: usize,
        column: SortColumn,
    ) -> Result<RowUpdate, KeyTableError> {
        self.lock().update_partial_sort_key(key, column_index, column)
    }

    /// Remove every row and bookmark and put the cursor before the first row.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of visible rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.lock().tree.visible_rows()
    }

    /// Number of visible rows before the cursor.
    #[must_use]
    pub fn current_position(&self) -> usize {
        self.lock().current_position()
    }

    /// Key of the row under the cursor, if the cursor is on a row.
    #[must_use]
    pub fn current_row(&self) -> Option<RowKey> {
        self.lock().current_row()
    }

    /// Move the cursor `offset` rows from `origin`, clamped to the table.
    ///
    /// Returns the number of rows actually moved relative to the cursor's
    /// previous position.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBookmark` if the origin is an unknown bookmark.
    pub fn seek_row(&self, origin: SeekOrigin, offset: i64) -> Result<i64, KeyTableError> {
        self.lock().seek_row(origin, offset)
    }

    /// Put the cursor on a row.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the row is absent or hidden.
    pub fn seek_id(&self, key: RowKey) -> Result<(), KeyTableError> {
        self.lock().seek_id(key)
    }

    /// Move the cursor to the in-order successor and return the row now
    /// under it. Hidden rows are not skipped.
    pub fn next(&self) -> Option<RowKey> {
        self.lock().next()
    }

    /// Move the cursor to the in-order predecessor and return the row now
    /// under it. Hidden rows are not skipped.
    pub fn prev(&self) -> Option<RowKey> {
        self.lock().prev()
    }

    /// Read up to `count` rows starting at the cursor.
    pub fn query_rows(&self, count: usize, flags: QueryFlags) -> Vec<RowKey> {
        self.lock().query_rows(count, flags)
    }

    /// The nearest visible row before `key`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `key` is absent.
    pub fn previous_row_of(&self, key: RowKey) -> Result<Option<RowKey>, KeyTableError> {
        self.lock().previous_row_of(key)
    }

    /// Save the cursor position.
    ///
    /// # Errors
    ///
    /// Returns `UnableToComplete` when the bookmark limit is reached.
    pub fn create_bookmark(&self) -> Result<BookmarkId, KeyTableError> {
        self.lock().create_bookmark()
    }

    /// Resolve a bookmark to its current row number.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBookmark` for unknown ids, including bookmarks whose
    /// row has been deleted.
    pub fn get_bookmark(&self, id: BookmarkId) -> Result<BookmarkPosition, KeyTableError> {
        self.lock().get_bookmark(id)
    }

    /// Delete a bookmark.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBookmark` for unknown ids.
    pub fn free_bookmark(&self, id: BookmarkId) -> Result<(), KeyTableError> {
        self.lock().bookmarks.free(id)
    }

    /// The header row followed by every row sharing its sort vector as a
    /// prefix, hidden rows included.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `header` is absent.
    pub fn rows_with_prefix(&self, header: RowKey) -> Result<Vec<RowKey>, KeyTableError> {
        self.lock().rows_with_prefix(header)
    }

    /// Collapse a category: hide every row after `header` that shares its
    /// sort vector as a prefix. Returns the rows that became hidden.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `header` is absent.
    pub fn hide_rows(&self, header: RowKey) -> Result<Vec<RowKey>, KeyTableError> {
        self.lock().hide_rows(header)
    }

    /// Expand a category by one level. Returns the rows that became visible.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `header` is absent or hidden.
    pub fn unhide_rows(&self, header: RowKey) -> Result<Vec<RowKey>, KeyTableError> {
        self.lock().unhide_rows(header)
    }

    /// Put the cursor on the first visible row not less than `cols` and
    /// return it. Leaves the cursor past the end if there is none.
    pub fn lower_bound(&self, cols: &[SortColumn]) -> Option<RowKey> {
        self.lock().lower_bound(cols)
    }

    /// The first visible row whose vector equals `cols`. The cursor does not
    /// move.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is no such row.
    pub fn find_exact(&self, cols: &[SortColumn]) -> Result<RowKey, KeyTableError> {
        self.lock().find_exact(cols)
    }

    /// Check every structural invariant of the table.
    #[cfg(test)]
    pub(crate) fn validate(&self) -> Result<(), String> {
        self.lock().validate()
    }

    /// Sort vector of a row.
    #[cfg(test)]
    pub(crate) fn sort_vector(&self, key: RowKey) -> Option<SortVector> {
        let inner = self.lock();
        let idx = inner.id_index.get(&key).copied()?;
        Some(inner.tree.cols(idx).to_vec())
    }

    /// Every row in sort order with its hidden flag. The cursor does not
    /// move.
    #[cfg(test)]
    pub(crate) fn rows_in_order(&self) -> Vec<(RowKey, bool)> {
        let inner = self.lock();
        let mut rows = Vec::with_capacity(inner.tree.len());
        let mut current = inner.tree.first();
        while let Some(idx) = current {
            rows.push((inner.tree.key(idx), inner.tree.is_hidden(idx)));
            current = inner.tree.successor(idx);
        }
        rows
    }
}

/// State protected by the table's mutex.
///
/// # Invariants
///
/// - `id_index` holds exactly one entry per row of `tree`.
/// - `cursor` is `None`, the sentinel, or a live row.
/// - Every bookmark position is `None`, the sentinel, or a live row.
struct KeyTableInner {
    tree: RowTree,
    id_index: HashMap<RowKey, NodeIdx>,
    cursor: Option<NodeIdx>,
    bookmarks: BookmarkRegistry,
}

impl KeyTableInner {
    fn new(config: &KeyTableConfig) -> Self {
        Self {
            tree: RowTree::new(),
            id_index: HashMap::new(),
            cursor: Some(SENTINEL),
            bookmarks: BookmarkRegistry::new(config.max_bookmarks),
        }
    }

    fn lookup(&self, key: RowKey) -> Result<NodeIdx, KeyTableError> {
        self.id_index
            .get(&key)
            .copied()
            .ok_or(KeyTableError::NotFound)
    }

    fn prev_visible_key(&self, idx: NodeIdx) -> Option<RowKey> {
        self.tree.prev_visible(idx).map(|prev| self.tree.key(prev))
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    fn update_row(
        &mut self,
        kind: UpdateKind,
        key: RowKey,
        cols: SortVector,
        hidden: bool,
    ) -> Result<RowUpdate, KeyTableError> {
        let update = match (kind, self.id_index.get(&key).copied()) {
            (UpdateKind::Delete, Some(idx)) => self.delete(idx),
            (UpdateKind::Delete, None) => return Err(KeyTableError::NotFound),
            (UpdateKind::Add | UpdateKind::Modify, Some(idx)) => self.modify(idx, cols),
            (UpdateKind::Add | UpdateKind::Modify, None) => self.add(key, cols, hidden),
        };

        tracing::trace!("row {key}: requested {kind:?}, applied {:?}", update.action);
        Ok(update)
    }

    fn add(&mut self, key: RowKey, cols: SortVector, hidden: bool) -> RowUpdate {
        let idx = self.tree.insert(key, cols, hidden);
        self.id_index.insert(key, idx);

        RowUpdate {
            prev: self.prev_visible_key(idx),
            action: UpdateKind::Add,
        }
    }

    fn modify(&mut self, idx: NodeIdx, cols: SortVector) -> RowUpdate {
        if same_position(self.tree.cols(idx), &cols) {
            self.tree.replace_cols(idx, cols);
            return RowUpdate {
                prev: self.prev_visible_key(idx),
                action: UpdateKind::Modify,
            };
        }

        let cursor_on_row = self.cursor == Some(idx);
        let row = self.remove_node(idx);
        let new_idx = self.tree.insert(row.key, cols, row.hidden);
        self.id_index.insert(row.key, new_idx);
        if cursor_on_row {
            self.cursor = Some(new_idx);
        }

        RowUpdate {
            prev: self.prev_visible_key(new_idx),
            action: UpdateKind::Modify,
        }
    }

    fn delete(&mut self, idx: NodeIdx) -> RowUpdate {
        let prev = self.prev_visible_key(idx);
        self.remove_node(idx);

        RowUpdate {
            prev,
            action: UpdateKind::Delete,
        }
    }

    /// Remove a row from the tree, the index and the bookmarks, keeping the
    /// cursor in bounds.
    fn remove_node(&mut self, idx: NodeIdx) -> TableRow {
        if self.cursor == Some(idx) {
            let next = self
                .tree
                .next_visible(idx)
                .or_else(|| self.tree.prev_visible(idx));
            self.cursor = Some(next.unwrap_or(SENTINEL));
        }

        let dropped = self.bookmarks.forget_node(idx);
        let row = self.tree.remove(idx);
        self.id_index.remove(&row.key);

        if dropped > 0 {
            tracing::debug!("row {} removed, dropped {dropped} bookmark(s)", row.key);
        }
        row
    }

    fn update_partial_sort_key(
        &mut self,
        key: RowKey,
        column_index: usize,
        column: SortColumn,
    ) -> Result<RowUpdate, KeyTableError> {
        let idx = self.lookup(key)?;
        let mut cols = self.tree.cols(idx).to_vec();
        let slot = cols
            .get_mut(column_index)
            .ok_or(KeyTableError::InvalidParameter("column index out of range"))?;
        *slot = column;

        let update = self.modify(idx, cols);
        tracing::trace!("row {key}: sort column {column_index} replaced");
        Ok(update)
    }

    fn clear(&mut self) {
        let rows = self.tree.len();
        self.tree.clear();
        self.id_index.clear();
        self.bookmarks.clear();
        self.cursor = Some(SENTINEL);
        tracing::debug!("table cleared, {rows} row(s) dropped");
    }

    // ------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------

    fn current_position(&self) -> usize {
        self.cursor
            .map_or_else(|| self.tree.visible_rows(), |idx| self.tree.rank(idx))
    }

    fn current_row(&self) -> Option<RowKey> {
        self.cursor
            .filter(|&idx| idx != SENTINEL)
            .map(|idx| self.tree.key(idx))
    }

    fn seek_row(&mut self, origin: SeekOrigin, offset: i64) -> Result<i64, KeyTableError> {
        let count = self.tree.visible_rows();
        let current = self.current_position();

        let origin = match origin {
            SeekOrigin::Bookmark(id) => SeekOrigin::from(id),
            other => other,
        };
        let base = match origin {
            SeekOrigin::Beginning => 0,
            SeekOrigin::Current => current,
            SeekOrigin::End => count,
            SeekOrigin::Bookmark(id) => self.bookmark_row(id)?,
        };

        let destination = to_i64(base).saturating_add(offset).clamp(0, to_i64(count));
        let destination = usize::try_from(destination).unwrap_or(0);
        self.cursor = self.tree.select(destination);

        Ok(to_i64(destination) - to_i64(current))
    }

    fn seek_id(&mut self, key: RowKey) -> Result<(), KeyTableError> {
        let idx = self.lookup(key)?;
        if self.tree.is_hidden(idx) {
            return Err(KeyTableError::NotFound);
        }
        self.cursor = Some(idx);
        Ok(())
    }

    fn next(&mut self) -> Option<RowKey> {
        self.cursor = self.cursor.and_then(|idx| self.tree.successor(idx));
        self.current_row()
    }

    fn prev(&mut self) -> Option<RowKey> {
        let prev = match self.cursor {
            None => self.tree.last(),
            Some(idx) => self.tree.predecessor(idx),
        };
        self.cursor = Some(prev.unwrap_or(SENTINEL));
        self.current_row()
    }

    fn query_rows(&mut self, count: usize, flags: QueryFlags) -> Vec<RowKey> {
        let original = self.cursor;
        let mut rows = Vec::with_capacity(count.min(self.tree.len()));

        if flags.backward {
            if self.cursor.is_none() {
                self.cursor = Some(self.tree.last().unwrap_or(SENTINEL));
            }
        } else if self.cursor == Some(SENTINEL) {
            self.cursor = self.tree.first();
        }

        while rows.len() < count {
            let Some(idx) = self.cursor.filter(|&idx| idx != SENTINEL) else {
                break;
            };
            if flags.show_hidden || !self.tree.is_hidden(idx) {
                rows.push(self.tree.key(idx));
            }
            self.cursor = if flags.backward {
                Some(self.tree.predecessor(idx).unwrap_or(SENTINEL))
            } else {
                self.tree.successor(idx)
            };
        }

        if flags.no_advance {
            self.cursor = original;
        }
        rows
    }

    fn previous_row_of(&self, key: RowKey) -> Result<Option<RowKey>, KeyTableError> {
        let idx = self.lookup(key)?;
        Ok(self.prev_visible_key(idx))
    }

    // ------------------------------------------------------------------
    // Bookmarks
    // ------------------------------------------------------------------

    fn position_row(&self, position: Option<NodeIdx>) -> usize {
        position.map_or_else(|| self.tree.visible_rows(), |idx| self.tree.rank(idx))
    }

    fn bookmark_row(&self, id: BookmarkId) -> Result<usize, KeyTableError> {
        let bookmark = self.bookmarks.get(id)?;
        Ok(self.position_row(bookmark.position))
    }

    fn create_bookmark(&mut self) -> Result<BookmarkId, KeyTableError> {
        let bookmark = Bookmark {
            position: self.cursor,
            row: self.current_position(),
        };

        match self.bookmarks.create(bookmark) {
            Ok(id) => {
                tracing::debug!("bookmark {id} created at row {}", bookmark.row);
                Ok(id)
            }
            Err(e) => {
                tracing::warn!(
                    "cannot create bookmark, {} already in use: {e}",
                    self.bookmarks.len()
                );
                Err(e)
            }
        }
    }

    fn get_bookmark(&self, id: BookmarkId) -> Result<BookmarkPosition, KeyTableError> {
        let bookmark = self.bookmarks.get(id)?;
        let row = self.position_row(bookmark.position);

        if row == bookmark.row {
            Ok(BookmarkPosition::Unchanged(row))
        } else {
            Ok(BookmarkPosition::PositionChanged(row))
        }
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    /// Rows after `header` that share its vector as a prefix, in order.
    fn prefix_followers(&self, header: NodeIdx) -> Vec<NodeIdx> {
        let prefix = self.tree.cols(header);
        let mut rows = Vec::new();
        let mut current = self.tree.successor(header);

        while let Some(idx) = current {
            if !shares_prefix(prefix, self.tree.cols(idx)) {
                break;
            }
            rows.push(idx);
            current = self.tree.successor(idx);
        }
        rows
    }

    fn rows_with_prefix(&self, header: RowKey) -> Result<Vec<RowKey>, KeyTableError> {
        let idx = self.lookup(header)?;
        let mut rows = vec![header];
        rows.extend(
            self.prefix_followers(idx)
                .into_iter()
                .map(|row| self.tree.key(row)),
        );
        Ok(rows)
    }

    fn hide_rows(&mut self, header: RowKey) -> Result<Vec<RowKey>, KeyTableError> {
        let idx = self.lookup(header)?;

        let mut hidden = Vec::new();
        for row in self.prefix_followers(idx) {
            if self.tree.set_hidden(row, true) {
                hidden.push(self.tree.key(row));
            }
        }

        if let Some(cursor) = self.cursor.filter(|&c| c != SENTINEL) {
            if self.tree.is_hidden(cursor) {
                self.cursor = self.tree.next_visible(cursor);
            }
        }

        tracing::debug!("category {header} collapsed, {} row(s) hidden", hidden.len());
        Ok(hidden)
    }

    fn unhide_rows(&mut self, header: RowKey) -> Result<Vec<RowKey>, KeyTableError> {
        let idx = self.lookup(header)?;
        if self.tree.is_hidden(idx) {
            return Err(KeyTableError::NotFound);
        }

        let followers = self.prefix_followers(idx);
        let Some(&first) = followers.first() else {
            return Ok(Vec::new());
        };
        let depth = self.tree.cols(first).len();

        let mut shown = Vec::new();
        for row in followers {
            if self.tree.cols(row).len() == depth && self.tree.set_hidden(row, false) {
                shown.push(self.tree.key(row));
            }
        }

        tracing::debug!("category {header} expanded, {} row(s) shown", shown.len());
        Ok(shown)
    }

    // ------------------------------------------------------------------
    // Lookup by value
    // ------------------------------------------------------------------

    fn lower_bound(&mut self, cols: &[SortColumn]) -> Option<RowKey> {
        let found = self.tree.lower_bound(cols).and_then(|idx| {
            if self.tree.is_hidden(idx) {
                self.tree.next_visible(idx)
            } else {
                Some(idx)
            }
        });

        self.cursor = found;
        found.map(|idx| self.tree.key(idx))
    }

    fn find_exact(&self, cols: &[SortColumn]) -> Result<RowKey, KeyTableError> {
        let mut current = self.tree.lower_bound(cols);

        while let Some(idx) = current {
            if !compare_rows(self.tree.cols(idx), cols).is_eq() {
                break;
            }
            if !self.tree.is_hidden(idx) {
                return Ok(self.tree.key(idx));
            }
            current = self.tree.successor(idx);
        }
        Err(KeyTableError::NotFound)
    }

    // ------------------------------------------------------------------
    // Verification
    // ------------------------------------------------------------------

    #[cfg(test)]
    fn validate(&self) -> Result<(), String> {
        self.tree.validate()?;

        if self.id_index.len() != self.tree.len() {
            return Err(format!(
                "index has {} entries for {} rows",
                self.id_index.len(),
                self.tree.len()
            ));
        }
        for (key, &idx) in &self.id_index {
            if idx == SENTINEL || self.tree.key(idx) != *key {
                return Err(format!("index entry {key} points at the wrong slot"));
            }
        }

        let is_live = |idx: NodeIdx| {
            idx == SENTINEL || self.id_index.get(&self.tree.key(idx)) == Some(&idx)
        };
        if let Some(cursor) = self.cursor {
            if !is_live(cursor) {
                return Err("cursor points at a freed slot".to_string());
            }
        }
        for position in self.bookmarks.positions().flatten() {
            if !is_live(position) {
                return Err("bookmark points at a freed slot".to_string());
            }
        }
        Ok(())
    }
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
