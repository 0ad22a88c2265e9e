//! Reference model of a table.
//!
//! A plain sorted `Vec` with linear scans everywhere. Slow, but simple enough
//! to trust; the simulator checks the real table against it after every
//! operation.

// Simulation code legitimately needs cloning for test data
#![allow(clippy::disallowed_methods)]

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::compare::{compare_rows, same_position, shares_prefix};
use crate::simulation::op_gen::TableOp;
use crate::table::KeyTableError;
use crate::types::{
    BookmarkId, BookmarkPosition, QueryFlags, RowKey, RowUpdate, SeekOrigin, SortColumn,
    SortVector, UpdateKind,
};

/// The observable result of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Update(Result<RowUpdate, KeyTableError>),
    Moved(Result<i64, KeyTableError>),
    Unit(Result<(), KeyTableError>),
    Row(Option<RowKey>),
    Rows(Vec<RowKey>),
    Found(Result<RowKey, KeyTableError>),
    Bookmark(Result<BookmarkId, KeyTableError>),
    Position(Result<BookmarkPosition, KeyTableError>),
    Category(Result<Vec<RowKey>, KeyTableError>),
    Cleared,
}

#[derive(Debug, Clone)]
struct ModelRow {
    key: RowKey,
    cols: SortVector,
    hidden: bool,
}

/// Cursor position, tracked by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelCursor {
    BeforeFirst,
    On(RowKey),
    PastEnd,
}

#[derive(Debug, Clone, Copy)]
struct ModelBookmark {
    position: ModelCursor,
    row: usize,
}

/// Sorted-vector model of a `KeyTable`.
#[derive(Debug)]
pub struct ReferenceModel {
    rows: Vec<ModelRow>,
    cursor: ModelCursor,
    bookmarks: BTreeMap<BookmarkId, ModelBookmark>,
    next_bookmark: u32,
    max_bookmarks: usize,
}

impl ReferenceModel {
    /// Create an empty model.
    #[must_use]
    pub const fn new(max_bookmarks: usize) -> Self {
        Self {
            rows: Vec::new(),
            cursor: ModelCursor::BeforeFirst,
            bookmarks: BTreeMap::new(),
            next_bookmark: BookmarkId::FIRST_ALLOCATED.0,
            max_bookmarks,
        }
    }

    /// Apply an operation and return what the table should answer.
    pub fn apply(&mut self, op: &TableOp) -> Outcome {
        match op {
            TableOp::Add { key, cols, hidden } => {
                Outcome::Update(self.update(UpdateKind::Add, *key, cols.clone(), *hidden))
            }
            TableOp::Modify { key, cols } => {
                Outcome::Update(self.update(UpdateKind::Modify, *key, cols.clone(), false))
            }
            TableOp::Delete { key } => {
                Outcome::Update(self.update(UpdateKind::Delete, *key, Vec::new(), false))
            }
            TableOp::PartialUpdate {
                key,
                column_index,
                column,
            } => Outcome::Update(self.partial_update(*key, *column_index, column)),
            TableOp::Seek { origin, offset } => Outcome::Moved(self.seek(*origin, *offset)),
            TableOp::SeekId { key } => Outcome::Unit(self.seek_id(*key)),
            TableOp::Query { count, flags } => Outcome::Rows(self.query(*count, *flags)),
            TableOp::Next => Outcome::Row(self.next()),
            TableOp::Prev => Outcome::Row(self.prev()),
            TableOp::CreateBookmark => Outcome::Bookmark(self.create_bookmark()),
            TableOp::GetBookmark { id } => Outcome::Position(self.get_bookmark(*id)),
            TableOp::FreeBookmark { id } => Outcome::Unit(
                self.bookmarks
                    .remove(id)
                    .map(|_| ())
                    .ok_or(KeyTableError::InvalidBookmark(*id)),
            ),
            TableOp::Hide { header } => Outcome::Category(self.hide(*header)),
            TableOp::Unhide { header } => Outcome::Category(self.unhide(*header)),
            TableOp::LowerBound { cols } => Outcome::Row(self.lower_bound(cols)),
            TableOp::FindExact { cols } => Outcome::Found(self.find_exact(cols)),
            TableOp::Clear => {
                self.rows.clear();
                self.bookmarks.clear();
                self.cursor = ModelCursor::BeforeFirst;
                Outcome::Cleared
            }
        }
    }

    /// Every row in order with its hidden flag.
    #[must_use]
    pub fn rows(&self) -> Vec<(RowKey, bool)> {
        self.rows.iter().map(|r| (r.key, r.hidden)).collect()
    }

    /// Number of visible rows.
    #[must_use]
    pub fn visible_rows(&self) -> usize {
        self.rows.iter().filter(|r| !r.hidden).count()
    }

    /// Row under the cursor.
    #[must_use]
    pub const fn current_row(&self) -> Option<RowKey> {
        match self.cursor {
            ModelCursor::On(key) => Some(key),
            ModelCursor::BeforeFirst | ModelCursor::PastEnd => None,
        }
    }

    /// Visible rows before the cursor.
    #[must_use]
    pub fn current_position(&self) -> usize {
        self.position_row(self.cursor)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn index_of(&self, key: RowKey) -> Option<usize> {
        self.rows.iter().position(|r| r.key == key)
    }

    fn visible_before(&self, index: usize) -> usize {
        self.rows[..index].iter().filter(|r| !r.hidden).count()
    }

    fn position_row(&self, position: ModelCursor) -> usize {
        match position {
            ModelCursor::BeforeFirst => 0,
            ModelCursor::On(key) => self.index_of(key).map_or(0, |i| self.visible_before(i)),
            ModelCursor::PastEnd => self.visible_rows(),
        }
    }

    fn prev_visible(&self, index: usize) -> Option<RowKey> {
        self.rows[..index].iter().rev().find(|r| !r.hidden).map(|r| r.key)
    }

    fn next_visible(&self, index: usize) -> Option<RowKey> {
        self.rows[index + 1..].iter().find(|r| !r.hidden).map(|r| r.key)
    }

    fn nth_visible(&self, n: usize) -> ModelCursor {
        self.rows
            .iter()
            .filter(|r| !r.hidden)
            .nth(n)
            .map_or(ModelCursor::PastEnd, |r| ModelCursor::On(r.key))
    }

    fn insert_sorted(&mut self, row: ModelRow) -> usize {
        let index = self
            .rows
            .partition_point(|r| compare_rows(&row.cols, &r.cols) != Ordering::Less);
        self.rows.insert(index, row);
        index
    }

    /// Remove a row, moving the cursor off it and dropping its bookmarks.
    fn remove_at(&mut self, index: usize) -> ModelRow {
        let key = self.rows[index].key;
        if self.cursor == ModelCursor::On(key) {
            self.cursor = self
                .next_visible(index)
                .or_else(|| self.prev_visible(index))
                .map_or(ModelCursor::BeforeFirst, ModelCursor::On);
        }
        self.bookmarks
            .retain(|_, b| b.position != ModelCursor::On(key));
        self.rows.remove(index)
    }

    fn lower_bound_index(&self, cols: &[SortColumn]) -> usize {
        self.rows
            .partition_point(|r| compare_rows(&r.cols, cols) == Ordering::Less)
    }

    /// Rows after `index` that share its vector as a prefix.
    fn followers(&self, index: usize) -> Vec<usize> {
        let prefix = &self.rows[index].cols;
        (index + 1..self.rows.len())
            .take_while(|&i| shares_prefix(prefix, &self.rows[i].cols))
            .collect()
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    fn update(
        &mut self,
        kind: UpdateKind,
        key: RowKey,
        cols: SortVector,
        hidden: bool,
    ) -> Result<RowUpdate, KeyTableError> {
        match (kind, self.index_of(key)) {
            (UpdateKind::Delete, Some(index)) => {
                let prev = self.prev_visible(index);
                self.remove_at(index);
                Ok(RowUpdate {
                    prev,
                    action: UpdateKind::Delete,
                })
            }
            (UpdateKind::Delete, None) => Err(KeyTableError::NotFound),
            (UpdateKind::Add | UpdateKind::Modify, Some(index)) => Ok(self.modify(index, cols)),
            (UpdateKind::Add | UpdateKind::Modify, None) => {
                let index = self.insert_sorted(ModelRow { key, cols, hidden });
                Ok(RowUpdate {
                    prev: self.prev_visible(index),
                    action: UpdateKind::Add,
                })
            }
        }
    }

    fn modify(&mut self, index: usize, cols: SortVector) -> RowUpdate {
        if same_position(&self.rows[index].cols, &cols) {
            self.rows[index].cols = cols;
            return RowUpdate {
                prev: self.prev_visible(index),
                action: UpdateKind::Modify,
            };
        }

        let cursor_on_row = self.cursor == ModelCursor::On(self.rows[index].key);
        let mut row = self.remove_at(index);
        row.cols = cols;
        let key = row.key;
        let index = self.insert_sorted(row);
        if cursor_on_row {
            self.cursor = ModelCursor::On(key);
        }
        RowUpdate {
            prev: self.prev_visible(index),
            action: UpdateKind::Modify,
        }
    }

    fn partial_update(
        &mut self,
        key: RowKey,
        column_index: usize,
        column: &SortColumn,
    ) -> Result<RowUpdate, KeyTableError> {
        let index = self.index_of(key).ok_or(KeyTableError::NotFound)?;
        let mut cols = self.rows[index].cols.clone();
        let slot = cols
            .get_mut(column_index)
            .ok_or(KeyTableError::InvalidParameter("column index out of range"))?;
        *slot = column.clone();
        Ok(self.modify(index, cols))
    }

    fn seek(&mut self, origin: SeekOrigin, offset: i64) -> Result<i64, KeyTableError> {
        let count = self.visible_rows();
        let current = self.current_position();
        let origin = match origin {
            SeekOrigin::Bookmark(id) => SeekOrigin::from(id),
            other => other,
        };
        let base = match origin {
            SeekOrigin::Beginning => 0,
            SeekOrigin::Current => current,
            SeekOrigin::End => count,
            SeekOrigin::Bookmark(id) => {
                let bookmark = self
                    .bookmarks
                    .get(&id)
                    .ok_or(KeyTableError::InvalidBookmark(id))?;
                self.position_row(bookmark.position)
            }
        };

        let count = i64::try_from(count).unwrap_or(i64::MAX);
        let base = i64::try_from(base).unwrap_or(i64::MAX);
        let current = i64::try_from(current).unwrap_or(i64::MAX);
        let destination = base.saturating_add(offset).clamp(0, count);
        self.cursor = self.nth_visible(usize::try_from(destination).unwrap_or(0));
        Ok(destination - current)
    }

    fn seek_id(&mut self, key: RowKey) -> Result<(), KeyTableError> {
        match self.index_of(key) {
            Some(index) if !self.rows[index].hidden => {
                self.cursor = ModelCursor::On(key);
                Ok(())
            }
            _ => Err(KeyTableError::NotFound),
        }
    }

    fn next(&mut self) -> Option<RowKey> {
        self.cursor = match self.cursor {
            ModelCursor::BeforeFirst => self
                .rows
                .first()
                .map_or(ModelCursor::PastEnd, |r| ModelCursor::On(r.key)),
            ModelCursor::On(key) => self
                .index_of(key)
                .and_then(|i| self.rows.get(i + 1))
                .map_or(ModelCursor::PastEnd, |r| ModelCursor::On(r.key)),
            ModelCursor::PastEnd => ModelCursor::PastEnd,
        };
        self.current_row()
    }

    fn prev(&mut self) -> Option<RowKey> {
        self.cursor = match self.cursor {
            ModelCursor::PastEnd => self
                .rows
                .last()
                .map_or(ModelCursor::BeforeFirst, |r| ModelCursor::On(r.key)),
            ModelCursor::On(key) => self
                .index_of(key)
                .and_then(|i| i.checked_sub(1))
                .map_or(ModelCursor::BeforeFirst, |i| ModelCursor::On(self.rows[i].key)),
            ModelCursor::BeforeFirst => ModelCursor::BeforeFirst,
        };
        self.current_row()
    }

    fn query(&mut self, count: usize, flags: QueryFlags) -> Vec<RowKey> {
        let original = self.cursor;
        let mut rows = Vec::new();

        if flags.backward {
            if self.cursor == ModelCursor::PastEnd {
                self.cursor = self
                    .rows
                    .last()
                    .map_or(ModelCursor::BeforeFirst, |r| ModelCursor::On(r.key));
            }
        } else if self.cursor == ModelCursor::BeforeFirst {
            self.cursor = self
                .rows
                .first()
                .map_or(ModelCursor::PastEnd, |r| ModelCursor::On(r.key));
        }

        while rows.len() < count {
            let ModelCursor::On(key) = self.cursor else {
                break;
            };
            let Some(i) = self.index_of(key) else {
                break;
            };
            if flags.show_hidden || !self.rows[i].hidden {
                rows.push(key);
            }
            self.cursor = if flags.backward {
                i.checked_sub(1)
                    .map_or(ModelCursor::BeforeFirst, |p| ModelCursor::On(self.rows[p].key))
            } else {
                self.rows
                    .get(i + 1)
                    .map_or(ModelCursor::PastEnd, |r| ModelCursor::On(r.key))
            };
        }

        if flags.no_advance {
            self.cursor = original;
        }
        rows
    }

    fn create_bookmark(&mut self) -> Result<BookmarkId, KeyTableError> {
        if self.bookmarks.len() >= self.max_bookmarks {
            return Err(KeyTableError::UnableToComplete);
        }
        let id = BookmarkId(self.next_bookmark);
        self.next_bookmark += 1;
        self.bookmarks.insert(
            id,
            ModelBookmark {
                position: self.cursor,
                row: self.current_position(),
            },
        );
        Ok(id)
    }

    fn get_bookmark(&self, id: BookmarkId) -> Result<BookmarkPosition, KeyTableError> {
        let bookmark = self
            .bookmarks
            .get(&id)
            .ok_or(KeyTableError::InvalidBookmark(id))?;
        let row = self.position_row(bookmark.position);
        if row == bookmark.row {
            Ok(BookmarkPosition::Unchanged(row))
        } else {
            Ok(BookmarkPosition::PositionChanged(row))
        }
    }

    fn hide(&mut self, header: RowKey) -> Result<Vec<RowKey>, KeyTableError> {
        let index = self.index_of(header).ok_or(KeyTableError::NotFound)?;
        let mut hidden = Vec::new();
        for i in self.followers(index) {
            if !self.rows[i].hidden {
                self.rows[i].hidden = true;
                hidden.push(self.rows[i].key);
            }
        }

        if let ModelCursor::On(key) = self.cursor {
            if let Some(i) = self.index_of(key).filter(|&i| self.rows[i].hidden) {
                self.cursor = self
                    .next_visible(i)
                    .map_or(ModelCursor::PastEnd, ModelCursor::On);
            }
        }
        Ok(hidden)
    }

    fn unhide(&mut self, header: RowKey) -> Result<Vec<RowKey>, KeyTableError> {
        let index = self.index_of(header).ok_or(KeyTableError::NotFound)?;
        if self.rows[index].hidden {
            return Err(KeyTableError::NotFound);
        }
        let followers = self.followers(index);
        let Some(&first) = followers.first() else {
            return Ok(Vec::new());
        };
        let depth = self.rows[first].cols.len();

        let mut shown = Vec::new();
        for i in followers {
            if self.rows[i].cols.len() == depth && self.rows[i].hidden {
                self.rows[i].hidden = false;
                shown.push(self.rows[i].key);
            }
        }
        Ok(shown)
    }

    fn lower_bound(&mut self, cols: &[SortColumn]) -> Option<RowKey> {
        let index = self.lower_bound_index(cols);
        let found = self.rows[index..].iter().find(|r| !r.hidden).map(|r| r.key);
        self.cursor = found.map_or(ModelCursor::PastEnd, ModelCursor::On);
        found
    }

    fn find_exact(&self, cols: &[SortColumn]) -> Result<RowKey, KeyTableError> {
        let index = self.lower_bound_index(cols);
        self.rows[index..]
            .iter()
            .take_while(|r| compare_rows(&r.cols, cols) == Ordering::Equal)
            .find(|r| !r.hidden)
            .map(|r| r.key)
            .ok_or(KeyTableError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::u32_cols;

    fn add(model: &mut ReferenceModel, id: u32, values: &[u32]) -> Outcome {
        model.apply(&TableOp::Add {
            key: RowKey::object(id),
            cols: u32_cols(values),
            hidden: false,
        })
    }

    #[test]
    fn test_equal_rows_keep_insertion_order() {
        let mut model = ReferenceModel::new(4);
        add(&mut model, 1, &[5]);
        add(&mut model, 2, &[5]);
        add(&mut model, 3, &[4]);
        let keys: Vec<u32> = model.rows().iter().map(|(k, _)| k.object_id).collect();
        assert_eq!(keys, vec![3, 1, 2]);
    }

    #[test]
    fn test_delete_under_cursor_moves_to_previous_when_last() {
        let mut model = ReferenceModel::new(4);
        add(&mut model, 1, &[1]);
        add(&mut model, 2, &[2]);
        model.apply(&TableOp::SeekId {
            key: RowKey::object(2),
        });
        model.apply(&TableOp::Delete {
            key: RowKey::object(2),
        });
        assert_eq!(model.current_row(), Some(RowKey::object(1)));
    }

    #[test]
    fn test_hide_then_unhide_restores_rows() {
        let mut model = ReferenceModel::new(4);
        add(&mut model, 1, &[7]);
        add(&mut model, 2, &[7, 1]);
        add(&mut model, 3, &[7, 2]);
        let header = RowKey::object(1);

        let hidden = model.apply(&TableOp::Hide { header });
        assert_eq!(
            hidden,
            Outcome::Category(Ok(vec![RowKey::object(2), RowKey::object(3)]))
        );
        assert_eq!(model.visible_rows(), 1);

        model.apply(&TableOp::Unhide { header });
        assert_eq!(model.visible_rows(), 3);
    }
}
