//! Bookmark lifecycle and position tracking.

use crate::config::KeyTableConfig;
use crate::e2e_tests::helpers::{add, delete, table_with};
use crate::{BookmarkId, BookmarkPosition, KeyTable, KeyTableError, RowKey, SeekOrigin};

#[test]
fn test_bookmark_capacity_is_enforced() {
    let table = KeyTable::with_config(KeyTableConfig::default().with_max_bookmarks(3));
    let ids: Vec<BookmarkId> = (0..3)
        .map(|_| table.create_bookmark().expect("bookmark"))
        .collect();
    assert_eq!(ids, vec![BookmarkId(3), BookmarkId(4), BookmarkId(5)]);

    assert_eq!(
        table.create_bookmark(),
        Err(KeyTableError::UnableToComplete)
    );

    table.free_bookmark(ids[1]).expect("free");
    assert_eq!(table.create_bookmark(), Ok(BookmarkId(6)));
}

#[test]
fn test_default_capacity() {
    let table = table_with(&[1]);
    for _ in 0..KeyTableConfig::DEFAULT_MAX_BOOKMARKS {
        table.create_bookmark().expect("bookmark");
    }
    assert_eq!(
        table.create_bookmark(),
        Err(KeyTableError::UnableToComplete)
    );
}

#[test]
fn test_bookmark_reports_position_change() {
    let table = table_with(&[10, 20, 30, 40]);
    table.seek_id(RowKey::object(30)).expect("seek_id");
    let id = table.create_bookmark().expect("bookmark");
    assert_eq!(table.get_bookmark(id), Ok(BookmarkPosition::Unchanged(2)));

    delete(&table, 10);
    let position = table.get_bookmark(id).expect("get");
    assert!(position.has_moved());
    assert_eq!(position.row(), 1);

    add(&table, 5, &[5]);
    assert_eq!(table.get_bookmark(id), Ok(BookmarkPosition::Unchanged(2)));
}

#[test]
fn test_bookmark_on_deleted_row_is_invalid() {
    let table = table_with(&[1, 2, 3]);
    table.seek_id(RowKey::object(2)).expect("seek_id");
    let on_two = table.create_bookmark().expect("bookmark");
    table.seek_id(RowKey::object(3)).expect("seek_id");
    let on_three = table.create_bookmark().expect("bookmark");

    delete(&table, 2);
    assert_eq!(
        table.get_bookmark(on_two),
        Err(KeyTableError::InvalidBookmark(on_two))
    );
    assert_eq!(
        table.get_bookmark(on_three),
        Ok(BookmarkPosition::PositionChanged(1))
    );
}

#[test]
fn test_seek_from_bookmark() {
    let table = table_with(&[1, 2, 3, 4, 5]);
    table.seek_id(RowKey::object(2)).expect("seek_id");
    let id = table.create_bookmark().expect("bookmark");

    table.seek_row(SeekOrigin::End, 0).expect("seek");
    assert_eq!(table.seek_row(SeekOrigin::Bookmark(id), 2), Ok(-2));
    assert_eq!(table.current_row(), Some(RowKey::object(4)));

    assert_eq!(table.seek_row(SeekOrigin::from(id), -10), Ok(-3));
    assert_eq!(table.current_row(), Some(RowKey::object(1)));
}

#[test]
fn test_bookmark_before_first_row() {
    let table = KeyTable::new();
    let id = table.create_bookmark().expect("bookmark");
    add(&table, 1, &[1]);
    assert_eq!(table.get_bookmark(id), Ok(BookmarkPosition::Unchanged(0)));
}

#[test]
fn test_bookmark_ids_survive_clear() {
    let table = table_with(&[1]);
    let first = table.create_bookmark().expect("bookmark");
    table.clear();
    let second = table.create_bookmark().expect("bookmark");
    assert!(second > first);
    assert_eq!(
        table.free_bookmark(first),
        Err(KeyTableError::InvalidBookmark(first))
    );
}
