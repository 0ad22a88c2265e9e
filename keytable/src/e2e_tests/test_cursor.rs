//! Cursor seeks, row-id seeks and cursor repair on delete.

use crate::e2e_tests::helpers::{add, delete, new_table, table_with};
use crate::{KeyTableError, RowKey, SeekOrigin, UpdateKind};

#[test]
fn test_seek_beginning_lands_on_rank() {
    let values: Vec<u32> = (0..100).map(|v| (v * 37) % 100).collect();
    let table = table_with(&values);

    for i in 0..100u32 {
        table
            .seek_row(SeekOrigin::Beginning, i64::from(i))
            .expect("seek");
        assert_eq!(table.current_row(), Some(RowKey::object(i)));
        assert_eq!(table.current_position(), i as usize);
    }
}

#[test]
fn test_seek_id_round_trip() {
    let table = new_table();
    for id in [40, 10, 30, 20] {
        add(&table, id, &[id]);
        table.seek_id(RowKey::object(id)).expect("seek_id");
        assert_eq!(table.current_row(), Some(RowKey::object(id)));
    }
    table.seek_id(RowKey::object(30)).expect("seek_id");
    assert_eq!(table.current_position(), 2);
}

#[test]
fn test_delete_last_row_under_cursor_moves_to_new_last() {
    let table = table_with(&[1, 2, 3]);
    table.seek_row(SeekOrigin::End, -1).expect("seek");
    assert_eq!(table.current_row(), Some(RowKey::object(3)));

    let update = delete(&table, 3);
    assert_eq!(update.prev, Some(RowKey::object(2)));
    assert_eq!(table.current_row(), Some(RowKey::object(2)));
    assert_eq!(table.current_position(), 1);
}

#[test]
fn test_delete_row_under_cursor_moves_to_next() {
    let table = table_with(&[1, 2, 3]);
    table.seek_id(RowKey::object(2)).expect("seek_id");
    delete(&table, 2);
    assert_eq!(table.current_row(), Some(RowKey::object(3)));
}

#[test]
fn test_delete_only_row_puts_cursor_before_first() {
    let table = table_with(&[1]);
    table.seek_id(RowKey::object(1)).expect("seek_id");
    delete(&table, 1);
    assert_eq!(table.current_row(), None);
    assert_eq!(table.current_position(), 0);
    assert_eq!(table.row_count(), 0);

    add(&table, 5, &[5]);
    assert_eq!(table.next(), Some(RowKey::object(5)));
}

#[test]
fn test_delete_elsewhere_keeps_cursor_row() {
    let table = table_with(&[1, 2, 3, 4]);
    table.seek_id(RowKey::object(3)).expect("seek_id");
    delete(&table, 1);
    assert_eq!(table.current_row(), Some(RowKey::object(3)));
    assert_eq!(table.current_position(), 1);
}

#[test]
fn test_seek_current_is_relative() {
    let table = table_with(&[1, 2, 3, 4, 5]);
    table.seek_row(SeekOrigin::Beginning, 1).expect("seek");
    assert_eq!(table.seek_row(SeekOrigin::Current, 2), Ok(2));
    assert_eq!(table.current_row(), Some(RowKey::object(4)));
    assert_eq!(table.seek_row(SeekOrigin::Current, -3), Ok(-3));
    assert_eq!(table.current_row(), Some(RowKey::object(1)));
}

#[test]
fn test_seek_on_empty_table() {
    let table = new_table();
    assert_eq!(table.seek_row(SeekOrigin::End, -5), Ok(0));
    assert_eq!(table.seek_row(SeekOrigin::Beginning, 5), Ok(0));
    assert_eq!(table.current_row(), None);
}

#[test]
fn test_seek_id_unknown_row() {
    let table = table_with(&[1]);
    assert_eq!(
        table.seek_id(RowKey::object(2)),
        Err(KeyTableError::NotFound)
    );
    assert_eq!(
        table.update_row(UpdateKind::Delete, RowKey::object(2), Vec::new(), false),
        Err(KeyTableError::NotFound)
    );
}
