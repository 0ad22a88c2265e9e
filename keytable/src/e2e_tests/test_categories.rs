//! Collapsing and expanding categories by sort-vector prefix.

use crate::e2e_tests::helpers::{add, ids, new_table, visible_ids};
use crate::{KeyTable, KeyTableError, QueryFlags, RowKey, SeekOrigin};

/// Two categories with two members each, plus a nested sub-category:
///
/// ```text
/// 1  [1]
/// 11 [1, 1]
/// 12 [1, 2]
/// 2  [2]
/// 21 [2, 1]
/// 211 [2, 1, 1]
/// 22 [2, 2]
/// ```
fn categorized() -> KeyTable {
    let table = new_table();
    add(&table, 1, &[1]);
    add(&table, 11, &[1, 1]);
    add(&table, 12, &[1, 2]);
    add(&table, 2, &[2]);
    add(&table, 21, &[2, 1]);
    add(&table, 211, &[2, 1, 1]);
    add(&table, 22, &[2, 2]);
    table
}

#[test]
fn test_rows_with_prefix() {
    let table = categorized();
    let rows = table.rows_with_prefix(RowKey::object(2)).expect("prefix");
    assert_eq!(ids(&rows), vec![2, 21, 211, 22]);

    let rows = table.rows_with_prefix(RowKey::object(12)).expect("prefix");
    assert_eq!(ids(&rows), vec![12]);

    assert_eq!(
        table.rows_with_prefix(RowKey::object(99)),
        Err(KeyTableError::NotFound)
    );
}

#[test]
fn test_hide_then_unhide_restores_count_and_order() {
    let table = categorized();
    let before = visible_ids(&table);

    let hidden = table.hide_rows(RowKey::object(1)).expect("hide");
    assert_eq!(ids(&hidden), vec![11, 12]);
    assert_eq!(table.row_count(), 5);
    assert_eq!(visible_ids(&table), vec![1, 2, 21, 211, 22]);

    let shown = table.unhide_rows(RowKey::object(1)).expect("unhide");
    assert_eq!(ids(&shown), vec![11, 12]);
    assert_eq!(table.row_count(), 7);
    assert_eq!(visible_ids(&table), before);
    table.validate().expect("valid");
}

#[test]
fn test_unhide_expands_one_level() {
    let table = categorized();
    table.hide_rows(RowKey::object(2)).expect("hide");
    assert_eq!(table.row_count(), 4);

    let shown = table.unhide_rows(RowKey::object(2)).expect("unhide");
    assert_eq!(ids(&shown), vec![21, 22]);
    assert_eq!(visible_ids(&table), vec![1, 11, 12, 2, 21, 22]);

    let shown = table.unhide_rows(RowKey::object(21)).expect("unhide");
    assert_eq!(ids(&shown), vec![211]);
    assert_eq!(table.row_count(), 7);
}

#[test]
fn test_unhide_under_hidden_header_fails() {
    let table = categorized();
    table.hide_rows(RowKey::object(2)).expect("hide");
    assert_eq!(
        table.unhide_rows(RowKey::object(21)),
        Err(KeyTableError::NotFound)
    );
}

#[test]
fn test_hide_is_idempotent() {
    let table = categorized();
    table.hide_rows(RowKey::object(1)).expect("hide");
    let again = table.hide_rows(RowKey::object(1)).expect("hide");
    assert!(again.is_empty());
    assert_eq!(table.row_count(), 5);
}

#[test]
fn test_hide_moves_cursor_off_hidden_row() {
    let table = categorized();
    table.seek_id(RowKey::object(12)).expect("seek_id");
    table.hide_rows(RowKey::object(1)).expect("hide");
    assert_eq!(table.current_row(), Some(RowKey::object(2)));
    assert_eq!(table.current_position(), 1);
}

#[test]
fn test_hidden_rows_visible_with_show_hidden() {
    let table = categorized();
    table.hide_rows(RowKey::object(2)).expect("hide");
    table.seek_row(SeekOrigin::Beginning, 0).expect("seek");

    let visible = table.query_rows(10, QueryFlags::forward().no_advance());
    assert_eq!(ids(&visible), vec![1, 11, 12, 2]);

    let all = table.query_rows(10, QueryFlags::forward().show_hidden());
    assert_eq!(ids(&all), vec![1, 11, 12, 2, 21, 211, 22]);
}

#[test]
fn test_new_row_in_collapsed_category_can_start_hidden() {
    let table = categorized();
    table.hide_rows(RowKey::object(1)).expect("hide");
    table
        .update_row(
            crate::UpdateKind::Add,
            RowKey::object(13),
            crate::testing::u32_cols(&[1, 3]),
            true,
        )
        .expect("add");
    assert_eq!(table.row_count(), 5);

    let shown = table.unhide_rows(RowKey::object(1)).expect("unhide");
    assert_eq!(ids(&shown), vec![11, 12, 13]);
}

#[test]
fn test_seek_id_on_hidden_row_fails() {
    let table = categorized();
    table.hide_rows(RowKey::object(1)).expect("hide");
    assert_eq!(
        table.seek_id(RowKey::object(11)),
        Err(KeyTableError::NotFound)
    );
}
