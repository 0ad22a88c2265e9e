//! Rows come out in sort-vector order.

use crate::e2e_tests::helpers::{add, add_cols, desc, new_table, table_with, visible_ids};
use crate::{SortColumn, UpdateKind};

#[test]
fn test_ascending_single_level() {
    let table = table_with(&[3, 1, 2]);
    assert_eq!(visible_ids(&table), vec![1, 2, 3]);
}

#[test]
fn test_descending_single_level() {
    let table = new_table();
    for v in [3, 1, 2] {
        add_cols(&table, v, desc(v));
    }
    assert_eq!(visible_ids(&table), vec![3, 2, 1]);
}

#[test]
fn test_secondary_level_breaks_ties() {
    let table = new_table();
    add(&table, 1, &[2, 9]);
    add(&table, 2, &[1, 5]);
    add(&table, 3, &[2, 1]);
    add(&table, 4, &[1, 7]);
    assert_eq!(visible_ids(&table), vec![2, 4, 3, 1]);
}

#[test]
fn test_mixed_directions() {
    let table = new_table();
    let row = |a: u32, b: u32| {
        vec![
            SortColumn::u32(a),
            SortColumn::u32(b).with_descending(true),
        ]
    };
    add_cols(&table, 1, row(1, 1));
    add_cols(&table, 2, row(1, 3));
    add_cols(&table, 3, row(0, 0));
    add_cols(&table, 4, row(1, 2));
    assert_eq!(visible_ids(&table), vec![3, 2, 4, 1]);
}

#[test]
fn test_header_sorts_before_its_members() {
    let table = new_table();
    add(&table, 10, &[5, 1]);
    add(&table, 11, &[5, 0]);
    add(&table, 1, &[5]);
    add(&table, 2, &[4]);
    assert_eq!(visible_ids(&table), vec![2, 1, 11, 10]);
}

#[test]
fn test_equal_vectors_keep_arrival_order() {
    let table = new_table();
    for id in [7, 3, 9, 1] {
        add(&table, id, &[0]);
    }
    assert_eq!(visible_ids(&table), vec![7, 3, 9, 1]);
}

#[test]
fn test_modify_moves_row() {
    let table = table_with(&[1, 2, 3, 4]);
    let update = table
        .update_row(
            UpdateKind::Modify,
            crate::RowKey::object(1),
            vec![SortColumn::u32(10)],
            false,
        )
        .expect("modify");
    assert_eq!(update.prev, Some(crate::RowKey::object(4)));
    assert_eq!(visible_ids(&table), vec![2, 3, 4, 1]);
    table.validate().expect("valid");
}

#[test]
fn test_modify_with_identical_vector_is_idempotent() {
    let table = table_with(&[5, 6, 7]);
    let before = visible_ids(&table);
    for _ in 0..3 {
        let update = table
            .update_row(
                UpdateKind::Modify,
                crate::RowKey::object(6),
                vec![SortColumn::u32(6)],
                false,
            )
            .expect("modify");
        assert_eq!(update.action, UpdateKind::Modify);
        assert_eq!(update.prev, Some(crate::RowKey::object(5)));
    }
    assert_eq!(visible_ids(&table), before);
    assert_eq!(table.row_count(), 3);
}
