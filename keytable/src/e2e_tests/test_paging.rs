//! Paging through a table with `query_rows`.

use crate::e2e_tests::helpers::{ids, table_with};
use crate::{QueryFlags, RowKey, SeekOrigin, SortColumn};

#[test]
fn test_forward_pages_cover_table_once() {
    let values: Vec<u32> = (0..1_000).rev().collect();
    let table = table_with(&values);

    let mut seen = Vec::new();
    loop {
        let page = table.query_rows(64, QueryFlags::forward());
        if page.is_empty() {
            break;
        }
        seen.extend(ids(&page));
    }
    assert_eq!(seen, (0..1_000).collect::<Vec<u32>>());
    assert_eq!(table.current_row(), None);
}

#[test]
fn test_backward_pages_from_end() {
    let table = table_with(&[1, 2, 3, 4, 5, 6, 7]);
    table.seek_row(SeekOrigin::End, 0).expect("seek");

    let page = table.query_rows(3, QueryFlags::forward().backward());
    assert_eq!(ids(&page), vec![7, 6, 5]);
    let page = table.query_rows(3, QueryFlags::forward().backward());
    assert_eq!(ids(&page), vec![4, 3, 2]);
    let page = table.query_rows(3, QueryFlags::forward().backward());
    assert_eq!(ids(&page), vec![1]);
    assert!(
        table
            .query_rows(3, QueryFlags::forward().backward())
            .is_empty()
    );
}

#[test]
fn test_query_from_middle_then_seek_back() {
    let table = table_with(&[10, 20, 30, 40, 50]);
    table.seek_row(SeekOrigin::Beginning, 2).expect("seek");
    assert_eq!(ids(&table.query_rows(2, QueryFlags::forward())), vec![30, 40]);
    assert_eq!(table.current_row(), Some(RowKey::object(50)));

    assert_eq!(table.seek_row(SeekOrigin::Current, -2), Ok(-2));
    assert_eq!(table.current_row(), Some(RowKey::object(30)));
}

#[test]
fn test_zero_count_query_returns_nothing() {
    let table = table_with(&[1, 2]);
    table.seek_row(SeekOrigin::Beginning, 1).expect("seek");
    assert!(table.query_rows(0, QueryFlags::forward()).is_empty());
    assert_eq!(table.current_row(), Some(RowKey::object(2)));
}

#[test]
fn test_jump_to_value_then_page() {
    let table = table_with(&[5, 15, 25, 35, 45]);
    let found = table.lower_bound(&[SortColumn::u32(20)]);
    assert_eq!(found, Some(RowKey::object(25)));
    assert_eq!(table.current_position(), 2);
    assert_eq!(ids(&table.query_rows(2, QueryFlags::forward())), vec![25, 35]);
}

#[test]
fn test_previous_row_of_tracks_visible_rows() {
    let table = table_with(&[1, 2, 3]);
    assert_eq!(
        table.previous_row_of(RowKey::object(3)),
        Ok(Some(RowKey::object(2)))
    );
    assert_eq!(table.previous_row_of(RowKey::object(1)), Ok(None));
}
