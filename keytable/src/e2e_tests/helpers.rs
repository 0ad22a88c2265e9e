//! Common helpers for end-to-end tests.

use crate::encoding::{PropValue, SortKeyEncoder};
use crate::testing::{init_tracing, u32_cols};
use crate::{
    KeyTable, QueryFlags, RowKey, RowUpdate, SeekOrigin, SortColumn, SortVector, UpdateKind,
};

/// Create an empty table with test logging enabled.
#[must_use]
pub fn new_table() -> KeyTable {
    init_tracing();
    KeyTable::new()
}

/// Create a table holding one single-level row per value, keyed by the value.
#[must_use]
pub fn table_with(values: &[u32]) -> KeyTable {
    let table = new_table();
    for &v in values {
        add(&table, v, &[v]);
    }
    table
}

/// Add a visible row with ascending `u32` levels.
pub fn add(table: &KeyTable, id: u32, values: &[u32]) -> RowUpdate {
    add_cols(table, id, u32_cols(values))
}

/// Add a visible row with an explicit sort vector.
#[allow(clippy::expect_used)]
pub fn add_cols(table: &KeyTable, id: u32, cols: SortVector) -> RowUpdate {
    table
        .update_row(UpdateKind::Add, RowKey::object(id), cols, false)
        .expect("add should succeed")
}

/// Delete a row.
#[allow(clippy::expect_used)]
pub fn delete(table: &KeyTable, id: u32) -> RowUpdate {
    table
        .update_row(UpdateKind::Delete, RowKey::object(id), Vec::new(), false)
        .expect("delete should succeed")
}

/// A single descending `u32` level.
#[must_use]
pub fn desc(value: u32) -> SortVector {
    vec![SortColumn::u32(value).with_descending(true)]
}

/// Object ids of every visible row, in order. Leaves the cursor on the
/// first visible row.
#[must_use]
#[allow(clippy::expect_used)]
pub fn visible_ids(table: &KeyTable) -> Vec<u32> {
    table
        .seek_row(SeekOrigin::Beginning, 0)
        .expect("seek should succeed");
    ids(&table.query_rows(usize::MAX, QueryFlags::forward().no_advance()))
}

/// Object ids of a page of rows.
#[must_use]
pub fn ids(rows: &[RowKey]) -> Vec<u32> {
    rows.iter().map(|key| key.object_id).collect()
}

/// Encode one row from typed values, all ascending.
#[must_use]
#[allow(clippy::expect_used)]
pub fn encode(values: &[PropValue]) -> SortVector {
    let encoder = SortKeyEncoder::new();
    encoder
        .encode_all(values.iter().map(|v| (v, false)))
        .expect("values should be encodable")
}
