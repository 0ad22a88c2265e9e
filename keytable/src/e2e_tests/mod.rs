//! End-to-end tests through the public `KeyTable` API.
//!
//! Each test file covers one scenario with deterministic inputs.

#![cfg(test)]

mod helpers;

mod test_bookmarks;
mod test_categories;
mod test_concurrency;
mod test_cursor;
mod test_encoded_rows;
mod test_paging;
mod test_row_count;
mod test_sort_order;
