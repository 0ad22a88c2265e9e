#![cfg_attr(test, allow(clippy::disallowed_methods))]

//! An in-memory sorted table with order-statistics paging.
//!
//! Rows are identified by a [`RowKey`] and ordered by a [`SortVector`], one
//! binary [`SortColumn`] per sort level. The table keeps rows in a balanced
//! tree that counts visible rows per subtree, so cursor seeks by row number,
//! row-number lookups and bookmark resolution are all logarithmic.
//!
//! Components:
//!  - [`encoding`]: typed values to comparable sort columns
//!  - [`compare`]: the row comparator
//!  - [`KeyTable`]: the table, its cursor, bookmarks and categories
//!  - [`config`]: limits, loadable from the environment

pub mod compare;
pub mod config;
pub mod encoding;
mod table;
pub mod types;

mod e2e_tests;

pub use compare::{compare_rows, same_position, shares_prefix};
pub use config::{ConfigError, KeyTableConfig};
pub use table::{KeyTable, KeyTableError};
pub use types::{
    BookmarkId, BookmarkPosition, QueryFlags, RowKey, RowUpdate, SeekOrigin, SortColumn,
    SortVector, UpdateKind,
};
