//! Value types shared by the encoder, the comparator and the table.

mod bookmark;
mod row_key;
mod seek;
mod sort_column;
mod update;

pub use bookmark::{BookmarkId, BookmarkPosition};
pub use row_key::RowKey;
pub use seek::{QueryFlags, SeekOrigin};
pub use sort_column::{SortColumn, SortVector};
pub use update::{RowUpdate, UpdateKind};
