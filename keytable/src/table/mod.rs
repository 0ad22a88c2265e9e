//! The sorted table engine: arena tree, bookmarks and the `KeyTable` facade.

mod bookmark;
mod error;
mod key_table;
mod node;
mod tree;

pub use error::KeyTableError;
pub use key_table::KeyTable;
