//! Row mutation kinds and results.

use crate::types::RowKey;

/// The kind of change applied to a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// Insert a new row.
    Add,
    /// Replace the sort vector of an existing row.
    Modify,
    /// Remove a row.
    Delete,
}

/// The outcome of a row mutation.
///
/// `action` is what the table actually did, which can differ from what was
/// requested: an `Add` of a present key is applied as `Modify`, and a
/// `Modify` of an absent key is applied as `Add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowUpdate {
    /// Nearest visible row before the affected row, or `None` if it is first.
    pub prev: Option<RowKey>,
    /// The action actually performed.
    pub action: UpdateKind,
}
