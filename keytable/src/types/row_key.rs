//! Row identity.
//!
//! A row is identified by the object it was generated from plus an order id
//! that distinguishes the rows one multi-valued property expands into.

use std::fmt;

/// Identifies one row in a [`KeyTable`](crate::KeyTable).
///
/// # Invariants
///
/// - Unique within one table instance. Uniqueness is the caller's
///   responsibility; the table treats a repeated key as an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RowKey {
    /// Id of the object the row was generated from.
    pub object_id: u32,
    /// Distinguishes rows generated from the same object.
    pub order_id: u32,
}

impl RowKey {
    /// Create a row key.
    #[must_use]
    pub const fn new(object_id: u32, order_id: u32) -> Self {
        Self {
            object_id,
            order_id,
        }
    }

    /// Create the key of a single-valued row (`order_id` 0).
    #[must_use]
    pub const fn object(object_id: u32) -> Self {
        Self::new(object_id, 0)
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.object_id, self.order_id)
    }
}

impl From<(u32, u32)> for RowKey {
    fn from((object_id, order_id): (u32, u32)) -> Self {
        Self::new(object_id, order_id)
    }
}
