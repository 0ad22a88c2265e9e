//! Tree nodes.
//!
//! Nodes live in the tree's arena and refer to each other by index. The
//! arena owns every node; `parent`, `left` and `right` are navigation links
//! only.

use crate::types::{RowKey, SortVector};

/// Index of a node in the tree arena.
pub type NodeIdx = usize;

/// Arena slot of the root sentinel. Never freed.
pub const SENTINEL: NodeIdx = 0;

/// One row of the table.
///
/// # Invariants
///
/// - `height == 1 + max(height(left), height(right))`, hidden nodes included
/// - `visible_count == !hidden + visible_count(left) + visible_count(right)`
/// - `is_left_child` is true iff `parent.left == Some(self)`
#[derive(Debug)]
pub struct TableRow {
    pub key: RowKey,
    pub cols: SortVector,
    pub hidden: bool,
    pub parent: Option<NodeIdx>,
    pub left: Option<NodeIdx>,
    pub right: Option<NodeIdx>,
    pub is_left_child: bool,
    pub height: u32,
    pub visible_count: usize,
}

impl TableRow {
    /// A freshly linked leaf.
    pub const fn leaf(
        key: RowKey,
        cols: SortVector,
        hidden: bool,
        parent: NodeIdx,
        is_left_child: bool,
    ) -> Self {
        Self {
            key,
            cols,
            hidden,
            parent: Some(parent),
            left: None,
            right: None,
            is_left_child,
            height: 1,
            visible_count: if hidden { 0 } else { 1 },
        }
    }

    /// The root sentinel. Hidden so it never contributes to a row count.
    pub const fn sentinel() -> Self {
        Self {
            key: RowKey::new(0, 0),
            cols: Vec::new(),
            hidden: true,
            parent: None,
            left: None,
            right: None,
            is_left_child: false,
            height: 0,
            visible_count: 0,
        }
    }

    /// An unused arena slot waiting on the free list.
    pub const fn vacant() -> Self {
        Self::sentinel()
    }

    /// 1 for a visible row, 0 for a hidden one.
    pub const fn self_count(&self) -> usize {
        if self.hidden { 0 } else { 1 }
    }
}
