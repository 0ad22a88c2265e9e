//! Height-balanced order-statistics tree over sort vectors.
//!
//! Nodes are stored in an arena (`Vec<TableRow>`) and linked by index. Slot 0
//! holds a sentinel that sorts before every row; the real tree hangs off its
//! right link. Freed slots are recycled through a free list.
//!
//! Every node carries its subtree height (hidden nodes included) for
//! balancing and its visible row count (hidden nodes excluded) for rank
//! queries, so hidden rows keep the tree's shape but vanish from row numbers.
//!
//! # Rebalancing
//!
//! After a structural change every ancestor of the change point is visited
//! bottom-up. A node whose child heights differ by more than one is rotated
//! towards its lighter side: a single rotation when the heavy child leans the
//! same way or is balanced, a double rotation (through the child first) when
//! the heavy child leans the opposite way.

use std::cmp::Ordering;

use crate::compare::compare_rows;
use crate::table::node::{NodeIdx, SENTINEL, TableRow};
use crate::types::{RowKey, SortColumn, SortVector};

/// The table's tree. Knows nothing about cursors, ids or bookmarks.
///
/// # Invariants
///
/// - In-order traversal is non-decreasing under `compare_rows`.
/// - Every node's height and visible count match its children.
/// - Child heights of every node differ by at most one.
/// - `nodes.len() == len + free.len() + 1`
#[derive(Debug)]
pub struct RowTree {
    nodes: Vec<TableRow>,
    free: Vec<NodeIdx>,
    len: usize,
}

impl Default for RowTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RowTree {
    /// Create an empty tree holding only the sentinel.
    pub fn new() -> Self {
        Self {
            nodes: vec![TableRow::sentinel()],
            free: Vec::new(),
            len: 0,
        }
    }

    /// Number of rows, hidden ones included.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Number of visible rows.
    pub fn visible_rows(&self) -> usize {
        self.visible(self.root())
    }

    /// Key of a node.
    pub fn key(&self, idx: NodeIdx) -> RowKey {
        self.nodes[idx].key
    }

    /// Sort vector of a node.
    pub fn cols(&self, idx: NodeIdx) -> &[SortColumn] {
        &self.nodes[idx].cols
    }

    /// Whether a node is hidden. The sentinel counts as hidden.
    pub fn is_hidden(&self, idx: NodeIdx) -> bool {
        self.nodes[idx].hidden
    }

    /// Drop every row. Arena capacity is kept.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[SENTINEL] = TableRow::sentinel();
        self.free.clear();
        self.len = 0;
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Insert a row and rebalance. Equal vectors go after existing rows.
    ///
    /// # Post-conditions
    /// - The returned index refers to the new row.
    /// - Indices of all other rows are unchanged.
    pub fn insert(&mut self, key: RowKey, cols: SortVector, hidden: bool) -> NodeIdx {
        let mut parent = SENTINEL;
        let mut go_left = false;
        let mut current = self.root();

        while let Some(idx) = current {
            parent = idx;
            go_left = compare_rows(&cols, &self.nodes[idx].cols) == Ordering::Less;
            current = if go_left {
                self.nodes[idx].left
            } else {
                self.nodes[idx].right
            };
        }

        let idx = self.alloc(TableRow::leaf(key, cols, hidden, parent, go_left));
        if go_left {
            self.nodes[parent].left = Some(idx);
        } else {
            self.nodes[parent].right = Some(idx);
        }
        self.len += 1;

        self.retrace(parent);
        idx
    }

    /// Unlink a row, rebalance, and return its contents.
    ///
    /// A row with two children is replaced in place by its in-order
    /// predecessor, so indices of all other rows stay valid.
    ///
    /// # Pre-conditions
    /// - `idx` is a live row, not the sentinel.
    pub fn remove(&mut self, idx: NodeIdx) -> TableRow {
        debug_assert_ne!(idx, SENTINEL, "the sentinel is never removed");

        let (left, right, parent, is_left) = {
            let node = &self.nodes[idx];
            (
                node.left,
                node.right,
                node.parent.unwrap_or(SENTINEL),
                node.is_left_child,
            )
        };

        let retrace_from = match (left, right) {
            (None, None) => {
                self.set_child(parent, is_left, None);
                parent
            }
            (Some(child), None) | (None, Some(child)) => {
                self.set_child(parent, is_left, Some(child));
                parent
            }
            (Some(left), Some(right)) => {
                let pred = self.rightmost(left);
                if pred == left {
                    // The predecessor keeps its own left subtree.
                    self.set_child(pred, false, Some(right));
                    self.set_child(parent, is_left, Some(pred));
                    pred
                } else {
                    let pred_parent = self.nodes[pred].parent.unwrap_or(SENTINEL);
                    let pred_left = self.nodes[pred].left;
                    self.set_child(pred_parent, false, pred_left);
                    self.set_child(pred, true, Some(left));
                    self.set_child(pred, false, Some(right));
                    self.set_child(parent, is_left, Some(pred));
                    pred_parent
                }
            }
        };

        let row = self.release(idx);
        self.len -= 1;
        self.retrace(retrace_from);
        row
    }

    /// Swap a row's sort vector without moving it.
    ///
    /// # Pre-conditions
    /// - `cols` orders identically to the current vector.
    pub fn replace_cols(&mut self, idx: NodeIdx, cols: SortVector) -> SortVector {
        std::mem::replace(&mut self.nodes[idx].cols, cols)
    }

    /// Set a row's hidden flag and fix visible counts up to the root.
    ///
    /// Returns whether the flag changed.
    pub fn set_hidden(&mut self, idx: NodeIdx, hidden: bool) -> bool {
        if self.nodes[idx].hidden == hidden {
            return false;
        }
        self.nodes[idx].hidden = hidden;

        let mut current = idx;
        while current != SENTINEL {
            self.update_counters(current);
            current = self.nodes[current].parent.unwrap_or(SENTINEL);
        }
        true
    }

    // ------------------------------------------------------------------
    // Rank
    // ------------------------------------------------------------------

    /// Number of visible rows before `idx`. The sentinel has rank 0.
    pub fn rank(&self, idx: NodeIdx) -> usize {
        if idx == SENTINEL {
            return 0;
        }

        let mut rank = self.visible(self.nodes[idx].left);
        let mut current = idx;
        while let Some(parent) = self.nodes[current].parent {
            if parent == SENTINEL {
                break;
            }
            if !self.nodes[current].is_left_child {
                rank += self.visible(self.nodes[parent].left) + self.nodes[parent].self_count();
            }
            current = parent;
        }
        rank
    }

    /// The visible row with `rank` visible rows before it.
    ///
    /// Returns `None` when `rank >= visible_rows()`.
    pub fn select(&self, rank: usize) -> Option<NodeIdx> {
        let mut remaining = rank;
        let mut current = self.root();

        while let Some(idx) = current {
            let node = &self.nodes[idx];
            let left = self.visible(node.left);
            if remaining < left {
                current = node.left;
            } else if remaining == left && !node.hidden {
                return Some(idx);
            } else {
                remaining -= left + node.self_count();
                current = node.right;
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    /// First row in sort order, hidden or not.
    pub fn first(&self) -> Option<NodeIdx> {
        self.root().map(|root| self.leftmost(root))
    }

    /// Last row in sort order, hidden or not.
    pub fn last(&self) -> Option<NodeIdx> {
        self.root().map(|root| self.rightmost(root))
    }

    /// In-order successor. The successor of the sentinel is the first row.
    pub fn successor(&self, idx: NodeIdx) -> Option<NodeIdx> {
        if let Some(right) = self.nodes[idx].right {
            return Some(self.leftmost(right));
        }

        let mut current = idx;
        while let Some(parent) = self.nodes[current].parent {
            if self.nodes[current].is_left_child {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// In-order predecessor. The predecessor of the first row is the
    /// sentinel; the sentinel has none.
    pub fn predecessor(&self, idx: NodeIdx) -> Option<NodeIdx> {
        if let Some(left) = self.nodes[idx].left {
            return Some(self.rightmost(left));
        }

        let mut current = idx;
        while let Some(parent) = self.nodes[current].parent {
            if !self.nodes[current].is_left_child {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// First visible row after `idx`.
    pub fn next_visible(&self, idx: NodeIdx) -> Option<NodeIdx> {
        let mut current = self.successor(idx)?;
        while self.nodes[current].hidden {
            current = self.successor(current)?;
        }
        Some(current)
    }

    /// Last visible row before `idx`. Never returns the sentinel.
    pub fn prev_visible(&self, idx: NodeIdx) -> Option<NodeIdx> {
        let mut current = self.predecessor(idx)?;
        while self.nodes[current].hidden {
            if current == SENTINEL {
                return None;
            }
            current = self.predecessor(current)?;
        }
        Some(current)
    }

    /// First row, hidden or not, whose vector is not less than `cols`.
    pub fn lower_bound(&self, cols: &[SortColumn]) -> Option<NodeIdx> {
        let mut found = None;
        let mut current = self.root();

        while let Some(idx) = current {
            if compare_rows(&self.nodes[idx].cols, cols) == Ordering::Less {
                current = self.nodes[idx].right;
            } else {
                found = Some(idx);
                current = self.nodes[idx].left;
            }
        }
        found
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn root(&self) -> Option<NodeIdx> {
        self.nodes[SENTINEL].right
    }

    fn height(&self, idx: Option<NodeIdx>) -> u32 {
        idx.map_or(0, |i| self.nodes[i].height)
    }

    fn visible(&self, idx: Option<NodeIdx>) -> usize {
        idx.map_or(0, |i| self.nodes[i].visible_count)
    }

    fn leftmost(&self, mut idx: NodeIdx) -> NodeIdx {
        while let Some(left) = self.nodes[idx].left {
            idx = left;
        }
        idx
    }

    fn rightmost(&self, mut idx: NodeIdx) -> NodeIdx {
        while let Some(right) = self.nodes[idx].right {
            idx = right;
        }
        idx
    }

    fn alloc(&mut self, row: TableRow) -> NodeIdx {
        if let Some(idx) = self.free.pop() {
            self.nodes[idx] = row;
            idx
        } else {
            self.nodes.push(row);
            self.nodes.len() - 1
        }
    }

    fn release(&mut self, idx: NodeIdx) -> TableRow {
        self.free.push(idx);
        std::mem::replace(&mut self.nodes[idx], TableRow::vacant())
    }

    /// Link `child` as the left or right child of `parent`.
    fn set_child(&mut self, parent: NodeIdx, as_left: bool, child: Option<NodeIdx>) {
        if as_left {
            self.nodes[parent].left = child;
        } else {
            self.nodes[parent].right = child;
        }
        if let Some(c) = child {
            self.nodes[c].parent = Some(parent);
            self.nodes[c].is_left_child = as_left;
        }
    }

    fn update_counters(&mut self, idx: NodeIdx) {
        let (left, right) = (self.nodes[idx].left, self.nodes[idx].right);
        let height = 1 + self.height(left).max(self.height(right));
        let visible = self.nodes[idx].self_count() + self.visible(left) + self.visible(right);

        let node = &mut self.nodes[idx];
        node.height = height;
        node.visible_count = visible;
    }

    /// Fix counters and balance from `idx` up to the root.
    fn retrace(&mut self, mut idx: NodeIdx) {
        while idx != SENTINEL {
            self.update_counters(idx);
            let top = self.rebalance(idx);
            idx = self.nodes[top].parent.unwrap_or(SENTINEL);
        }
    }

    /// Restore balance at `idx`; returns the root of the resulting subtree.
    fn rebalance(&mut self, idx: NodeIdx) -> NodeIdx {
        let left = self.nodes[idx].left;
        let right = self.nodes[idx].right;
        let left_height = self.height(left);
        let right_height = self.height(right);

        if left_height > right_height + 1 {
            if let Some(child) = left {
                if self.height(self.nodes[child].left) < self.height(self.nodes[child].right) {
                    self.rotate_left(child);
                }
            }
            self.rotate_right(idx)
        } else if right_height > left_height + 1 {
            if let Some(child) = right {
                if self.height(self.nodes[child].right) < self.height(self.nodes[child].left) {
                    self.rotate_right(child);
                }
            }
            self.rotate_left(idx)
        } else {
            idx
        }
    }

    /// Rotate `idx` down to the left; its right child takes its place.
    fn rotate_left(&mut self, idx: NodeIdx) -> NodeIdx {
        let Some(pivot) = self.nodes[idx].right else {
            return idx;
        };
        let parent = self.nodes[idx].parent.unwrap_or(SENTINEL);
        let was_left = self.nodes[idx].is_left_child;
        let inner = self.nodes[pivot].left;

        self.set_child(idx, false, inner);
        self.set_child(pivot, true, Some(idx));
        self.set_child(parent, was_left, Some(pivot));

        self.update_counters(idx);
        self.update_counters(pivot);
        pivot
    }

    /// Rotate `idx` down to the right; its left child takes its place.
    fn rotate_right(&mut self, idx: NodeIdx) -> NodeIdx {
        let Some(pivot) = self.nodes[idx].left else {
            return idx;
        };
        let parent = self.nodes[idx].parent.unwrap_or(SENTINEL);
        let was_left = self.nodes[idx].is_left_child;
        let inner = self.nodes[pivot].right;

        self.set_child(idx, true, inner);
        self.set_child(pivot, false, Some(idx));
        self.set_child(parent, was_left, Some(pivot));

        self.update_counters(idx);
        self.update_counters(pivot);
        pivot
    }

    // ------------------------------------------------------------------
    // Verification
    // ------------------------------------------------------------------

    /// Check every structural invariant. Returns a description of the first
    /// violation found.
    #[cfg(test)]
    pub fn validate(&self) -> Result<(), String> {
        let sentinel = &self.nodes[SENTINEL];
        if sentinel.left.is_some() || sentinel.parent.is_some() || !sentinel.hidden {
            return Err("sentinel was modified".to_string());
        }
        if let Some(root) = self.root() {
            if self.nodes[root].parent != Some(SENTINEL) || self.nodes[root].is_left_child {
                return Err(format!("root {root} is not linked to the sentinel"));
            }
        }

        let (_, _, count) = self.validate_subtree(self.root())?;
        if count != self.len {
            return Err(format!("tree holds {count} rows, len says {}", self.len));
        }
        if self.nodes.len() != self.len + self.free.len() + 1 {
            return Err(format!(
                "arena has {} slots for {} rows and {} free slots",
                self.nodes.len(),
                self.len,
                self.free.len()
            ));
        }

        let mut previous: Option<NodeIdx> = None;
        let mut current = self.first();
        while let Some(idx) = current {
            if let Some(prev) = previous {
                if compare_rows(&self.nodes[prev].cols, &self.nodes[idx].cols) == Ordering::Greater
                {
                    return Err(format!(
                        "rows {} and {} are out of order",
                        self.nodes[prev].key, self.nodes[idx].key
                    ));
                }
            }
            previous = Some(idx);
            current = self.successor(idx);
        }
        Ok(())
    }

    /// Returns (height, visible rows, rows) of a subtree.
    #[cfg(test)]
    fn validate_subtree(&self, idx: Option<NodeIdx>) -> Result<(u32, usize, usize), String> {
        let Some(i) = idx else {
            return Ok((0, 0, 0));
        };
        let node = &self.nodes[i];

        for (child, as_left) in [(node.left, true), (node.right, false)] {
            if let Some(c) = child {
                if self.nodes[c].parent != Some(i) || self.nodes[c].is_left_child != as_left {
                    return Err(format!("broken link between slots {i} and {c}"));
                }
            }
        }

        let (left_height, left_visible, left_rows) = self.validate_subtree(node.left)?;
        let (right_height, right_visible, right_rows) = self.validate_subtree(node.right)?;

        let height = 1 + left_height.max(right_height);
        if node.height != height {
            return Err(format!("row {} has height {}, expected {height}", node.key, node.height));
        }
        let visible = node.self_count() + left_visible + right_visible;
        if node.visible_count != visible {
            return Err(format!(
                "row {} counts {} visible rows, expected {visible}",
                node.key, node.visible_count
            ));
        }
        if left_height.abs_diff(right_height) > 1 {
            return Err(format!(
                "row {} is unbalanced ({left_height} vs {right_height})",
                node.key
            ));
        }

        Ok((height, visible, 1 + left_rows + right_rows))
    }

    /// Height of the real tree.
    #[cfg(test)]
    pub fn height_of_root(&self) -> u32 {
        self.height(self.root())
    }
}
