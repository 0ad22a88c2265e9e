//! Invariant checking for deterministic simulation testing.
//!
//! After every operation the checker compares the table with the reference
//! model and runs the table's own structural validation.

use std::cmp::Ordering;

use crate::KeyTable;
use crate::compare::compare_rows;
use crate::simulation::model::{Outcome, ReferenceModel};
use crate::simulation::op_gen::TableOp;
use crate::types::SortVector;

/// An invariant violation detected during simulation.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violation.
    pub description: String,
    /// Operation index where it was detected.
    pub operation_index: usize,
    /// Additional context.
    pub context: String,
}

/// Checker for table invariants.
pub struct InvariantChecker {
    violations: Vec<InvariantViolation>,
}

impl Default for InvariantChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantChecker {
    /// Create a new invariant checker.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    /// Get all violations.
    #[must_use]
    pub fn violations(&self) -> &[InvariantViolation] {
        &self.violations
    }

    /// Check if any violations were detected.
    #[must_use]
    pub const fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    fn violation(&mut self, description: &str, operation_index: usize, context: String) {
        self.violations.push(InvariantViolation {
            description: description.to_string(),
            operation_index,
            context,
        });
    }

    /// The table answered an operation the way the model did.
    pub fn check_outcome(
        &mut self,
        op: &TableOp,
        expected: &Outcome,
        actual: &Outcome,
        operation_index: usize,
    ) {
        if expected != actual {
            self.violation(
                "Table result differs from model",
                operation_index,
                format!("{op:?}: expected {expected:?}, got {actual:?}"),
            );
        }
    }

    /// Tree links, heights, counters, index and bookmarks are consistent.
    pub fn check_structure(&mut self, table: &KeyTable, operation_index: usize) {
        if let Err(e) = table.validate() {
            self.violation("Table structure is corrupt", operation_index, e);
        }
    }

    /// Same rows in the same order with the same hidden flags.
    pub fn check_rows(&mut self, table: &KeyTable, model: &ReferenceModel, operation_index: usize) {
        let actual = table.rows_in_order();
        let expected = model.rows();
        if actual != expected {
            self.violation(
                "Row order differs from model",
                operation_index,
                format!("expected {expected:?}, got {actual:?}"),
            );
        }

        let count = table.row_count();
        if count != model.visible_rows() {
            self.violation(
                "Visible row count differs from model",
                operation_index,
                format!("expected {}, got {count}", model.visible_rows()),
            );
        }
    }

    /// Cursor row and row number agree with the model.
    pub fn check_cursor(
        &mut self,
        table: &KeyTable,
        model: &ReferenceModel,
        operation_index: usize,
    ) {
        let row = table.current_row();
        let position = table.current_position();
        if row != model.current_row() || position != model.current_position() {
            self.violation(
                "Cursor differs from model",
                operation_index,
                format!(
                    "expected {:?} at {}, got {row:?} at {position}",
                    model.current_row(),
                    model.current_position()
                ),
            );
        }
    }

    /// Sort vectors never decrease along the returned rows.
    pub fn check_ordered(&mut self, vectors: &[SortVector], operation_index: usize) {
        for (i, pair) in vectors.windows(2).enumerate() {
            if compare_rows(&pair[0], &pair[1]) == Ordering::Greater {
                self.violation(
                    "Adjacent rows out of order",
                    operation_index,
                    format!("rows {i} and {}", i + 1),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::u32_cols;

    #[test]
    fn test_mismatched_outcome_is_reported() {
        let mut checker = InvariantChecker::new();
        checker.check_outcome(&TableOp::Next, &Outcome::Row(None), &Outcome::Row(None), 0);
        assert!(!checker.has_violations());

        checker.check_outcome(&TableOp::Next, &Outcome::Row(None), &Outcome::Cleared, 1);
        assert_eq!(checker.violations().len(), 1);
        assert_eq!(checker.violations()[0].operation_index, 1);
    }

    #[test]
    fn test_out_of_order_vectors_are_reported() {
        let mut checker = InvariantChecker::new();
        checker.check_ordered(&[u32_cols(&[1]), u32_cols(&[1, 0]), u32_cols(&[2])], 0);
        assert!(!checker.has_violations());

        checker.check_ordered(&[u32_cols(&[2]), u32_cols(&[1])], 1);
        assert!(checker.has_violations());
    }

    #[test]
    fn test_empty_table_matches_empty_model() {
        let mut checker = InvariantChecker::new();
        let table = KeyTable::new();
        let model = ReferenceModel::new(4);
        checker.check_structure(&table, 0);
        checker.check_rows(&table, &model, 0);
        checker.check_cursor(&table, &model, 0);
        assert!(!checker.has_violations());
    }
}
