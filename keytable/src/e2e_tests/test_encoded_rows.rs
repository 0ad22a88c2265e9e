//! Rows built from typed values through the sort-key encoder.

use crate::e2e_tests::helpers::{add_cols, encode, new_table, visible_ids};
use crate::encoding::{CaseFoldCollator, PropValue, SortKeyEncoder};
use crate::{KeyTableConfig, KeyTableError, RowKey};

#[test]
fn test_signed_integers_sort_numerically() {
    let table = new_table();
    for (id, n) in [(1, 5), (2, -3), (3, 0), (4, i32::MIN), (5, i32::MAX)] {
        add_cols(&table, id, encode(&[PropValue::Long(n)]));
    }
    assert_eq!(visible_ids(&table), vec![4, 2, 3, 1, 5]);
}

#[test]
fn test_doubles_sort_numerically() {
    let table = new_table();
    for (id, f) in [(1, 2.5), (2, -10.0), (3, 0.0), (4, -0.5), (5, 1e9)] {
        add_cols(&table, id, encode(&[PropValue::Double(f)]));
    }
    assert_eq!(visible_ids(&table), vec![2, 4, 3, 1, 5]);
}

#[test]
fn test_strings_sort_case_insensitively() {
    let table = new_table();
    let names = [(1, "beta"), (2, "Alpha"), (3, "alpha"), (4, "ALP"), (5, "Gamma")];
    for (id, name) in names {
        add_cols(&table, id, encode(&[PropValue::String(name.to_string())]));
    }
    assert_eq!(visible_ids(&table), vec![4, 2, 3, 1, 5]);
}

#[test]
fn test_nulls_sort_first() {
    let table = new_table();
    add_cols(&table, 1, encode(&[PropValue::Long(-100)]));
    add_cols(&table, 2, encode(&[PropValue::Null]));
    add_cols(&table, 3, encode(&[PropValue::Long(7)]));
    assert_eq!(visible_ids(&table), vec![2, 1, 3]);
}

#[test]
fn test_truncated_strings_tie() {
    let encoder = SortKeyEncoder::from_config(
        CaseFoldCollator,
        &KeyTableConfig::default().with_sort_key_max_chars(4),
    );
    let key = |s: &str| {
        vec![encoder
            .encode(&PropValue::String(s.to_string()), false)
            .expect("encode")]
    };

    let table = new_table();
    add_cols(&table, 1, key("subject one"));
    add_cols(&table, 2, key("subject two"));
    assert_eq!(
        table.find_exact(&key("subj")).expect("find"),
        RowKey::object(1)
    );
}

#[test]
fn test_multi_level_conversation_view() {
    let table = new_table();
    let row = |subject: &str, received: u64| {
        encode(&[
            PropValue::String(subject.to_string()),
            PropValue::SystemTime(received),
        ])
    };
    add_cols(&table, 1, row("lunch", 300));
    add_cols(&table, 2, row("budget", 200));
    add_cols(&table, 3, row("lunch", 100));
    add_cols(&table, 4, row("budget", 400));
    add_cols(&table, 5, row("Budget", 100));
    assert_eq!(visible_ids(&table), vec![5, 2, 4, 3, 1]);
}

#[test]
fn test_unsortable_value_is_rejected() {
    let encoder = SortKeyEncoder::new();
    let result = encoder.encode(&PropValue::MultiValue(vec![PropValue::Long(1)]), false);
    let error = KeyTableError::from(result.expect_err("multi-value is not sortable"));
    assert!(matches!(error, KeyTableError::InvalidType(_)));
}
