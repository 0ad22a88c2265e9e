//! `row_count` equals rows added minus rows deleted minus rows hidden.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::compare::compare_rows;
use crate::e2e_tests::helpers::new_table;
use crate::testing::u32_cols;
use crate::{QueryFlags, RowKey, SeekOrigin, UpdateKind};

#[test]
fn test_row_count_matches_bookkeeping() {
    for seed in [1, 2, 3, 42, 1_000] {
        let mut rng = StdRng::seed_from_u64(seed);
        let table = new_table();
        // key -> hidden
        let mut live: HashMap<u32, bool> = HashMap::new();

        for _ in 0..2_000 {
            let id = rng.random_range(0..300u32);
            let key = RowKey::object(id);
            if rng.random_bool(0.6) {
                let hidden = rng.random_bool(0.1);
                let cols = u32_cols(&[rng.random_range(0..50), id]);
                let update = table
                    .update_row(UpdateKind::Add, key, cols, hidden)
                    .expect("add");
                match live.get(&id) {
                    Some(_) => assert_eq!(update.action, UpdateKind::Modify),
                    None => {
                        assert_eq!(update.action, UpdateKind::Add);
                        live.insert(id, hidden);
                    }
                }
            } else {
                let result = table.update_row(UpdateKind::Delete, key, Vec::new(), false);
                assert_eq!(result.is_ok(), live.remove(&id).is_some());
            }

            let expected = live.values().filter(|hidden| !**hidden).count();
            assert_eq!(table.row_count(), expected, "seed {seed}");
        }
        table.validate().expect("valid");
    }
}

#[test]
fn test_adjacent_visible_rows_are_ordered() {
    let mut rng = StdRng::seed_from_u64(7);
    let table = new_table();
    for id in 0..500u32 {
        let cols = u32_cols(&[rng.random_range(0..20), rng.random_range(0..20)]);
        table
            .update_row(UpdateKind::Add, RowKey::object(id), cols, false)
            .expect("add");
    }

    table.seek_row(SeekOrigin::Beginning, 0).expect("seek");
    let rows = table.query_rows(usize::MAX, QueryFlags::forward());
    assert_eq!(rows.len(), 500);

    let vectors: Vec<_> = rows
        .iter()
        .map(|&key| table.sort_vector(key).expect("row exists"))
        .collect();
    for pair in vectors.windows(2) {
        assert!(compare_rows(&pair[0], &pair[1]).is_le());
    }
}
