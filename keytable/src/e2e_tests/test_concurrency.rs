//! A table shared between threads.

use std::sync::Arc;
use std::thread;

use crate::e2e_tests::helpers::new_table;
use crate::testing::u32_cols;
use crate::{QueryFlags, RowKey, SeekOrigin, UpdateKind};

#[test]
fn test_concurrent_writers_and_readers() {
    let table = Arc::new(new_table());

    let writers: Vec<_> = (0..4u32)
        .map(|t| {
            #[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected
            let table = Arc::clone(&table);
            thread::spawn(move || {
                for i in 0..250u32 {
                    let id = t * 1_000 + i;
                    table
                        .update_row(UpdateKind::Add, RowKey::object(id), u32_cols(&[i, t]), false)
                        .expect("add");
                    if i % 5 == 0 {
                        table
                            .update_row(UpdateKind::Delete, RowKey::object(id), Vec::new(), false)
                            .expect("delete");
                    }
                }
            })
        })
        .collect();

    let reader = {
        #[allow(clippy::disallowed_methods)]
        let table = Arc::clone(&table);
        thread::spawn(move || {
            for _ in 0..200 {
                let count = table.row_count();
                assert!(count <= 1_000);
                let _ = table.seek_row(SeekOrigin::Beginning, 0);
                let rows = table.query_rows(50, QueryFlags::forward().no_advance());
                assert!(rows.len() <= 50);
            }
        })
    };

    for writer in writers {
        writer.join().expect("writer thread");
    }
    reader.join().expect("reader thread");

    assert_eq!(table.row_count(), 4 * 200);
    table.validate().expect("valid");
}
