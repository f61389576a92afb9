//! Property-based tests for the cracking engine.
//!
//! A reference column mirrors the engine's lazy-update contract with plain
//! linear scans: same pending buffers, same cancellation rule, same
//! merge-on-covering-query behavior, no cracking. Under arbitrary
//! interleavings of queries, inserts, and deletes the engine must return
//! exactly the reference counts.

use crackstore::{naive_range_count, CrackingEngine};
use proptest::prelude::*;

/// Reference implementation of the engine contract: unindexed column plus
/// lazily merged pending updates.
struct ReferenceColumn {
    values: Vec<i32>,
    pending_inserts: Vec<i32>,
    pending_deletes: Vec<i32>,
}

impl ReferenceColumn {
    fn new(data: &[i32]) -> Self {
        Self {
            values: data.to_vec(),
            pending_inserts: Vec::new(),
            pending_deletes: Vec::new(),
        }
    }

    fn insert(&mut self, value: i32) {
        if let Some(i) = self.pending_deletes.iter().position(|&v| v == value) {
            self.pending_deletes.swap_remove(i);
        } else {
            self.pending_inserts.push(value);
        }
    }

    fn remove(&mut self, value: i32) {
        if let Some(i) = self.pending_inserts.iter().position(|&v| v == value) {
            self.pending_inserts.swap_remove(i);
        } else {
            self.pending_deletes.push(value);
        }
    }

    fn range_query(&mut self, low: i32, high: i32) -> usize {
        if low >= high {
            return 0;
        }

        let in_range = |v: &i32| *v >= low && *v < high;

        let mut merged_inserts = Vec::new();
        self.pending_inserts.retain(|v| {
            if in_range(v) {
                merged_inserts.push(*v);
                false
            } else {
                true
            }
        });
        self.values.extend(merged_inserts);

        let mut merged_deletes = Vec::new();
        self.pending_deletes.retain(|v| {
            if in_range(v) {
                merged_deletes.push(*v);
                false
            } else {
                true
            }
        });
        for value in merged_deletes {
            if let Some(i) = self.values.iter().position(|&v| v == value) {
                self.values.swap_remove(i);
            }
        }

        naive_range_count(&self.values, low, high)
    }
}

#[derive(Debug, Clone)]
enum Op {
    Query(i32, i32),
    Insert(i32),
    Remove(i32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (-600..600i32, 0..400i32).prop_map(|(low, width)| Op::Query(low, low + width)),
        1 => (-600..600i32).prop_map(Op::Insert),
        1 => (-600..600i32).prop_map(Op::Remove),
    ]
}

proptest! {
    /// The engine agrees with the reference column on every count and on
    /// the pending-buffer sizes, under arbitrary operation interleavings.
    #[test]
    fn test_engine_matches_reference(
        data in prop::collection::vec(-500..500i32, 0..300),
        ops in prop::collection::vec(op_strategy(), 1..80),
    ) {
        let mut engine = CrackingEngine::new(&data);
        let mut reference = ReferenceColumn::new(&data);

        for op in ops {
            match op {
                Op::Query(low, high) => {
                    prop_assert_eq!(
                        engine.range_query(low, high),
                        reference.range_query(low, high),
                        "count mismatch for [{}, {})", low, high
                    );
                    prop_assert_eq!(engine.size(), reference.values.len());
                }
                Op::Insert(value) => {
                    engine.insert(value);
                    reference.insert(value);
                }
                Op::Remove(value) => {
                    engine.remove(value);
                    reference.remove(value);
                }
            }
            prop_assert_eq!(engine.pending_insert_count(), reference.pending_inserts.len());
            prop_assert_eq!(engine.pending_delete_count(), reference.pending_deletes.len());
        }
    }

    /// Re-running the same query returns the same count and never touches
    /// more tuples than the first run.
    #[test]
    fn test_repeat_query_is_idempotent_and_cheaper(
        data in prop::collection::vec(-500..500i32, 1..300),
        warmup in prop::collection::vec((-600..600i32, 0..400i32), 0..10),
        low in -600..600i32,
        width in 1..400i32,
    ) {
        let mut engine = CrackingEngine::new(&data);
        for (warm_low, warm_width) in warmup {
            engine.range_query(warm_low, warm_low + warm_width);
        }

        let high = low + width;
        let first_count = engine.range_query(low, high);
        let first_touched = engine.stats().last_tuples_touched;

        let second_count = engine.range_query(low, high);
        let second_touched = engine.stats().last_tuples_touched;

        prop_assert_eq!(first_count, second_count);
        prop_assert!(second_touched <= first_touched);
    }
}
