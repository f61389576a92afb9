//! CrackingEngine - range-count queries that adaptively index the column.
//!
//! The engine owns one column and answers `range_query(low, high)` by
//! cracking: it merges any pending updates that overlap the range, locates
//! the pieces holding `low` and `high`, partitions those pieces in place,
//! records the split positions as new cracks, and returns the distance
//! between the two splits as the count.
//!
//! The first query over a cold column scans everything; each subsequent
//! query only partitions the (ever smaller) pieces its bounds fall into.
//!
//! Engines are exclusively owned and move-only: cloning one would alias the
//! mutable storage that the cracker index describes.

use crate::crack::column::ColumnBuffer;
use crate::crack::index::CrackerIndex;
use crate::crack::partition::{partition_two_way, split_three_way};
use crate::crack::pending::PendingUpdates;
use crate::crack::Value;
use std::time::Instant;
use tracing::warn;

/// Query statistics for a [`CrackingEngine`].
///
/// The `last_*` fields describe the most recent query and are reset at the
/// start of each `range_query`; the cumulative fields cover the engine's
/// lifetime and are only cleared by [`CrackingEngine::reset_stats`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CrackingStats {
    /// Total number of queries executed.
    pub queries_executed: u64,
    /// Total elements swept by the partition kernels across all queries.
    pub total_tuples_touched: u64,
    /// Net change in crack count across all queries. Negative contributions
    /// occur when a merged delete clears the index.
    pub total_cracks_created: i64,
    /// Total wall-clock time spent in `range_query`, in milliseconds.
    pub total_query_time_ms: f64,

    /// Elements swept by the partition kernels during the last query.
    pub last_tuples_touched: u64,
    /// Net change in crack count during the last query.
    pub last_cracks_created: i64,
    /// Wall-clock duration of the last query, in milliseconds.
    pub last_query_time_ms: f64,
    /// Count returned by the last query.
    pub last_result_count: u64,
}

impl CrackingStats {
    /// Clears every counter, cumulative and per-query.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Adaptive indexing engine for one column of integers.
#[derive(Debug)]
pub struct CrackingEngine {
    column: ColumnBuffer,
    index: CrackerIndex,
    pending: PendingUpdates,
    stats: CrackingStats,
}

impl CrackingEngine {
    /// Creates an engine over a copy of `data` with the default insert
    /// headroom (`max(size / 10, 1000)` extra slots).
    pub fn new(data: &[Value]) -> Self {
        Self::from_buffer(ColumnBuffer::with_default_capacity(data))
    }

    /// Creates an engine over a copy of `data` with exactly
    /// `extra_capacity` headroom slots for pending inserts.
    pub fn with_extra_capacity(data: &[Value], extra_capacity: usize) -> Self {
        Self::from_buffer(ColumnBuffer::new(data, extra_capacity))
    }

    fn from_buffer(column: ColumnBuffer) -> Self {
        Self {
            column,
            index: CrackerIndex::new(),
            pending: PendingUpdates::new(),
            stats: CrackingStats::default(),
        }
    }

    /// Counts the elements in `[low, high)`, cracking the column as a side
    /// effect.
    ///
    /// Pending inserts and deletes whose values fall in the range are merged
    /// into the column first. An empty range (`low >= high`) returns 0
    /// without merging or partitioning anything.
    pub fn range_query(&mut self, low: Value, high: Value) -> usize {
        let started = Instant::now();

        self.stats.last_tuples_touched = 0;
        self.stats.last_cracks_created = 0;

        let count = if low < high {
            let cracks_before = self.index.len() as i64;
            self.merge_pending_updates(low, high);
            let count = self.crack(low, high);
            self.stats.last_cracks_created = self.index.len() as i64 - cracks_before;
            count
        } else {
            0
        };

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.stats.last_query_time_ms = elapsed_ms;
        self.stats.last_result_count = count as u64;
        self.stats.queries_executed += 1;
        self.stats.total_tuples_touched += self.stats.last_tuples_touched;
        self.stats.total_cracks_created += self.stats.last_cracks_created;
        self.stats.total_query_time_ms += elapsed_ms;

        count
    }

    /// Queues an insert of `value`, to be merged into the column by the
    /// next query whose range covers it. Cancels one pending delete of the
    /// same value if present.
    pub fn insert(&mut self, value: Value) {
        self.pending.queue_insert(value);
    }

    /// Queues a delete of `value`, to be applied by the next query whose
    /// range covers it. Cancels one pending insert of the same value if
    /// present; a no-op at merge time if the value is absent.
    pub fn remove(&mut self, value: Value) {
        self.pending.queue_delete(value);
    }

    /// Snapshot of the engine's query statistics.
    pub fn stats(&self) -> CrackingStats {
        self.stats
    }

    /// Clears all statistics, cumulative and per-query.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Current number of elements in the column.
    pub fn size(&self) -> usize {
        self.column.len()
    }

    /// Maximum number of elements the column can hold.
    pub fn capacity(&self) -> usize {
        self.column.capacity()
    }

    /// Current number of cracks in the index.
    pub fn crack_count(&self) -> usize {
        self.index.len()
    }

    /// Number of queued inserts awaiting a covering query.
    pub fn pending_insert_count(&self) -> usize {
        self.pending.insert_count()
    }

    /// Number of queued deletes awaiting a covering query.
    pub fn pending_delete_count(&self) -> usize {
        self.pending.delete_count()
    }

    /// Partitions the pieces holding `low` and `high` and returns the count
    /// of elements in `[low, high)`.
    fn crack(&mut self, low: Value, high: Value) -> usize {
        let size = self.column.len();
        let piece_low = self.index.locate(low, size);
        let piece_high = self.index.locate(high, size);

        self.stats.last_tuples_touched += piece_low.len() as u64;

        let (i1, i2) = if piece_low.start == piece_high.start {
            // Both bounds fall in one piece: a single three-way sweep
            // splits it around both pivots at once.
            debug_assert_eq!(piece_low.end, piece_high.end);
            let piece = self.column.piece_mut(piece_low.start, piece_low.end);
            let (o1, o2) = split_three_way(piece, low, high);
            (piece_low.start + o1, piece_low.start + o2)
        } else {
            self.stats.last_tuples_touched += piece_high.len() as u64;
            let o1 = partition_two_way(self.column.piece_mut(piece_low.start, piece_low.end), low);
            let o2 =
                partition_two_way(self.column.piece_mut(piece_high.start, piece_high.end), high);
            (piece_low.start + o1, piece_high.start + o2)
        };

        self.index.add_crack(low, i1, size);
        self.index.add_crack(high, i2, size);

        i2 - i1
    }

    /// Merges every pending update whose value lies in `[low, high)` into
    /// the column. Inserts append at the end; deletes remove the first
    /// matching element by tail swap. Either kind relocates an element
    /// across piece boundaries, so a merge that changes the column
    /// invalidates the whole index.
    fn merge_pending_updates(&mut self, low: Value, high: Value) {
        let mut appended = false;
        for (value, occurrences) in self.pending.take_inserts_in(low, high) {
            for _ in 0..occurrences {
                if self.column.push_within_capacity(value) {
                    appended = true;
                } else {
                    warn!(
                        value,
                        capacity = self.column.capacity(),
                        "pending insert dropped: column at capacity"
                    );
                }
            }
        }
        if appended {
            // An appended element sits past every crack, regardless of its
            // value; the recorded boundaries no longer partition by value.
            self.index.clear();
        }

        for (value, occurrences) in self.pending.take_deletes_in(low, high) {
            for _ in 0..occurrences {
                if let Some(position) = self.column.position_of(value) {
                    self.column.swap_remove(position);
                    // The tail element moved across piece boundaries; every
                    // recorded crack position is now suspect.
                    self.index.clear();
                }
            }
        }
    }

    /// Asserts the structural invariants of the index against the column.
    #[cfg(test)]
    fn assert_invariants(&self) {
        let values = self.column.values();
        let size = values.len();

        let mut running = Value::MIN;
        let prefix_max: Vec<Value> = values
            .iter()
            .map(|&x| {
                running = running.max(x);
                running
            })
            .collect();
        let mut running = Value::MAX;
        let mut suffix_min = vec![Value::MAX; size];
        for i in (0..size).rev() {
            running = running.min(values[i]);
            suffix_min[i] = running;
        }

        let mut prev: Option<(Value, usize)> = None;
        for (&v, desc) in self.index.iter() {
            let p = desc.pos;
            assert!(p > 0 && p < size, "crack {v} at array end (pos {p})");
            if let Some((prev_v, prev_p)) = prev {
                assert!(prev_v < v);
                assert!(prev_p <= p, "positions not monotone: {prev_p} > {p}");
            }
            assert!(
                prefix_max[p - 1] < v,
                "element >= {v} before crack position {p}"
            );
            assert!(
                suffix_min[p] >= v,
                "element < {v} at or after crack position {p}"
            );
            prev = Some((v, p));
        }

        assert!(
            self.pending.conflicting_value().is_none(),
            "value pending as both insert and delete"
        );
    }
}
