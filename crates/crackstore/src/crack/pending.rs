//! Pending-update buffers: lazily merged inserts and deletes.
//!
//! Updates never touch the column directly. They queue here as two sorted
//! multisets and are drained by the first query whose range covers their
//! value. A value is never pending as both an insert and a delete: queueing
//! one while the other is pending cancels one occurrence instead.

use crate::crack::Value;
use std::collections::BTreeMap;

/// A sorted multiset of integers with ranged removal.
#[derive(Debug, Default)]
struct SortedMultiset {
    counts: BTreeMap<Value, usize>,
    len: usize,
}

impl SortedMultiset {
    fn add(&mut self, value: Value) {
        *self.counts.entry(value).or_insert(0) += 1;
        self.len += 1;
    }

    /// Removes one occurrence of `value`. Returns false if absent.
    fn remove_one(&mut self, value: Value) -> bool {
        match self.counts.get_mut(&value) {
            Some(count) => {
                *count -= 1;
                if *count == 0 {
                    self.counts.remove(&value);
                }
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    /// Removes and returns every `(value, occurrences)` entry in
    /// `[low, high)`, in ascending value order.
    fn take_range(&mut self, low: Value, high: Value) -> Vec<(Value, usize)> {
        if low >= high {
            return Vec::new();
        }
        let taken: Vec<(Value, usize)> = self
            .counts
            .range(low..high)
            .map(|(&v, &n)| (v, n))
            .collect();
        for &(v, n) in &taken {
            self.counts.remove(&v);
            self.len -= n;
        }
        taken
    }

    fn len(&self) -> usize {
        self.len
    }
}

/// Queued inserts and deletes awaiting a query over their value range.
#[derive(Debug, Default)]
pub struct PendingUpdates {
    inserts: SortedMultiset,
    deletes: SortedMultiset,
}

impl PendingUpdates {
    /// Creates an empty update buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an insert of `value`, cancelling one pending delete of the
    /// same value if present.
    pub fn queue_insert(&mut self, value: Value) {
        if !self.deletes.remove_one(value) {
            self.inserts.add(value);
        }
    }

    /// Queues a delete of `value`, cancelling one pending insert of the
    /// same value if present.
    pub fn queue_delete(&mut self, value: Value) {
        if !self.inserts.remove_one(value) {
            self.deletes.add(value);
        }
    }

    /// Drains all pending inserts with values in `[low, high)`.
    pub fn take_inserts_in(&mut self, low: Value, high: Value) -> Vec<(Value, usize)> {
        self.inserts.take_range(low, high)
    }

    /// Drains all pending deletes with values in `[low, high)`.
    pub fn take_deletes_in(&mut self, low: Value, high: Value) -> Vec<(Value, usize)> {
        self.deletes.take_range(low, high)
    }

    /// Number of queued inserts (counting multiplicity).
    pub fn insert_count(&self) -> usize {
        self.inserts.len()
    }

    /// Number of queued deletes (counting multiplicity).
    pub fn delete_count(&self) -> usize {
        self.deletes.len()
    }

    /// A value currently pending as both an insert and a delete, if any.
    /// The cancellation rule makes this unreachable; used by invariant
    /// checks.
    #[cfg(test)]
    pub(crate) fn conflicting_value(&self) -> Option<Value> {
        self.inserts
            .counts
            .keys()
            .find(|v| self.deletes.counts.contains_key(v))
            .copied()
    }
}
