//! StorageNode - a registry of named column engines on one node.

use crate::crack::{CrackingEngine, Value};
use crate::error::{CrackError, Result};
use std::collections::BTreeMap;
use tracing::debug;

/// Outcome of a range query on one node's shard of a column.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// Identifier of the node that served the query.
    pub node_id: String,
    /// Number of shard elements in the queried range.
    pub count: usize,
    /// Elements swept by the partition kernels during this query.
    pub tuples_touched: u64,
    /// Cracks in the shard's index after the query.
    pub cracks_used: usize,
    /// Wall-clock duration of the engine call, in milliseconds.
    pub query_time_ms: f64,
}

/// Summary of a node's contents.
#[derive(Debug, Clone)]
pub struct NodeSummary {
    /// Identifier of the node.
    pub node_id: String,
    /// Names of the columns loaded on the node.
    pub columns: Vec<String>,
    /// Total elements across all column shards.
    pub total_rows: usize,
    /// Total cracks across all column shards.
    pub total_cracks: usize,
}

/// A storage node holding one [`CrackingEngine`] per loaded column.
#[derive(Debug)]
pub struct StorageNode {
    node_id: String,
    columns: BTreeMap<String, CrackingEngine>,
}

impl StorageNode {
    /// Creates an empty node with the given identifier.
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            columns: BTreeMap::new(),
        }
    }

    /// This node's identifier.
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Number of columns loaded on this node.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if a column with this name is loaded.
    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Loads `data` as the column `name`, constructing a fresh engine and
    /// replacing any previous engine under that name. Returns the number of
    /// rows loaded.
    ///
    /// # Errors
    ///
    /// Returns `CrackError::EmptyColumnLoad` if `data` is empty.
    pub fn load_column(&mut self, name: &str, data: &[Value]) -> Result<usize> {
        if data.is_empty() {
            return Err(CrackError::EmptyColumnLoad {
                column: name.to_string(),
            });
        }

        debug!(node_id = %self.node_id, column = name, rows = data.len(), "loading column");
        self.columns
            .insert(name.to_string(), CrackingEngine::new(data));
        Ok(data.len())
    }

    /// Runs a range-count query against the named column's shard.
    ///
    /// # Errors
    ///
    /// Returns `CrackError::ColumnNotFound` if the column is not loaded.
    pub fn range_query(&mut self, column: &str, low: Value, high: Value) -> Result<QueryOutcome> {
        let node_id = self.node_id.clone();
        let engine = self.engine_mut(column)?;
        let count = engine.range_query(low, high);
        let stats = engine.stats();

        debug!(
            node_id = %node_id,
            column,
            low,
            high,
            count,
            tuples_touched = stats.last_tuples_touched,
            "range query served"
        );

        Ok(QueryOutcome {
            node_id,
            count,
            tuples_touched: stats.last_tuples_touched,
            cracks_used: engine.crack_count(),
            query_time_ms: stats.last_query_time_ms,
        })
    }

    /// Queues an insert against the named column.
    ///
    /// # Errors
    ///
    /// Returns `CrackError::ColumnNotFound` if the column is not loaded.
    pub fn queue_insert(&mut self, column: &str, value: Value) -> Result<()> {
        self.engine_mut(column)?.insert(value);
        Ok(())
    }

    /// Queues a delete against the named column.
    ///
    /// # Errors
    ///
    /// Returns `CrackError::ColumnNotFound` if the column is not loaded.
    pub fn queue_remove(&mut self, column: &str, value: Value) -> Result<()> {
        self.engine_mut(column)?.remove(value);
        Ok(())
    }

    /// Shared access to the engine for a loaded column.
    pub fn engine(&self, column: &str) -> Option<&CrackingEngine> {
        self.columns.get(column)
    }

    /// Summarizes the node's columns, row counts, and crack counts.
    pub fn summary(&self) -> NodeSummary {
        NodeSummary {
            node_id: self.node_id.clone(),
            columns: self.columns.keys().cloned().collect(),
            total_rows: self.columns.values().map(|e| e.size()).sum(),
            total_cracks: self.columns.values().map(|e| e.crack_count()).sum(),
        }
    }

    fn engine_mut(&mut self, column: &str) -> Result<&mut CrackingEngine> {
        self.columns
            .get_mut(column)
            .ok_or_else(|| CrackError::ColumnNotFound {
                column: column.to_string(),
            })
    }
}
