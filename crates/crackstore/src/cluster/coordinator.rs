//! Coordinator - cluster membership and scatter/gather range queries.
//!
//! The coordinator owns the registered storage nodes. Loading a column
//! splits it into contiguous chunks, one per healthy node, the way the
//! original single-column sharding works: `n / k` rows per node with the
//! first `n % k` nodes taking one extra row. A distributed range query runs
//! the same `[low, high)` query on every healthy shard and sums the counts;
//! the shards partition the column, so the sum is the column's count.

use crate::cluster::node::{QueryOutcome, StorageNode};
use crate::crack::Value;
use crate::error::{CrackError, Result};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default duration without a heartbeat after which a node is considered
/// unhealthy.
pub const DEFAULT_HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(15);

/// Liveness and health of one registered node.
#[derive(Debug, Clone)]
pub struct NodeStatus {
    /// Identifier of the node.
    pub node_id: String,
    /// Whether the node is currently considered healthy.
    pub is_healthy: bool,
    /// Milliseconds since the node's last heartbeat.
    pub ms_since_heartbeat: u128,
}

/// Snapshot of cluster membership and health.
#[derive(Debug, Clone)]
pub struct ClusterStatus {
    /// Number of registered nodes.
    pub total_nodes: usize,
    /// Number of currently healthy nodes.
    pub healthy_nodes: usize,
    /// Per-node status, in node-id order.
    pub nodes: Vec<NodeStatus>,
}

/// Result of a scatter/gather range query.
#[derive(Debug, Clone)]
pub struct DistributedQueryResult {
    /// Sum of the per-node counts.
    pub total_count: usize,
    /// Number of nodes that served the query.
    pub nodes_queried: usize,
    /// Wall-clock duration of the whole fan-out, in milliseconds.
    pub total_time_ms: f64,
    /// Per-node outcomes, in node-id order.
    pub node_results: Vec<QueryOutcome>,
}

#[derive(Debug)]
struct RegisteredNode {
    node: StorageNode,
    is_healthy: bool,
    last_heartbeat: Instant,
}

/// Registry of storage nodes with heartbeat tracking, chunked column
/// loading, and scatter/gather queries.
#[derive(Debug)]
pub struct Coordinator {
    nodes: BTreeMap<String, RegisteredNode>,
    next_node_id: u64,
    heartbeat_timeout: Duration,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator {
    /// Creates a coordinator with the default heartbeat timeout.
    pub fn new() -> Self {
        Self::with_heartbeat_timeout(DEFAULT_HEARTBEAT_TIMEOUT)
    }

    /// Creates a coordinator with a custom heartbeat timeout.
    pub fn with_heartbeat_timeout(heartbeat_timeout: Duration) -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_node_id: 1,
            heartbeat_timeout,
        }
    }

    /// Registers a new storage node and returns its assigned identifier.
    pub fn register_node(&mut self) -> String {
        let node_id = format!("node-{}", self.next_node_id);
        self.next_node_id += 1;

        debug!(node_id = %node_id, total = self.nodes.len() + 1, "node registered");
        self.nodes.insert(
            node_id.clone(),
            RegisteredNode {
                node: StorageNode::new(node_id.clone()),
                is_healthy: true,
                last_heartbeat: Instant::now(),
            },
        );
        node_id
    }

    /// Number of registered nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of currently healthy nodes.
    pub fn healthy_node_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_healthy).count()
    }

    /// Shared access to a registered node.
    pub fn node(&self, node_id: &str) -> Option<&StorageNode> {
        self.nodes.get(node_id).map(|n| &n.node)
    }

    /// Exclusive access to a registered node, for direct per-node
    /// operations such as queueing updates.
    pub fn node_mut(&mut self, node_id: &str) -> Option<&mut StorageNode> {
        self.nodes.get_mut(node_id).map(|n| &mut n.node)
    }

    /// Records a heartbeat from `node_id`, restoring it to healthy.
    ///
    /// # Errors
    ///
    /// Returns `CrackError::UnknownNode` if the id is not registered.
    pub fn heartbeat(&mut self, node_id: &str) -> Result<()> {
        match self.nodes.get_mut(node_id) {
            Some(registered) => {
                registered.last_heartbeat = Instant::now();
                registered.is_healthy = true;
                Ok(())
            }
            None => Err(CrackError::UnknownNode {
                node_id: node_id.to_string(),
            }),
        }
    }

    /// Marks every node whose last heartbeat is older than the configured
    /// timeout as unhealthy. Returns the number of nodes newly marked.
    pub fn expire_stale(&mut self) -> usize {
        let mut expired = 0;
        for registered in self.nodes.values_mut() {
            if registered.is_healthy && registered.last_heartbeat.elapsed() > self.heartbeat_timeout
            {
                registered.is_healthy = false;
                expired += 1;
            }
        }
        expired
    }

    /// Snapshot of cluster membership and per-node health.
    pub fn cluster_status(&self) -> ClusterStatus {
        let nodes: Vec<NodeStatus> = self
            .nodes
            .iter()
            .map(|(id, registered)| NodeStatus {
                node_id: id.clone(),
                is_healthy: registered.is_healthy,
                ms_since_heartbeat: registered.last_heartbeat.elapsed().as_millis(),
            })
            .collect();

        ClusterStatus {
            total_nodes: nodes.len(),
            healthy_nodes: nodes.iter().filter(|n| n.is_healthy).count(),
            nodes,
        }
    }

    /// Loads `data` as the column `name`, sharded in contiguous chunks
    /// across the healthy nodes. Returns the number of nodes that received
    /// a chunk (fewer than the healthy count when there are more nodes than
    /// rows).
    ///
    /// # Errors
    ///
    /// Returns `CrackError::NoHealthyNodes` if no healthy node is
    /// registered, or `CrackError::EmptyColumnLoad` if `data` is empty.
    pub fn load_column(&mut self, name: &str, data: &[Value]) -> Result<usize> {
        if data.is_empty() {
            return Err(CrackError::EmptyColumnLoad {
                column: name.to_string(),
            });
        }

        let healthy: Vec<String> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.is_healthy)
            .map(|(id, _)| id.clone())
            .collect();
        if healthy.is_empty() {
            return Err(CrackError::NoHealthyNodes);
        }

        let rows_per_node = data.len() / healthy.len();
        let remainder = data.len() % healthy.len();

        let mut offset = 0;
        let mut nodes_used = 0;
        for (i, node_id) in healthy.iter().enumerate() {
            let rows = rows_per_node + usize::from(i < remainder);
            if rows == 0 {
                continue;
            }
            let chunk = &data[offset..offset + rows];
            offset += rows;

            let registered = self.nodes.get_mut(node_id).expect("healthy node registered");
            registered.node.load_column(name, chunk)?;
            nodes_used += 1;
        }

        debug!(column = name, rows = data.len(), nodes_used, "column distributed");
        Ok(nodes_used)
    }

    /// Runs `[low, high)` against every healthy node holding the column and
    /// sums the counts.
    ///
    /// Healthy nodes without the column are skipped; they contribute no
    /// per-node result.
    ///
    /// # Errors
    ///
    /// Returns `CrackError::NoHealthyNodes` if no healthy node is
    /// registered, or `CrackError::ColumnNotFound` if no healthy node holds
    /// the column.
    pub fn range_query(
        &mut self,
        column: &str,
        low: Value,
        high: Value,
    ) -> Result<DistributedQueryResult> {
        if self.healthy_node_count() == 0 {
            return Err(CrackError::NoHealthyNodes);
        }

        let started = Instant::now();
        let mut node_results = Vec::new();
        let mut total_count = 0;

        for registered in self.nodes.values_mut() {
            if !registered.is_healthy || !registered.node.contains_column(column) {
                continue;
            }
            let outcome = registered.node.range_query(column, low, high)?;
            total_count += outcome.count;
            node_results.push(outcome);
        }

        if node_results.is_empty() {
            return Err(CrackError::ColumnNotFound {
                column: column.to_string(),
            });
        }

        let total_time_ms = started.elapsed().as_secs_f64() * 1000.0;
        debug!(
            column,
            low,
            high,
            total_count,
            nodes_queried = node_results.len(),
            "distributed range query"
        );

        Ok(DistributedQueryResult {
            total_count,
            nodes_queried: node_results.len(),
            total_time_ms,
            node_results,
        })
    }
}
