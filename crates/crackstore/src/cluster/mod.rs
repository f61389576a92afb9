//! In-process distribution layer: storage nodes and a scatter/gather
//! coordinator.
//!
//! A [`StorageNode`] owns one cracking engine per named column. The
//! [`Coordinator`] registers nodes, tracks their liveness via heartbeats,
//! shards a column across the healthy nodes in contiguous chunks, and
//! answers a distributed range query by summing the per-node counts.
//!
//! Distribution adds no algorithmic depth over the engine: a query fans out
//! unchanged to every shard and the counts add up because the shards
//! partition the column. Exclusive `&mut` access serializes each node, so
//! no locking is involved.

pub mod coordinator;
pub mod node;

pub use coordinator::{ClusterStatus, Coordinator, DistributedQueryResult, NodeStatus};
pub use node::{NodeSummary, QueryOutcome, StorageNode};
