//! Crackstore - adaptive indexing column-store engine
//!
//! This crate provides a single-column, in-memory store that answers integer
//! range-count queries via database cracking: the data array is progressively
//! reordered by the queries themselves, so repeated or overlapping queries
//! touch fewer and fewer elements without an upfront sort.
//!
//! # Components
//!
//! - [`CrackingEngine`]: owns one column, its cracker index, and its pending
//!   updates; executes range-count queries
//! - [`ColumnBuffer`]: the fixed-capacity storage buffer backing an engine
//! - [`StorageNode`] / [`Coordinator`]: in-process distribution layer that
//!   shards a column across nodes and scatter/gathers counts
//!
//! # Example
//!
//! ```rust,ignore
//! use crackstore::CrackingEngine;
//!
//! let mut engine = CrackingEngine::new(&[5, 2, 8, 1, 9, 3, 7, 4, 6, 0]);
//!
//! // First query scans the whole column and cracks it around 3 and 7.
//! assert_eq!(engine.range_query(3, 7), 4);
//!
//! // A repeat of the same query only touches the already-cracked piece.
//! assert_eq!(engine.range_query(3, 7), 4);
//!
//! // Updates are queued and merged lazily by the next overlapping query.
//! engine.insert(5);
//! assert_eq!(engine.range_query(3, 7), 5);
//! ```

#![deny(missing_docs)]

pub mod cluster;
pub mod crack;
pub mod error;

pub use cluster::{ClusterStatus, Coordinator, DistributedQueryResult, QueryOutcome, StorageNode};
pub use crack::{naive_range_count, ColumnBuffer, CrackingEngine, CrackingStats, Value};
pub use error::{CrackError, Result};
