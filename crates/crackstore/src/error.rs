//! Error and Result types for crackstore operations.
//!
//! The cracking engine itself is infallible by contract: every misuse is
//! either unrepresentable in the API or a programming error caught by a
//! debug assertion. The variants here cover the cluster surface, where a
//! caller can name a column or node that does not exist.

use thiserror::Error;

/// A convenience `Result` type for crackstore operations.
pub type Result<T> = std::result::Result<T, CrackError>;

/// The error type for cluster-level operations.
#[derive(Debug, Error)]
pub enum CrackError {
    /// The named column has not been loaded on this node.
    #[error("Column not found: {column}")]
    ColumnNotFound {
        /// Name of the requested column.
        column: String,
    },

    /// A column load was attempted with zero rows.
    #[error("Refusing to load empty column: {column}")]
    EmptyColumnLoad {
        /// Name of the column being loaded.
        column: String,
    },

    /// The named node is not registered with the coordinator.
    #[error("Unknown node: {node_id}")]
    UnknownNode {
        /// Identifier of the unknown node.
        node_id: String,
    },

    /// No healthy node is available to serve the request.
    #[error("No healthy nodes available")]
    NoHealthyNodes,
}
