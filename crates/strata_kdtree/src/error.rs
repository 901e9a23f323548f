//! # KD-Tree Error Types

use strata_pool::PoolError;
use thiserror::Error;

/// Errors that can occur while building or addressing a KD-tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KdTreeError {
    /// Error from the node pool or the source pool.
    #[error("pool error: {0}")]
    Pool(#[from] PoolError),

    /// A node slot outside the tree.
    #[error("node {node} out of range (tree has {size} nodes)")]
    NodeOutOfRange {
        /// The requested node slot.
        node: usize,
        /// Number of nodes in the tree.
        size: usize,
    },

    /// A source slot listed more than once when building.
    #[error("source slot {0} listed more than once")]
    DuplicateSlot(usize),

    /// A source data index that the tree was not built over.
    #[error("data index {0} is not in the tree")]
    NotInTree(usize),
}

/// Result type for KD-tree operations.
pub type KdTreeResult<T> = Result<T, KdTreeError>;
