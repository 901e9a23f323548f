//! # Pool Error Types
//!
//! All errors that can occur while allocating, addressing or configuring pools.

use thiserror::Error;

/// Errors that can occur in pool operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The pool reached its configured hard maximum and cannot grow.
    #[error("pool out of capacity: hard maximum of {capacity} slots reached")]
    OutOfCapacity {
        /// The configured maximum number of slots.
        capacity: usize,
    },

    /// A handle or slot index that does not address an allocated slot, or a
    /// handle whose record was freed or moved after it was bound.
    #[error("invalid handle: slot {index:?} is unallocated or stale (pool holds {len} objects)")]
    InvalidHandle {
        /// The slot the handle pointed at, `None` if it was never bound.
        index: Option<usize>,
        /// Number of allocated slots at the time of the access.
        len: usize,
    },

    /// A handle that was created by a different pool.
    #[error("handle belongs to a different pool")]
    ForeignHandle,

    /// Too many reference handles are outstanding at once.
    #[error("reference handles exhausted: {limit} handles outstanding")]
    RefsExhausted {
        /// The configured maximum number of outstanding handles.
        limit: usize,
    },

    /// A slot index too large for a 4-byte index field.
    #[error("slot index {0} does not fit in an index field")]
    IndexOverflow(usize),

    /// An entity id that is already mapped to a slot.
    #[error("duplicate key: entity id {0} already exists")]
    DuplicateKey(u32),

    /// An entity id with no slot mapping.
    #[error("unknown entity id: {0}")]
    UnknownId(u32),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
