//! # Entities
//!
//! Stable ids over a compacting pool.
//!
//! Slot indices change whenever the pool fills a hole; an [`EntityId`] does
//! not. [`EntityPool`] keeps the two in step through an [`IdBimap`].

mod bimap;
mod id;
mod pool;

pub use bimap::IdBimap;
pub use id::EntityId;
pub use pool::EntityPool;
