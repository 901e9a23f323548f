//! # Pool Objects
//!
//! Typed records on top of raw slots.
//!
//! ## Design Philosophy
//!
//! - A record type is a layout of typed fields at compile-time offsets
//! - Records are reached through reusable handles, never heap objects
//! - Slot indices are physical and may change on delete; see
//!   [`crate::entity`] for stable ids

mod layout;
mod localizable;
mod pool;

pub use layout::{
    BoolField, ByteField, DoubleArrayField, DoubleField, Field, FloatField, IndexField, IntField,
    Layout, LongField,
};
pub use localizable::Localizable;
pub use pool::{Pool, PoolObject, PoolRef};
