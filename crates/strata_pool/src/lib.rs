//! # STRATA Pool
//!
//! Off-heap object storage for millions of small records:
//! - Records live in flat byte buffers, not as individual heap objects
//! - Allocated slots are always dense, so a scan touches only live data
//! - Objects are reached through reusable handles or stable entity ids
//!
//! ## Layers
//!
//! 1. **[`memory`]** - raw slots, backing arrays and swap-to-compact freeing
//! 2. **[`object`]** - typed record layouts and rebindable [`PoolRef`] handles
//! 3. **[`entity`]** - stable [`EntityId`]s over a compacting pool
//! 4. **[`spot`]** - the ellipsoid detection record and its statistics
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_pool::{DoubleArrayField, Field, Pool, PoolObject};
//!
//! struct Point;
//!
//! impl Point {
//!     const XY: DoubleArrayField<2> = DoubleArrayField::at(0);
//! }
//!
//! impl PoolObject for Point {
//!     const SIZE_IN_BYTES: usize = Self::XY.end();
//! }
//!
//! let mut pool: Pool<Point> = Pool::with_capacity(1024)?;
//! let mut r = pool.create_ref()?;
//! pool.create(&mut r)?;
//! pool.set(&r, Point::XY, [1.0, 2.0])?;
//! pool.release_ref(r)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod entity;
pub mod error;
pub mod memory;
pub mod object;
pub mod spot;

pub use config::PoolConfig;
pub use entity::{EntityId, EntityPool, IdBimap};
pub use error::{PoolError, PoolResult};
pub use memory::{
    ChunkedByteArray, MappedElement, MappedElementArray, MappedElementMut, MemPool, Relocation,
    SingleByteArray,
};
pub use object::{
    BoolField, ByteField, DoubleArrayField, DoubleField, Field, FloatField, IndexField, IntField,
    Layout, Localizable, LongField, Pool, PoolObject, PoolRef,
};
pub use spot::{RadiusStatistics, Spot, SpotPool};
