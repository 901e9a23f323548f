//! # Memory Management
//!
//! Raw byte storage for pooled records.
//!
//! ## Layers
//!
//! - [`MappedElement`]: typed get/put at byte offsets inside one slot
//! - [`MappedElementArray`]: a growable run of equally sized slots
//! - [`MemPool`]: allocated/free bookkeeping with swap-to-compact freeing

mod array;
mod chunked;
mod element;
mod pool;

pub use array::{MappedElementArray, SingleByteArray};
pub use chunked::{ChunkedByteArray, DEFAULT_CHUNK_SLOTS};
pub use element::{
    MappedElement, MappedElementMut, BOOLEAN_SIZE, BYTE_SIZE, DOUBLE_SIZE, FLOAT_SIZE, INDEX_SIZE,
    INT_SIZE, LONG_SIZE,
};
pub use pool::{MemPool, Relocation};
