//! # Memory Pool
//!
//! Slot bookkeeping over a backing array. Allocated slots always occupy
//! `[0, len)`: freeing a slot moves the last allocated slot's bytes into the
//! hole, so iteration over live data is a dense scan.

use tracing::{debug, trace, warn};

use super::array::{MappedElementArray, SingleByteArray};
use super::element::{MappedElement, MappedElementMut};
use crate::config::PoolConfig;
use crate::error::{PoolError, PoolResult};

/// Data movement caused by [`MemPool::free`].
///
/// The bytes that lived in slot `from` now live in slot `to`. Anything that
/// refers to `from` by raw slot index must be repointed to `to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Relocation {
    /// Former slot of the moved data (always the last allocated slot).
    pub from: usize,
    /// Slot that received the moved data (the freed slot).
    pub to: usize,
}

/// A pool of fixed-size byte slots with swap-to-compact freeing.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. All mutation must happen under one owner
/// (or an external exclusive lock); concurrent reads are fine while nothing
/// mutates.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool: MemPool = MemPool::with_capacity(100, 16)?;
///
/// // Allocate - amortized O(1)
/// let a = pool.allocate()?;
/// let b = pool.allocate()?;
///
/// // Free - O(1), `b`'s data moves into slot `a`
/// let moved = pool.free(a)?;
/// assert_eq!(moved.map(|r| r.from), Some(b));
/// ```
#[derive(Debug, Clone)]
pub struct MemPool<A: MappedElementArray = SingleByteArray> {
    /// The backing slot storage.
    data: A,
    /// Number of allocated slots.
    len: usize,
    /// Hard maximum number of slots, if configured.
    max_capacity: Option<usize>,
    /// Bumped whenever existing slot indices may change meaning.
    modification_count: u64,
    /// Per slot, the `modification_count` at which its record was last
    /// freed or replaced. Grown lazily; missing entries read as zero.
    slot_stamps: Vec<u64>,
    /// The `modification_count` of the last `clear`.
    cleared_at: u64,
}

impl<A: MappedElementArray> MemPool<A> {
    /// Creates a pool of `bytes_per_element`-byte slots sized by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if the configuration is
    /// inconsistent or the slot width is zero.
    pub fn new(bytes_per_element: usize, config: &PoolConfig) -> PoolResult<Self> {
        config.validate()?;
        if bytes_per_element == 0 {
            return Err(PoolError::InvalidConfig(
                "bytes_per_element must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            data: A::with_config(config.initial_capacity, bytes_per_element, config),
            len: 0,
            max_capacity: config.max_capacity,
            modification_count: 0,
            slot_stamps: Vec::new(),
            cleared_at: 0,
        })
    }

    /// Creates an unbounded pool with the given initial capacity.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if the slot width is zero.
    pub fn with_capacity(initial_capacity: usize, bytes_per_element: usize) -> PoolResult<Self> {
        Self::new(bytes_per_element, &PoolConfig::with_initial_capacity(initial_capacity))
    }

    /// Returns the number of allocated slots.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if no slot is allocated.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots the backing array currently holds.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of free slots before the next growth.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.capacity() - self.len
    }

    /// Returns the hard maximum number of slots, if configured.
    #[inline]
    #[must_use]
    pub const fn max_capacity(&self) -> Option<usize> {
        self.max_capacity
    }

    /// Returns the width of one slot in bytes.
    #[inline]
    #[must_use]
    pub fn bytes_per_element(&self) -> usize {
        self.data.bytes_per_element()
    }

    /// Returns a counter that changes whenever a free or clear may have
    /// changed what a slot index refers to.
    #[inline]
    #[must_use]
    pub const fn modification_count(&self) -> u64 {
        self.modification_count
    }

    /// Returns the `modification_count` at which the record in slot `index`
    /// last stopped being the record it was. A reference taken at count `c`
    /// still names the same record while this is at most `c`.
    #[inline]
    #[must_use]
    pub fn slot_stamp(&self, index: usize) -> u64 {
        self.slot_stamps
            .get(index)
            .copied()
            .unwrap_or(0)
            .max(self.cleared_at)
    }

    /// Allocates a slot and returns its index.
    ///
    /// The new slot is always `len()` before the call and is zeroed. When the
    /// backing array is full it doubles, clamped to the hard maximum.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::OutOfCapacity`] if the hard maximum is reached.
    /// The pool is left exactly as it was.
    pub fn allocate(&mut self) -> PoolResult<usize> {
        if self.len == self.data.len() {
            self.grow()?;
        }
        let index = self.len;
        self.len += 1;
        self.data.element_mut(index).zero();
        Ok(index)
    }

    fn grow(&mut self) -> PoolResult<()> {
        let capacity = self.data.len();
        let limit = self
            .max_capacity
            .map_or(self.data.max_len(), |max| max.min(self.data.max_len()));
        if capacity >= limit {
            warn!(capacity = limit, "pool allocation refused: hard maximum reached");
            return Err(PoolError::OutOfCapacity { capacity: limit });
        }
        let new_capacity = capacity.saturating_mul(2).max(capacity + 1).min(limit);
        debug!(
            from = capacity,
            to = new_capacity,
            bytes_per_element = self.data.bytes_per_element(),
            "growing pool backing array"
        );
        self.data.resize(new_capacity);
        Ok(())
    }

    /// Frees an allocated slot.
    ///
    /// If `index` is not the last allocated slot, the last slot's bytes are
    /// moved into `index` and the move is reported so callers can repoint
    /// anything that addressed the last slot.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidHandle`] if `index` is not allocated.
    pub fn free(&mut self, index: usize) -> PoolResult<Option<Relocation>> {
        if index >= self.len {
            return Err(PoolError::InvalidHandle {
                index: Some(index),
                len: self.len,
            });
        }
        let last = self.len - 1;
        let relocation = if index == last {
            None
        } else {
            self.data.swap_elements(index, last);
            Some(Relocation { from: last, to: index })
        };
        self.len = last;
        self.modification_count += 1;
        self.stamp_slot(index);
        self.stamp_slot(last);
        Ok(relocation)
    }

    fn stamp_slot(&mut self, index: usize) {
        if self.slot_stamps.len() <= index {
            self.slot_stamps.resize(index + 1, 0);
        }
        self.slot_stamps[index] = self.modification_count;
    }

    /// Frees all slots.
    ///
    /// This is an **O(1)** operation - slot bytes are left in place and
    /// zeroed lazily on reallocation.
    pub fn clear(&mut self) {
        trace!(len = self.len, "clearing pool");
        self.len = 0;
        self.modification_count += 1;
        self.cleared_at = self.modification_count;
    }

    /// Read-only view of an allocated slot.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidHandle`] if `index` is not allocated.
    #[inline]
    pub fn element(&self, index: usize) -> PoolResult<MappedElement<'_>> {
        self.check(index)?;
        Ok(self.data.element(index))
    }

    /// Read/write view of an allocated slot.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidHandle`] if `index` is not allocated.
    #[inline]
    pub fn element_mut(&mut self, index: usize) -> PoolResult<MappedElementMut<'_>> {
        self.check(index)?;
        Ok(self.data.element_mut(index))
    }

    /// Iterates over the allocated slots in index order.
    pub fn elements(&self) -> impl Iterator<Item = MappedElement<'_>> {
        (0..self.len).map(move |i| self.data.element(i))
    }

    /// The backing array.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &A {
        &self.data
    }

    #[inline]
    fn check(&self, index: usize) -> PoolResult<()> {
        if index < self.len {
            Ok(())
        } else {
            Err(PoolError::InvalidHandle {
                index: Some(index),
                len: self.len,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::ChunkedByteArray;

    #[test]
    fn test_pool_allocate_free() {
        let mut pool: MemPool = MemPool::with_capacity(10, 4).unwrap();

        let a = pool.allocate().unwrap();
        pool.element_mut(a).unwrap().put_int(42, 0);
        assert_eq!(pool.element(a).unwrap().get_int(0), 42);
        assert_eq!(pool.len(), 1);

        assert_eq!(pool.free(a).unwrap(), None);
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn test_free_moves_last_slot() {
        let mut pool: MemPool = MemPool::with_capacity(4, 4).unwrap();
        for i in 0..4 {
            let slot = pool.allocate().unwrap();
            pool.element_mut(slot).unwrap().put_int(i * 100, 0);
        }

        let moved = pool.free(1).unwrap();
        assert_eq!(moved, Some(Relocation { from: 3, to: 1 }));
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.element(1).unwrap().get_int(0), 300);
        assert!(pool.element(3).is_err());
    }

    #[test]
    fn test_pool_full() {
        let config = PoolConfig::with_initial_capacity(1).with_max_capacity(2);
        let mut pool: MemPool = MemPool::new(8, &config).unwrap();

        pool.allocate().unwrap();
        pool.allocate().unwrap();
        let before = (pool.len(), pool.capacity());
        assert_eq!(pool.allocate(), Err(PoolError::OutOfCapacity { capacity: 2 }));
        assert_eq!((pool.len(), pool.capacity()), before);
    }

    #[test]
    fn test_pool_reuse_is_zeroed() {
        let mut pool: MemPool = MemPool::with_capacity(1, 4).unwrap();

        let a = pool.allocate().unwrap();
        pool.element_mut(a).unwrap().put_int(7, 0);
        pool.free(a).unwrap();

        let b = pool.allocate().unwrap();
        assert_eq!(a, b); // Same slot reused
        assert_eq!(pool.element(b).unwrap().get_int(0), 0);
    }

    #[test]
    fn test_growth_from_zero_capacity() {
        let mut pool: MemPool<ChunkedByteArray> = MemPool::with_capacity(0, 4).unwrap();
        for _ in 0..100 {
            pool.allocate().unwrap();
        }
        assert_eq!(pool.len(), 100);
        assert!(pool.capacity() >= 100);
    }

    #[test]
    fn test_clear() {
        let mut pool: MemPool = MemPool::with_capacity(4, 4).unwrap();
        pool.allocate().unwrap();
        pool.allocate().unwrap();
        let count = pool.modification_count();

        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.free_count(), pool.capacity());
        assert!(pool.modification_count() > count);
    }

    #[test]
    fn test_slot_stamps_follow_frees_and_clear() {
        let mut pool: MemPool = MemPool::with_capacity(4, 4).unwrap();
        for _ in 0..3 {
            pool.allocate().unwrap();
        }
        let taken = pool.modification_count();
        assert!((0..3).all(|i| pool.slot_stamp(i) <= taken));

        // Slot 0 receives slot 2's record; slot 1 is untouched.
        pool.free(0).unwrap();
        assert!(pool.slot_stamp(0) > taken);
        assert!(pool.slot_stamp(2) > taken);
        assert!(pool.slot_stamp(1) <= taken);

        let retaken = pool.modification_count();
        pool.clear();
        assert!((0..4).all(|i| pool.slot_stamp(i) > retaken));
    }

    #[test]
    fn test_free_invalid_index() {
        let mut pool: MemPool = MemPool::with_capacity(4, 4).unwrap();
        assert!(matches!(pool.free(0), Err(PoolError::InvalidHandle { .. })));
    }
}
