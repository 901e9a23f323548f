//! # Object Pool
//!
//! A [`MemPool`] specialized to one record type, addressed through
//! rebindable [`PoolRef`] handles instead of per-object allocations.
//!
//! A handle is a cursor: it is created once, pointed at different slots with
//! [`Pool::create`] or [`Pool::get_object`], and released when done. Handles
//! come from a bounded freelist that is separate from the slot freelist, so
//! leaking handles exhausts handles, never data slots.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::PoolConfig;
use crate::error::{PoolError, PoolResult};
use crate::memory::{
    MappedElement, MappedElementArray, MappedElementMut, MemPool, Relocation, SingleByteArray,
};

use super::layout::Field;

static NEXT_POOL_ID: AtomicU32 = AtomicU32::new(0);

/// A record type stored in pool slots.
///
/// # Example
///
/// ```rust,ignore
/// struct Particle;
///
/// impl Particle {
///     const POSITION: DoubleArrayField<3> = DoubleArrayField::at(0);
///     const LIFE: FloatField = FloatField::at(Self::POSITION.end());
/// }
///
/// impl PoolObject for Particle {
///     const SIZE_IN_BYTES: usize = Self::LIFE.end();
/// }
/// ```
pub trait PoolObject: 'static {
    /// Width of one record in bytes.
    const SIZE_IN_BYTES: usize;

    /// Writes the state of a freshly created record. Slots arrive zeroed.
    fn set_to_uninitialized_state(access: &mut MappedElementMut<'_>) {
        let _ = access;
    }
}

/// A rebindable handle to one slot of a [`Pool`].
///
/// Handles are not `Clone`: each one is a distinct cursor that must be given
/// back with [`Pool::release_ref`].
///
/// A bound handle goes stale once its record is freed or moved by a free of
/// another slot, even if the slot is reallocated later. Stale handles are
/// rejected with [`PoolError::InvalidHandle`] and must be rebound.
pub struct PoolRef<O> {
    slot: Option<usize>,
    /// Pool `modification_count` when the handle was bound.
    bound_at: u64,
    pool_id: u32,
    ref_id: u32,
    _marker: PhantomData<fn() -> O>,
}

impl<O> PoolRef<O> {
    /// The slot this handle currently points at.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        self.slot
    }

    /// Whether the handle points at a slot.
    #[inline]
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.slot.is_some()
    }
}

impl<O> fmt::Debug for PoolRef<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolRef")
            .field("slot", &self.slot)
            .field("bound_at", &self.bound_at)
            .field("pool_id", &self.pool_id)
            .field("ref_id", &self.ref_id)
            .finish()
    }
}

/// Freelist of handle ids.
#[derive(Debug, Clone)]
struct RefRegistry {
    free: Vec<u32>,
    issued: u32,
    outstanding: usize,
    max_refs: usize,
}

impl RefRegistry {
    fn new(max_refs: usize) -> Self {
        Self {
            free: Vec::new(),
            issued: 0,
            outstanding: 0,
            max_refs,
        }
    }

    fn acquire(&mut self) -> PoolResult<u32> {
        if self.outstanding >= self.max_refs {
            return Err(PoolError::RefsExhausted {
                limit: self.max_refs,
            });
        }
        let id = if let Some(id) = self.free.pop() {
            id
        } else {
            let id = self.issued;
            self.issued += 1;
            id
        };
        self.outstanding += 1;
        Ok(id)
    }

    fn release(&mut self, id: u32) {
        self.free.push(id);
        self.outstanding -= 1;
    }
}

/// A pool of `O` records over backing array `A`.
///
/// # Thread Safety
///
/// Not internally synchronized. Mutate from one owner; read concurrently only
/// while nothing mutates.
pub struct Pool<O: PoolObject, A: MappedElementArray = SingleByteArray> {
    memory: MemPool<A>,
    refs: RefRegistry,
    pool_id: u32,
    _marker: PhantomData<fn() -> O>,
}

impl<O: PoolObject, A: MappedElementArray> fmt::Debug for Pool<O, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("pool_id", &self.pool_id)
            .field("len", &self.memory.len())
            .field("capacity", &self.memory.capacity())
            .field("outstanding_refs", &self.refs.outstanding)
            .finish()
    }
}

impl<O: PoolObject, A: MappedElementArray> Pool<O, A> {
    /// Creates a pool sized by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] for an inconsistent configuration.
    pub fn new(config: &PoolConfig) -> PoolResult<Self> {
        Ok(Self {
            memory: MemPool::new(O::SIZE_IN_BYTES, config)?,
            refs: RefRegistry::new(config.max_refs),
            pool_id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            _marker: PhantomData,
        })
    }

    /// Creates an unbounded pool with the given initial capacity.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if `O` is zero-sized.
    pub fn with_capacity(initial_capacity: usize) -> PoolResult<Self> {
        Self::new(&PoolConfig::with_initial_capacity(initial_capacity))
    }

    /// Returns the number of live records.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    /// Checks if the pool holds no records.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Returns the current slot capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.memory.capacity()
    }

    /// See [`MemPool::modification_count`].
    #[inline]
    #[must_use]
    pub fn modification_count(&self) -> u64 {
        self.memory.modification_count()
    }

    /// The underlying slot pool.
    #[inline]
    #[must_use]
    pub fn memory(&self) -> &MemPool<A> {
        &self.memory
    }

    /// Returns the number of handles acquired and not yet released.
    #[inline]
    #[must_use]
    pub fn outstanding_refs(&self) -> usize {
        self.refs.outstanding
    }

    /// Acquires an unbound handle.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::RefsExhausted`] if `max_refs` handles are
    /// already outstanding.
    pub fn create_ref(&mut self) -> PoolResult<PoolRef<O>> {
        let ref_id = self.refs.acquire()?;
        Ok(PoolRef {
            slot: None,
            bound_at: 0,
            pool_id: self.pool_id,
            ref_id,
            _marker: PhantomData,
        })
    }

    /// Gives a handle back for reuse.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ForeignHandle`] if the handle came from another
    /// pool.
    pub fn release_ref(&mut self, handle: PoolRef<O>) -> PoolResult<()> {
        self.check_owner(&handle)?;
        self.refs.release(handle.ref_id);
        Ok(())
    }

    /// Runs `f` with a temporary handle, releasing it afterwards whatever the
    /// outcome.
    ///
    /// # Errors
    ///
    /// Returns the error of `f`, or [`PoolError::RefsExhausted`].
    pub fn with_ref<R>(
        &mut self,
        f: impl FnOnce(&mut Self, &mut PoolRef<O>) -> PoolResult<R>,
    ) -> PoolResult<R> {
        let mut handle = self.create_ref()?;
        let result = f(self, &mut handle);
        self.release_ref(handle)?;
        result
    }

    /// Allocates a new record and points `handle` at it.
    ///
    /// Returns the new slot index.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::OutOfCapacity`] at the hard maximum (the pool and
    /// the handle are unchanged) or [`PoolError::ForeignHandle`].
    pub fn create(&mut self, handle: &mut PoolRef<O>) -> PoolResult<usize> {
        self.check_owner(handle)?;
        let index = self.allocate()?;
        self.bind(handle, index);
        Ok(index)
    }

    /// Allocates a new record without binding a handle to it.
    ///
    /// Returns the new slot index.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::OutOfCapacity`] at the hard maximum.
    pub fn allocate(&mut self) -> PoolResult<usize> {
        let index = self.memory.allocate()?;
        O::set_to_uninitialized_state(&mut self.memory.element_mut(index)?);
        Ok(index)
    }

    /// Deletes the record `handle` points at and unbinds the handle.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidHandle`] for an unbound or stale handle.
    pub fn delete(&mut self, handle: &mut PoolRef<O>) -> PoolResult<Option<Relocation>> {
        let index = self.index_of(handle)?;
        handle.slot = None;
        self.memory.free(index)
    }

    /// Deletes the record at slot `index`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidHandle`] if `index` is not allocated.
    pub fn delete_index(&mut self, index: usize) -> PoolResult<Option<Relocation>> {
        self.memory.free(index)
    }

    /// Points `handle` at the record in slot `index`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidHandle`] if `index` is not allocated.
    pub fn get_object(&self, index: usize, handle: &mut PoolRef<O>) -> PoolResult<()> {
        self.check_owner(handle)?;
        self.check_index(index)?;
        self.bind(handle, index);
        Ok(())
    }

    /// Slot index of the record `handle` points at.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidHandle`] if the handle is unbound or its
    /// record was freed or moved since it was bound, or
    /// [`PoolError::ForeignHandle`].
    pub fn index_of(&self, handle: &PoolRef<O>) -> PoolResult<usize> {
        self.check_owner(handle)?;
        match handle.slot {
            Some(index)
                if index < self.memory.len()
                    && self.memory.slot_stamp(index) <= handle.bound_at =>
            {
                Ok(index)
            }
            slot => Err(PoolError::InvalidHandle {
                index: slot,
                len: self.memory.len(),
            }),
        }
    }

    /// Reads a field of the record `handle` points at.
    ///
    /// # Errors
    ///
    /// See [`Pool::index_of`].
    #[inline]
    pub fn get<F: Field>(&self, handle: &PoolRef<O>, field: F) -> PoolResult<F::Value> {
        let index = self.index_of(handle)?;
        self.get_at(index, field)
    }

    /// Writes a field of the record `handle` points at.
    ///
    /// # Errors
    ///
    /// See [`Pool::index_of`].
    #[inline]
    pub fn set<F: Field>(&mut self, handle: &PoolRef<O>, field: F, value: F::Value) -> PoolResult<()> {
        let index = self.index_of(handle)?;
        self.set_at(index, field, value)
    }

    /// Reads a field of the record in slot `index`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidHandle`] if `index` is not allocated.
    #[inline]
    pub fn get_at<F: Field>(&self, index: usize, field: F) -> PoolResult<F::Value> {
        Ok(field.get(&self.memory.element(index)?))
    }

    /// Writes a field of the record in slot `index`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidHandle`] if `index` is not allocated.
    #[inline]
    pub fn set_at<F: Field>(&mut self, index: usize, field: F, value: F::Value) -> PoolResult<()> {
        field.put(&mut self.memory.element_mut(index)?, value);
        Ok(())
    }

    /// Raw read access to the record `handle` points at.
    ///
    /// # Errors
    ///
    /// See [`Pool::index_of`].
    pub fn access(&self, handle: &PoolRef<O>) -> PoolResult<MappedElement<'_>> {
        let index = self.index_of(handle)?;
        self.memory.element(index)
    }

    /// Raw write access to the record `handle` points at.
    ///
    /// # Errors
    ///
    /// See [`Pool::index_of`].
    pub fn access_mut(&mut self, handle: &PoolRef<O>) -> PoolResult<MappedElementMut<'_>> {
        let index = self.index_of(handle)?;
        self.memory.element_mut(index)
    }

    /// Raw read access to slot `index`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidHandle`] if `index` is not allocated.
    #[inline]
    pub fn access_at(&self, index: usize) -> PoolResult<MappedElement<'_>> {
        self.memory.element(index)
    }

    /// Raw write access to slot `index`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidHandle`] if `index` is not allocated.
    #[inline]
    pub fn access_at_mut(&mut self, index: usize) -> PoolResult<MappedElementMut<'_>> {
        self.memory.element_mut(index)
    }

    /// Deletes all records. Outstanding handles stay acquired but every
    /// bound one goes stale.
    pub fn clear(&mut self) {
        self.memory.clear();
    }

    #[inline]
    fn bind(&self, handle: &mut PoolRef<O>, index: usize) {
        handle.slot = Some(index);
        handle.bound_at = self.memory.modification_count();
    }

    #[inline]
    fn check_owner(&self, handle: &PoolRef<O>) -> PoolResult<()> {
        if handle.pool_id == self.pool_id {
            Ok(())
        } else {
            Err(PoolError::ForeignHandle)
        }
    }

    #[inline]
    fn check_index(&self, index: usize) -> PoolResult<()> {
        if index < self.memory.len() {
            Ok(())
        } else {
            Err(PoolError::InvalidHandle {
                index: Some(index),
                len: self.memory.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::layout::IntField;

    struct TestObject;

    impl TestObject {
        const ID: IntField = IntField::at(0);
    }

    impl PoolObject for TestObject {
        const SIZE_IN_BYTES: usize = Self::ID.end();

        fn set_to_uninitialized_state(access: &mut MappedElementMut<'_>) {
            Self::ID.put(access, -1);
        }
    }

    #[test]
    fn test_create_sets_uninitialized_state() {
        let mut pool: Pool<TestObject> = Pool::with_capacity(4).unwrap();
        let mut r = pool.create_ref().unwrap();
        pool.create(&mut r).unwrap();
        assert_eq!(pool.get(&r, TestObject::ID).unwrap(), -1);
        pool.release_ref(r).unwrap();
    }

    #[test]
    fn test_handle_rebinding() {
        let mut pool: Pool<TestObject> = Pool::with_capacity(4).unwrap();
        let mut r = pool.create_ref().unwrap();
        for id in 0..3 {
            pool.create(&mut r).unwrap();
            pool.set(&r, TestObject::ID, id * 11).unwrap();
        }

        pool.get_object(1, &mut r).unwrap();
        assert_eq!(pool.get(&r, TestObject::ID).unwrap(), 11);
        pool.get_object(2, &mut r).unwrap();
        assert_eq!(pool.get(&r, TestObject::ID).unwrap(), 22);
        pool.release_ref(r).unwrap();
        assert_eq!(pool.outstanding_refs(), 0);
    }

    #[test]
    fn test_stale_handle_is_rejected() {
        let mut pool: Pool<TestObject> = Pool::with_capacity(4).unwrap();
        let mut a = pool.create_ref().unwrap();
        let mut b = pool.create_ref().unwrap();
        pool.create(&mut a).unwrap();
        pool.create(&mut b).unwrap();

        pool.delete(&mut a).unwrap();
        assert!(!a.is_bound());
        // `b` pointed at the last slot, which no longer exists.
        assert!(matches!(pool.get(&b, TestObject::ID), Err(PoolError::InvalidHandle { .. })));
        assert!(matches!(pool.get(&a, TestObject::ID), Err(PoolError::InvalidHandle { index: None, .. })));

        pool.release_ref(a).unwrap();
        pool.release_ref(b).unwrap();
    }

    #[test]
    fn test_alias_of_deleted_record_is_rejected() {
        let mut pool: Pool<TestObject> = Pool::with_capacity(4).unwrap();
        let mut first = pool.create_ref().unwrap();
        let mut alias = pool.create_ref().unwrap();
        let mut last = pool.create_ref().unwrap();
        let mut other = pool.create_ref().unwrap();
        for tag in 1..=3 {
            pool.create(&mut first).unwrap();
            pool.set(&first, TestObject::ID, tag).unwrap();
        }
        pool.get_object(0, &mut first).unwrap();
        pool.get_object(0, &mut alias).unwrap();
        pool.get_object(2, &mut last).unwrap();
        pool.get_object(1, &mut other).unwrap();

        // Record 3 moves into slot 0.
        pool.delete(&mut first).unwrap();
        assert!(matches!(
            pool.get(&alias, TestObject::ID),
            Err(PoolError::InvalidHandle { index: Some(0), len: 2 })
        ));
        assert!(matches!(pool.get(&last, TestObject::ID), Err(PoolError::InvalidHandle { .. })));
        assert_eq!(pool.get(&other, TestObject::ID).unwrap(), 2);

        // Reallocating the vacated slot does not revive old handles.
        pool.create(&mut first).unwrap();
        assert!(matches!(pool.get(&last, TestObject::ID), Err(PoolError::InvalidHandle { .. })));

        // Rebinding makes the alias usable again.
        pool.get_object(0, &mut alias).unwrap();
        assert_eq!(pool.get(&alias, TestObject::ID).unwrap(), 3);

        pool.clear();
        pool.create(&mut first).unwrap();
        assert!(matches!(pool.get(&other, TestObject::ID), Err(PoolError::InvalidHandle { .. })));
        assert_eq!(pool.get(&first, TestObject::ID).unwrap(), -1);

        for r in [first, alias, last, other] {
            pool.release_ref(r).unwrap();
        }
    }

    #[test]
    fn test_refs_exhausted() {
        let config = PoolConfig::default().with_max_refs(2);
        let mut pool: Pool<TestObject> = Pool::new(&config).unwrap();
        let a = pool.create_ref().unwrap();
        let b = pool.create_ref().unwrap();
        assert_eq!(pool.create_ref().unwrap_err(), PoolError::RefsExhausted { limit: 2 });

        pool.release_ref(a).unwrap();
        let c = pool.create_ref().unwrap();
        pool.release_ref(b).unwrap();
        pool.release_ref(c).unwrap();
    }

    #[test]
    fn test_foreign_handle() {
        let mut p1: Pool<TestObject> = Pool::with_capacity(1).unwrap();
        let mut p2: Pool<TestObject> = Pool::with_capacity(1).unwrap();
        let mut r = p1.create_ref().unwrap();
        assert_eq!(p2.create(&mut r), Err(PoolError::ForeignHandle));
        assert_eq!(p2.release_ref(r), Err(PoolError::ForeignHandle));
    }

    #[test]
    fn test_with_ref_releases() {
        let mut pool: Pool<TestObject> = Pool::with_capacity(1).unwrap();
        let slot = pool
            .with_ref(|pool, r| {
                let slot = pool.create(r)?;
                pool.set(r, TestObject::ID, 5)?;
                Ok(slot)
            })
            .unwrap();
        assert_eq!(pool.get_at(slot, TestObject::ID).unwrap(), 5);
        assert_eq!(pool.outstanding_refs(), 0);
    }
}
