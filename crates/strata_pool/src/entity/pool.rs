//! # Entity Pool
//!
//! A [`Pool`] whose records are named by stable [`EntityId`]s. Removing an
//! entity compacts the pool; the id of the record moved into the hole keeps
//! resolving to its new slot.

use std::fmt;

use tracing::trace;

use super::bimap::IdBimap;
use super::id::EntityId;
use crate::config::PoolConfig;
use crate::error::{PoolError, PoolResult};
use crate::memory::{MappedElement, MappedElementArray, MappedElementMut, Relocation, SingleByteArray};
use crate::object::{Field, Pool, PoolObject, PoolRef};

/// A pool of `O` records addressed by id.
///
/// The underlying [`Pool`] is only exposed read-only so that every slot
/// change goes through the bimap.
pub struct EntityPool<O: PoolObject, A: MappedElementArray = SingleByteArray> {
    pool: Pool<O, A>,
    ids: IdBimap,
    next_id: u32,
}

impl<O: PoolObject, A: MappedElementArray> fmt::Debug for EntityPool<O, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityPool")
            .field("pool", &self.pool)
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl<O: PoolObject, A: MappedElementArray> EntityPool<O, A> {
    /// Creates an entity pool sized by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] for an inconsistent configuration.
    pub fn new(config: &PoolConfig) -> PoolResult<Self> {
        Ok(Self {
            pool: Pool::new(config)?,
            ids: IdBimap::with_capacity(config.initial_capacity),
            next_id: 0,
        })
    }

    /// Creates an unbounded entity pool with the given initial capacity.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if `O` is zero-sized.
    pub fn with_capacity(initial_capacity: usize) -> PoolResult<Self> {
        Self::new(&PoolConfig::with_initial_capacity(initial_capacity))
    }

    /// Returns the number of live entities.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Checks if there are no entities.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// The underlying pool, for slot-indexed reads.
    #[inline]
    #[must_use]
    pub fn pool(&self) -> &Pool<O, A> {
        &self.pool
    }

    /// Creates an entity with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::OutOfCapacity`] at the pool's hard maximum or
    /// when the id space is used up.
    pub fn create(&mut self) -> PoolResult<EntityId> {
        // Skip ids claimed through `create_with_id`.
        while self.ids.contains(EntityId::new(self.next_id)) {
            self.bump_next_id()?;
        }
        let id = EntityId::new(self.next_id);
        if id.is_null() {
            return Err(PoolError::OutOfCapacity {
                capacity: self.pool.capacity(),
            });
        }
        self.insert(id)?;
        self.bump_next_id()?;
        Ok(id)
    }

    /// Creates an entity with a caller-chosen id.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::DuplicateKey`] if `id` is live (nothing is
    /// allocated), [`PoolError::UnknownId`] for [`EntityId::NULL`], or
    /// [`PoolError::OutOfCapacity`].
    pub fn create_with_id(&mut self, id: EntityId) -> PoolResult<EntityId> {
        if id.is_null() {
            return Err(PoolError::UnknownId(id.get()));
        }
        self.ids.check_vacant(id)?;
        self.insert(id)?;
        Ok(id)
    }

    /// Removes the entity `id`.
    ///
    /// Returns the relocation the pool performed to stay compact, if any.
    /// The moved record keeps its id.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::UnknownId`] if `id` is not live.
    pub fn remove(&mut self, id: EntityId) -> PoolResult<Option<Relocation>> {
        let slot = self.slot_of(id).ok_or(PoolError::UnknownId(id.get()))?;
        let relocation = self.pool.delete_index(slot)?;
        self.ids.remove_slot(slot, relocation)?;
        trace!(%id, slot, ?relocation, "entity removed");
        Ok(relocation)
    }

    /// Checks if `id` is live.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.ids.contains(id)
    }

    /// Current slot of entity `id`.
    #[inline]
    #[must_use]
    pub fn slot_of(&self, id: EntityId) -> Option<usize> {
        self.ids.slot_of(id)
    }

    /// Id of the entity in `slot`.
    #[inline]
    #[must_use]
    pub fn id_at(&self, slot: usize) -> Option<EntityId> {
        self.ids.id_at(slot)
    }

    /// Ids of all live entities in slot order.
    #[inline]
    #[must_use]
    pub fn ids(&self) -> &[EntityId] {
        self.ids.ids()
    }

    /// `(id, slot)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, usize)> + '_ {
        self.ids.ids().iter().copied().zip(0..)
    }

    /// Acquires a handle from the underlying pool.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::RefsExhausted`].
    pub fn vertex_ref(&mut self) -> PoolResult<PoolRef<O>> {
        self.pool.create_ref()
    }

    /// Gives a handle back.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ForeignHandle`].
    pub fn release_ref(&mut self, handle: PoolRef<O>) -> PoolResult<()> {
        self.pool.release_ref(handle)
    }

    /// Points `handle` at entity `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::UnknownId`] if `id` is not live.
    pub fn get_object(&self, id: EntityId, handle: &mut PoolRef<O>) -> PoolResult<()> {
        let slot = self.slot_of(id).ok_or(PoolError::UnknownId(id.get()))?;
        self.pool.get_object(slot, handle)
    }

    /// Id of the entity `handle` points at.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidHandle`] for an unbound or stale handle.
    pub fn id_of(&self, handle: &PoolRef<O>) -> PoolResult<EntityId> {
        let slot = self.pool.index_of(handle)?;
        self.ids.id_at(slot).ok_or(PoolError::InvalidHandle {
            index: Some(slot),
            len: self.len(),
        })
    }

    /// Reads a field of entity `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::UnknownId`] if `id` is not live.
    pub fn get<F: Field>(&self, id: EntityId, field: F) -> PoolResult<F::Value> {
        self.pool.get_at(self.require(id)?, field)
    }

    /// Writes a field of entity `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::UnknownId`] if `id` is not live.
    pub fn set<F: Field>(&mut self, id: EntityId, field: F, value: F::Value) -> PoolResult<()> {
        let slot = self.require(id)?;
        self.pool.set_at(slot, field, value)
    }

    /// Raw read access to entity `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::UnknownId`] if `id` is not live.
    pub fn access(&self, id: EntityId) -> PoolResult<MappedElement<'_>> {
        self.pool.access_at(self.require(id)?)
    }

    /// Raw write access to entity `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::UnknownId`] if `id` is not live.
    pub fn access_mut(&mut self, id: EntityId) -> PoolResult<MappedElementMut<'_>> {
        let slot = self.require(id)?;
        self.pool.access_at_mut(slot)
    }

    /// Removes every entity. Ids are not reissued afterwards.
    pub fn clear(&mut self) {
        self.pool.clear();
        self.ids.clear();
        trace!(next_id = self.next_id, "entity pool cleared");
    }

    fn insert(&mut self, id: EntityId) -> PoolResult<()> {
        // Allocate first: a refused allocation must leave the bimap untouched.
        let slot = self.pool.allocate()?;
        self.ids.insert(id, slot)?;
        if id.get() >= self.next_id {
            self.next_id = id.get().saturating_add(1);
        }
        Ok(())
    }

    fn bump_next_id(&mut self) -> PoolResult<()> {
        self.next_id = self.next_id.checked_add(1).ok_or(PoolError::OutOfCapacity {
            capacity: self.pool.capacity(),
        })?;
        Ok(())
    }

    #[inline]
    fn require(&self, id: EntityId) -> PoolResult<usize> {
        self.slot_of(id).ok_or(PoolError::UnknownId(id.get()))
    }
}
