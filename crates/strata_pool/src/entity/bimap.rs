//! # Id <-> Slot Bimap
//!
//! Maps entity ids to slot indices and back. Slots are dense, so the
//! slot-to-id direction is a plain vector parallel to the pool; the
//! id-to-slot direction is a hash map.

use std::collections::HashMap;

use super::id::EntityId;
use crate::error::{PoolError, PoolResult};
use crate::memory::Relocation;

/// Bidirectional id/slot mapping kept in step with a compacting pool.
#[derive(Debug, Clone, Default)]
pub struct IdBimap {
    id_to_slot: HashMap<EntityId, usize>,
    slot_to_id: Vec<EntityId>,
}

impl IdBimap {
    /// Creates an empty bimap with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id_to_slot: HashMap::with_capacity(capacity),
            slot_to_id: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of mapped ids.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slot_to_id.len()
    }

    /// Checks if nothing is mapped.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slot_to_id.is_empty()
    }

    /// Checks if `id` is mapped.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.id_to_slot.contains_key(&id)
    }

    /// Slot of `id`.
    #[inline]
    #[must_use]
    pub fn slot_of(&self, id: EntityId) -> Option<usize> {
        self.id_to_slot.get(&id).copied()
    }

    /// Id stored in `slot`.
    #[inline]
    #[must_use]
    pub fn id_at(&self, slot: usize) -> Option<EntityId> {
        self.slot_to_id.get(slot).copied()
    }

    /// Ids in slot order.
    #[inline]
    #[must_use]
    pub fn ids(&self) -> &[EntityId] {
        &self.slot_to_id
    }

    /// Fails with [`PoolError::DuplicateKey`] if `id` is already mapped.
    ///
    /// # Errors
    ///
    /// See above.
    pub fn check_vacant(&self, id: EntityId) -> PoolResult<()> {
        if self.contains(id) {
            Err(PoolError::DuplicateKey(id.get()))
        } else {
            Ok(())
        }
    }

    /// Maps `id` to `slot`, which must be the next dense slot.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::DuplicateKey`] if `id` is already mapped.
    pub fn insert(&mut self, id: EntityId, slot: usize) -> PoolResult<()> {
        self.check_vacant(id)?;
        debug_assert_eq!(slot, self.slot_to_id.len(), "slots must be appended densely");
        self.id_to_slot.insert(id, slot);
        self.slot_to_id.push(id);
        Ok(())
    }

    /// Unmaps the id in `slot` and applies the relocation the pool reported
    /// for that free. Returns the unmapped id.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidHandle`] if `slot` is not mapped.
    pub fn remove_slot(&mut self, slot: usize, relocation: Option<Relocation>) -> PoolResult<EntityId> {
        let id = self.id_at(slot).ok_or(PoolError::InvalidHandle {
            index: Some(slot),
            len: self.len(),
        })?;
        self.id_to_slot.remove(&id);
        if let Some(Relocation { from, to }) = relocation {
            let moved = self.slot_to_id[from];
            self.slot_to_id[to] = moved;
            self.id_to_slot.insert(moved, to);
        }
        self.slot_to_id.pop();
        Ok(id)
    }

    /// Removes every mapping.
    pub fn clear(&mut self) {
        self.id_to_slot.clear();
        self.slot_to_id.clear();
    }
}
