//! # Spot Pool
//!
//! An [`EntityPool`] of [`Spot`]s with typed accessors that keep the
//! bounding-sphere radius in step with the covariance.

use tracing::trace;

use super::eigen::max_eigenvalue_symmetric3;
use super::record::Spot;
use crate::config::PoolConfig;
use crate::entity::{EntityId, EntityPool};
use crate::error::PoolResult;
use crate::memory::{MappedElementArray, Relocation, SingleByteArray};
use crate::object::{Field, Pool};

/// Spots of all timepoints in one compacting pool.
#[derive(Debug)]
pub struct SpotPool<A: MappedElementArray = SingleByteArray> {
    entities: EntityPool<Spot, A>,
}

impl<A: MappedElementArray> SpotPool<A> {
    /// Creates a spot pool sized by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`](crate::PoolError::InvalidConfig)
    /// for an inconsistent configuration.
    pub fn new(config: &PoolConfig) -> PoolResult<Self> {
        Ok(Self {
            entities: EntityPool::new(config)?,
        })
    }

    /// Creates an unbounded spot pool with the given initial capacity.
    ///
    /// # Errors
    ///
    /// Never fails for a non-zero record size.
    pub fn with_capacity(initial_capacity: usize) -> PoolResult<Self> {
        Self::new(&PoolConfig::with_initial_capacity(initial_capacity))
    }

    /// Returns the number of spots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Checks if there are no spots.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The id-addressed view.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &EntityPool<Spot, A> {
        &self.entities
    }

    /// The slot-addressed view, e.g. for building spatial indexes.
    #[inline]
    #[must_use]
    pub fn pool(&self) -> &Pool<Spot, A> {
        self.entities.pool()
    }

    /// Adds a spherical spot of `radius` at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::OutOfCapacity`](crate::PoolError::OutOfCapacity)
    /// at the hard maximum.
    pub fn add_spot(&mut self, timepoint: i32, position: [f64; 3], radius: f64) -> PoolResult<EntityId> {
        let id = self.entities.create()?;
        let r2 = radius * radius;
        let mut access = self.entities.access_mut(id)?;
        Spot::POSITION.put(&mut access, position);
        Spot::COVARIANCE.put(&mut access, [r2, 0.0, 0.0, 0.0, r2, 0.0, 0.0, 0.0, r2]);
        Spot::BOUNDING_SPHERE_RADIUS_SQUARED.put(&mut access, r2);
        Spot::TIMEPOINT.put(&mut access, timepoint);
        trace!(%id, timepoint, "spot added");
        Ok(id)
    }

    /// Removes spot `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::UnknownId`](crate::PoolError::UnknownId).
    pub fn remove(&mut self, id: EntityId) -> PoolResult<Option<Relocation>> {
        self.entities.remove(id)
    }

    /// Center of spot `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::UnknownId`](crate::PoolError::UnknownId).
    pub fn position(&self, id: EntityId) -> PoolResult<[f64; 3]> {
        self.entities.get(id, Spot::POSITION)
    }

    /// Moves spot `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::UnknownId`](crate::PoolError::UnknownId).
    pub fn set_position(&mut self, id: EntityId, position: [f64; 3]) -> PoolResult<()> {
        self.entities.set(id, Spot::POSITION, position)
    }

    /// Shape covariance of spot `id`, row-major.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::UnknownId`](crate::PoolError::UnknownId).
    pub fn covariance(&self, id: EntityId) -> PoolResult<[f64; 9]> {
        self.entities.get(id, Spot::COVARIANCE)
    }

    /// Reshapes spot `id`. The bounding-sphere radius squared becomes the
    /// largest eigenvalue of `covariance`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::UnknownId`](crate::PoolError::UnknownId).
    pub fn set_covariance(&mut self, id: EntityId, covariance: [f64; 9]) -> PoolResult<()> {
        let mut access = self.entities.access_mut(id)?;
        Spot::COVARIANCE.put(&mut access, covariance);
        Spot::BOUNDING_SPHERE_RADIUS_SQUARED.put(&mut access, max_eigenvalue_symmetric3(&covariance));
        Ok(())
    }

    /// Squared radius of the sphere enclosing spot `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::UnknownId`](crate::PoolError::UnknownId).
    pub fn bounding_sphere_radius_squared(&self, id: EntityId) -> PoolResult<f64> {
        self.entities.get(id, Spot::BOUNDING_SPHERE_RADIUS_SQUARED)
    }

    /// Timepoint of spot `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::UnknownId`](crate::PoolError::UnknownId).
    pub fn timepoint(&self, id: EntityId) -> PoolResult<i32> {
        self.entities.get(id, Spot::TIMEPOINT)
    }

    /// Slots of all spots in `timepoint`, ascending.
    #[must_use]
    pub fn slots_at_timepoint(&self, timepoint: i32) -> Vec<usize> {
        self.pool()
            .memory()
            .elements()
            .enumerate()
            .filter(|(_, access)| Spot::TIMEPOINT.get(access) == timepoint)
            .map(|(slot, _)| slot)
            .collect()
    }

    /// `(timepoint, bounding-sphere radius²)` of every spot, in slot order.
    pub fn radii(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.pool().memory().elements().map(|access| {
            (
                Spot::TIMEPOINT.get(&access),
                Spot::BOUNDING_SPHERE_RADIUS_SQUARED.get(&access),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PoolError;

    #[test]
    fn test_add_spot() {
        let mut spots: SpotPool = SpotPool::with_capacity(4).unwrap();
        let id = spots.add_spot(3, [1.0, 2.0, 3.0], 2.0).unwrap();
        assert_eq!(spots.position(id).unwrap(), [1.0, 2.0, 3.0]);
        assert_eq!(spots.timepoint(id).unwrap(), 3);
        assert_eq!(spots.bounding_sphere_radius_squared(id).unwrap(), 4.0);
        assert_eq!(spots.covariance(id).unwrap()[4], 4.0);
    }

    #[test]
    fn test_set_covariance_updates_radius() {
        let mut spots: SpotPool = SpotPool::with_capacity(4).unwrap();
        let id = spots.add_spot(0, [0.0; 3], 1.0).unwrap();
        spots
            .set_covariance(id, [1.0, 0.0, 0.0, 0.0, 9.0, 0.0, 0.0, 0.0, 4.0])
            .unwrap();
        assert_eq!(spots.bounding_sphere_radius_squared(id).unwrap(), 9.0);
    }

    #[test]
    fn test_slots_at_timepoint_follow_relocation() {
        let mut spots: SpotPool = SpotPool::with_capacity(4).unwrap();
        let a = spots.add_spot(0, [0.0; 3], 1.0).unwrap();
        let _b = spots.add_spot(1, [1.0; 3], 1.0).unwrap();
        let c = spots.add_spot(0, [2.0; 3], 1.0).unwrap();
        assert_eq!(spots.slots_at_timepoint(0), vec![0, 2]);

        spots.remove(a).unwrap();
        assert_eq!(spots.slots_at_timepoint(0), vec![0]);
        assert_eq!(spots.entities().slot_of(c), Some(0));
        assert_eq!(spots.position(c).unwrap(), [2.0; 3]);
        assert_eq!(spots.position(a), Err(PoolError::UnknownId(a.get())));
    }
}
