//! # Radius Statistics
//!
//! Per-timepoint maximum of the bounding-sphere radius squared. Spatial
//! queries that look for spots overlapping a point widen their search by
//! this radius.
//!
//! Readers (query threads) and the single writer (the editing thread) share
//! one instance behind a read-write lock.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use super::pool::SpotPool;
use crate::memory::MappedElementArray;

/// Thread-safe per-timepoint maximum of spot bounding-sphere radii squared.
#[derive(Debug, Default)]
pub struct RadiusStatistics {
    max_by_timepoint: RwLock<HashMap<i32, f64>>,
}

impl RadiusStatistics {
    /// Creates empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the statistics from scratch.
    pub fn recompute<A: MappedElementArray>(&self, spots: &SpotPool<A>) {
        let mut fresh: HashMap<i32, f64> = HashMap::new();
        for (timepoint, r2) in spots.radii() {
            let max = fresh.entry(timepoint).or_insert(r2);
            *max = max.max(r2);
        }
        debug!(timepoints = fresh.len(), spots = spots.len(), "radius statistics recomputed");
        *self.max_by_timepoint.write() = fresh;
    }

    /// Accounts for one added or grown spot. Shrinking or removing spots is
    /// only reflected by [`RadiusStatistics::recompute`].
    pub fn include(&self, timepoint: i32, radius_squared: f64) {
        let mut map = self.max_by_timepoint.write();
        let max = map.entry(timepoint).or_insert(radius_squared);
        *max = max.max(radius_squared);
    }

    /// Largest bounding-sphere radius squared in `timepoint`, `None` if no
    /// spot of that timepoint has been seen.
    #[must_use]
    pub fn max_radius_squared(&self, timepoint: i32) -> Option<f64> {
        self.max_by_timepoint.read().get(&timepoint).copied()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_recompute_and_include() {
        let mut spots: SpotPool = SpotPool::with_capacity(4).unwrap();
        spots.add_spot(0, [0.0; 3], 1.0).unwrap();
        spots.add_spot(0, [0.0; 3], 3.0).unwrap();
        spots.add_spot(2, [0.0; 3], 2.0).unwrap();

        let stats = RadiusStatistics::new();
        stats.recompute(&spots);
        assert_eq!(stats.max_radius_squared(0), Some(9.0));
        assert_eq!(stats.max_radius_squared(2), Some(4.0));
        assert_eq!(stats.max_radius_squared(1), None);

        stats.include(2, 16.0);
        stats.include(2, 1.0);
        assert_eq!(stats.max_radius_squared(2), Some(16.0));
    }

    #[test]
    fn test_concurrent_readers() {
        let stats = Arc::new(RadiusStatistics::new());
        stats.include(0, 1.0);

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let stats = Arc::clone(&stats);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        let r2 = stats.max_radius_squared(0).unwrap();
                        assert!(r2 >= 1.0);
                    }
                })
            })
            .collect();
        for r2 in 2..100 {
            stats.include(0, f64::from(r2));
        }
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(stats.max_radius_squared(0), Some(99.0));
    }
}
