//! # Spots
//!
//! Ellipsoidal detections stored in a pool, one record per spot, plus the
//! per-timepoint radius statistics used by spatial queries.

mod eigen;
mod pool;
mod record;
mod stats;

pub use eigen::max_eigenvalue_symmetric3;
pub use pool::SpotPool;
pub use record::Spot;
pub use stats::RadiusStatistics;
