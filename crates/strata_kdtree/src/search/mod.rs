//! # Spatial Queries
//!
//! Branch-and-bound searches over a [`KdTree`](crate::KdTree). All distances
//! are squared; no query takes a square root.
//!
//! Each search comes in a plain and a valid-only flavor. Valid-only searches
//! still descend through invalid nodes, since an invalid node may separate
//! valid ones, but never report one.

mod k_nearest;
mod nearest;
mod radius;

pub use k_nearest::KNearestNeighborSearch;
pub use nearest::{NearestNeighborSearch, NearestValidNeighborSearch};
pub use radius::RadiusNeighborSearch;

/// One search hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Node slot in the tree.
    pub node: usize,
    /// Source slot the node was built from.
    pub data_index: usize,
    /// Squared distance to the query point.
    pub squared_distance: f64,
}
