//! # STRATA KD-Tree
//!
//! A KD-tree whose nodes are pool records:
//! - Built once over a snapshot of positions from any [`Localizable`] pool
//! - Linked by slot indices, never by pointers
//! - Points are removed by flagging nodes invalid, without restructuring
//!
//! ## Queries
//!
//! | query | type |
//! |---|---|
//! | nearest | [`NearestNeighborSearch`] |
//! | nearest valid | [`NearestValidNeighborSearch`] |
//! | k nearest | [`KNearestNeighborSearch`] |
//! | within radius | [`RadiusNeighborSearch`] |
//! | inside convex polytope | [`ClipConvexPolytope`] |
//! | above/below hyperplane | [`SplitHyperPlane`] |
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_kdtree::{KdTree, NearestValidNeighborSearch};
//!
//! let mut tree = KdTree::<3>::build(spots.pool(), &spots.slots_at_timepoint(0))?;
//! tree.set_valid_data(slot, false)?;
//!
//! let mut search = NearestValidNeighborSearch::new(&tree);
//! if let Some(hit) = search.search(&[1.0, 2.0, 3.0]) {
//!     println!("slot {} at d² = {}", hit.data_index, hit.squared_distance);
//! }
//! ```
//!
//! [`Localizable`]: strata_pool::Localizable

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod clip;
pub mod error;
pub mod iter;
pub mod node;
pub mod search;
pub mod tree;

pub use clip::{ClipConvexPolytope, ConvexPolytope, HalfSpace, SplitHyperPlane};
pub use error::{KdTreeError, KdTreeResult};
pub use iter::{ValidValueIter, ValidValues};
pub use node::{KdTreeNode, NodeView};
pub use search::{
    KNearestNeighborSearch, NearestNeighborSearch, NearestValidNeighborSearch, Neighbor,
    RadiusNeighborSearch,
};
pub use tree::KdTree;
