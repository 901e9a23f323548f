//! The `k` nearest neighbors.

use super::Neighbor;
use crate::tree::KdTree;

/// Up to `k` nearest nodes, ascending by squared distance.
#[derive(Debug)]
pub struct KNearestNeighborSearch<'a, const N: usize> {
    tree: &'a KdTree<N>,
    k: usize,
    valid_only: bool,
    found: Vec<Neighbor>,
}

impl<'a, const N: usize> KNearestNeighborSearch<'a, N> {
    /// Creates a search for the `k` nearest nodes of `tree`.
    #[must_use]
    pub fn new(tree: &'a KdTree<N>, k: usize) -> Self {
        Self {
            tree,
            k,
            valid_only: false,
            found: Vec::with_capacity(k),
        }
    }

    /// Restricts results to valid nodes.
    #[must_use]
    pub fn valid_only(mut self) -> Self {
        self.valid_only = true;
        self
    }

    /// Finds up to `k` nodes nearest to `query`, ascending by squared
    /// distance. Equal distances keep discovery order.
    pub fn search(&mut self, query: &[f64; N]) -> &[Neighbor] {
        self.found.clear();
        if self.k > 0 {
            if let Some(root) = self.tree.root() {
                self.descend(root, query);
            }
        }
        &self.found
    }

    /// Results of the last search.
    #[must_use]
    pub fn results(&self) -> &[Neighbor] {
        &self.found
    }

    fn worst(&self) -> f64 {
        if self.found.len() < self.k {
            f64::INFINITY
        } else {
            self.found.last().map_or(f64::INFINITY, |n| n.squared_distance)
        }
    }

    fn offer(&mut self, candidate: Neighbor) {
        if candidate.squared_distance >= self.worst() {
            return;
        }
        let at = self
            .found
            .partition_point(|n| n.squared_distance <= candidate.squared_distance);
        if self.found.len() == self.k {
            self.found.pop();
        }
        self.found.insert(at, candidate);
    }

    fn descend(&mut self, node: usize, query: &[f64; N]) {
        let tree = self.tree;
        let view = tree.view(node);
        let dim = view.split_dimension();
        let axis_diff = query[dim] - view.coordinate(dim);

        if !self.valid_only || view.is_valid() {
            self.offer(Neighbor {
                node,
                data_index: view.data_index(),
                squared_distance: view.squared_distance_to(query),
            });
        }

        let (near, far) = if axis_diff < 0.0 {
            (view.left(), view.right())
        } else {
            (view.right(), view.left())
        };
        if let Some(near) = near {
            self.descend(near, query);
        }
        if let Some(far) = far {
            if axis_diff * axis_diff < self.worst() {
                self.descend(far, query);
            }
        }
    }
}
