//! All neighbors within a radius.

use super::Neighbor;
use crate::tree::KdTree;

/// Nodes within a hypersphere around the query point.
#[derive(Debug)]
pub struct RadiusNeighborSearch<'a, const N: usize> {
    tree: &'a KdTree<N>,
    valid_only: bool,
    found: Vec<Neighbor>,
}

impl<'a, const N: usize> RadiusNeighborSearch<'a, N> {
    /// Creates a search over `tree`.
    #[must_use]
    pub fn new(tree: &'a KdTree<N>) -> Self {
        Self {
            tree,
            valid_only: false,
            found: Vec::new(),
        }
    }

    /// Restricts results to valid nodes.
    #[must_use]
    pub fn valid_only(mut self) -> Self {
        self.valid_only = true;
        self
    }

    /// Finds all nodes with `|p - query| <= radius`. With `sort` the results
    /// are ascending by squared distance, otherwise in traversal order.
    pub fn search(&mut self, query: &[f64; N], radius: f64, sort: bool) -> &[Neighbor] {
        self.found.clear();
        let squared_radius = radius * radius;
        if let Some(root) = self.tree.root() {
            self.descend(root, query, squared_radius);
        }
        if sort {
            self.found
                .sort_by(|a, b| a.squared_distance.total_cmp(&b.squared_distance));
        }
        &self.found
    }

    /// Results of the last search.
    #[must_use]
    pub fn results(&self) -> &[Neighbor] {
        &self.found
    }

    fn descend(&mut self, node: usize, query: &[f64; N], squared_radius: f64) {
        let tree = self.tree;
        let view = tree.view(node);
        let dim = view.split_dimension();
        let axis_diff = query[dim] - view.coordinate(dim);

        if !self.valid_only || view.is_valid() {
            let squared_distance = view.squared_distance_to(query);
            if squared_distance <= squared_radius {
                self.found.push(Neighbor {
                    node,
                    data_index: view.data_index(),
                    squared_distance,
                });
            }
        }

        let (near, far) = if axis_diff < 0.0 {
            (view.left(), view.right())
        } else {
            (view.right(), view.left())
        };
        if let Some(near) = near {
            self.descend(near, query, squared_radius);
        }
        if let Some(far) = far {
            if axis_diff * axis_diff <= squared_radius {
                self.descend(far, query, squared_radius);
            }
        }
    }
}
