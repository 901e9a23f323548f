//! Single nearest neighbor.

use super::Neighbor;
use crate::tree::KdTree;

/// Nearest node to a query point, valid or not.
#[derive(Debug)]
pub struct NearestNeighborSearch<'a, const N: usize> {
    tree: &'a KdTree<N>,
    best: Option<Neighbor>,
}

impl<'a, const N: usize> NearestNeighborSearch<'a, N> {
    /// Creates a search over `tree`.
    #[must_use]
    pub fn new(tree: &'a KdTree<N>) -> Self {
        Self { tree, best: None }
    }

    /// Finds the node nearest to `query`. `None` only for an empty tree.
    pub fn search(&mut self, query: &[f64; N]) -> Option<Neighbor> {
        self.best = nearest(self.tree, query, false);
        self.best
    }

    /// Result of the last search.
    #[must_use]
    pub fn best(&self) -> Option<Neighbor> {
        self.best
    }
}

/// Nearest valid node to a query point.
#[derive(Debug)]
pub struct NearestValidNeighborSearch<'a, const N: usize> {
    tree: &'a KdTree<N>,
    best: Option<Neighbor>,
}

impl<'a, const N: usize> NearestValidNeighborSearch<'a, N> {
    /// Creates a search over `tree`.
    #[must_use]
    pub fn new(tree: &'a KdTree<N>) -> Self {
        Self { tree, best: None }
    }

    /// Finds the valid node nearest to `query`. `None` if the tree has no
    /// valid node.
    pub fn search(&mut self, query: &[f64; N]) -> Option<Neighbor> {
        self.best = if self.tree.valid_len() == 0 {
            None
        } else {
            nearest(self.tree, query, true)
        };
        self.best
    }

    /// Result of the last search.
    #[must_use]
    pub fn best(&self) -> Option<Neighbor> {
        self.best
    }
}

fn nearest<const N: usize>(tree: &KdTree<N>, query: &[f64; N], valid_only: bool) -> Option<Neighbor> {
    let mut best = None;
    if let Some(root) = tree.root() {
        descend(tree, root, query, valid_only, &mut best);
    }
    best
}

fn descend<const N: usize>(
    tree: &KdTree<N>,
    node: usize,
    query: &[f64; N],
    valid_only: bool,
    best: &mut Option<Neighbor>,
) {
    let view = tree.view(node);
    let dim = view.split_dimension();
    let axis_diff = query[dim] - view.coordinate(dim);

    if !valid_only || view.is_valid() {
        let squared_distance = view.squared_distance_to(query);
        if best.map_or(true, |b| squared_distance < b.squared_distance) {
            *best = Some(Neighbor {
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
        descend(tree, near, query, valid_only, best);
    }
    if let Some(far) = far {
        if best.map_or(true, |b| axis_diff * axis_diff < b.squared_distance) {
            descend(tree, far, query, valid_only, best);
        }
    }
}
