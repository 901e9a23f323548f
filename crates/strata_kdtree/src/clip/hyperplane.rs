//! Splitting by a single hyperplane.

use super::{HalfSpace, Side};
use crate::iter::ValidValues;
use crate::tree::KdTree;

/// Splits a tree into the nodes above (`normal · p - offset >= 0`) and below
/// a hyperplane.
#[derive(Debug)]
pub struct SplitHyperPlane<'a, const N: usize> {
    tree: &'a KdTree<N>,
    above_nodes: Vec<usize>,
    above_subtrees: Vec<usize>,
    below_nodes: Vec<usize>,
    below_subtrees: Vec<usize>,
}

impl<'a, const N: usize> SplitHyperPlane<'a, N> {
    /// Creates a splitter over `tree`.
    #[must_use]
    pub fn new(tree: &'a KdTree<N>) -> Self {
        Self {
            tree,
            above_nodes: Vec::new(),
            above_subtrees: Vec::new(),
            below_nodes: Vec::new(),
            below_subtrees: Vec::new(),
        }
    }

    /// Classifies every node of the tree against `plane`, replacing the
    /// previous results.
    pub fn split(&mut self, plane: &HalfSpace<N>) {
        self.above_nodes.clear();
        self.above_subtrees.clear();
        self.below_nodes.clear();
        self.below_subtrees.clear();

        if let (Some(root), Some((lo, hi))) = (self.tree.root(), self.tree.bounds()) {
            self.split_subtree(root, lo, hi, plane);
        }
    }

    fn split_subtree(&mut self, node: usize, lo: [f64; N], hi: [f64; N], plane: &HalfSpace<N>) {
        match plane.classify_box(&lo, &hi) {
            Side::Inside => self.above_subtrees.push(node),
            Side::Outside => self.below_subtrees.push(node),
            Side::Straddling => {
                let tree = self.tree;
                let view = tree.view(node);
                let position = view.position();
                if plane.contains(&position) {
                    self.above_nodes.push(node);
                } else {
                    self.below_nodes.push(node);
                }

                let dim = view.split_dimension();
                if let Some(left) = view.left() {
                    let mut left_hi = hi;
                    left_hi[dim] = position[dim];
                    self.split_subtree(left, lo, left_hi, plane);
                }
                if let Some(right) = view.right() {
                    let mut right_lo = lo;
                    right_lo[dim] = position[dim];
                    self.split_subtree(right, right_lo, hi, plane);
                }
            }
        }
    }

    /// Single nodes found above.
    #[must_use]
    pub fn above_nodes(&self) -> &[usize] {
        &self.above_nodes
    }

    /// Roots of subtrees lying entirely above.
    #[must_use]
    pub fn above_subtrees(&self) -> &[usize] {
        &self.above_subtrees
    }

    /// Single nodes found below.
    #[must_use]
    pub fn below_nodes(&self) -> &[usize] {
        &self.below_nodes
    }

    /// Roots of subtrees lying entirely below.
    #[must_use]
    pub fn below_subtrees(&self) -> &[usize] {
        &self.below_subtrees
    }

    /// Source slots of the valid nodes above.
    #[must_use]
    pub fn above_values(&self) -> ValidValues<'_, N> {
        ValidValues::new(self.tree, &self.above_nodes, &self.above_subtrees)
    }

    /// Source slots of the valid nodes below.
    #[must_use]
    pub fn below_values(&self) -> ValidValues<'_, N> {
        ValidValues::new(self.tree, &self.below_nodes, &self.below_subtrees)
    }
}
