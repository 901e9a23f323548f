//! Clipping by an intersection of half-spaces.

use super::{HalfSpace, Side};
use crate::iter::ValidValues;
use crate::tree::KdTree;

/// A convex region given as the intersection of half-spaces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvexPolytope<const N: usize> {
    planes: Vec<HalfSpace<N>>,
}

impl<const N: usize> ConvexPolytope<N> {
    /// Creates the polytope bounded by `planes`. No planes means all space.
    #[must_use]
    pub fn new(planes: Vec<HalfSpace<N>>) -> Self {
        Self { planes }
    }

    /// The bounding half-spaces.
    #[must_use]
    pub fn planes(&self) -> &[HalfSpace<N>] {
        &self.planes
    }

    /// Whether `p` lies in every half-space.
    #[must_use]
    pub fn contains(&self, p: &[f64; N]) -> bool {
        self.planes.iter().all(|h| h.contains(p))
    }
}

/// Splits a tree into the nodes inside and outside a [`ConvexPolytope`].
#[derive(Debug)]
pub struct ClipConvexPolytope<'a, const N: usize> {
    tree: &'a KdTree<N>,
    inside_nodes: Vec<usize>,
    inside_subtrees: Vec<usize>,
    outside_nodes: Vec<usize>,
    outside_subtrees: Vec<usize>,
}

impl<'a, const N: usize> ClipConvexPolytope<'a, N> {
    /// Creates a clipper over `tree`.
    #[must_use]
    pub fn new(tree: &'a KdTree<N>) -> Self {
        Self {
            tree,
            inside_nodes: Vec::new(),
            inside_subtrees: Vec::new(),
            outside_nodes: Vec::new(),
            outside_subtrees: Vec::new(),
        }
    }

    /// Classifies every node of the tree against `polytope`, replacing the
    /// previous results.
    pub fn clip(&mut self, polytope: &ConvexPolytope<N>) {
        self.inside_nodes.clear();
        self.inside_subtrees.clear();
        self.outside_nodes.clear();
        self.outside_subtrees.clear();

        let (Some(root), Some((lo, hi))) = (self.tree.root(), self.tree.bounds()) else {
            return;
        };
        let active: Vec<usize> = (0..polytope.planes.len()).collect();
        self.clip_subtree(root, lo, hi, &polytope.planes, &active);
    }

    fn clip_subtree(
        &mut self,
        node: usize,
        lo: [f64; N],
        hi: [f64; N],
        planes: &[HalfSpace<N>],
        active: &[usize],
    ) {
        let mut straddling = Vec::with_capacity(active.len());
        for &i in active {
            match planes[i].classify_box(&lo, &hi) {
                Side::Outside => {
                    self.outside_subtrees.push(node);
                    return;
                }
                Side::Inside => {}
                Side::Straddling => straddling.push(i),
            }
        }
        if straddling.is_empty() {
            self.inside_subtrees.push(node);
            return;
        }

        let tree = self.tree;
        let view = tree.view(node);
        let position = view.position();
        if straddling.iter().all(|&i| planes[i].contains(&position)) {
            self.inside_nodes.push(node);
        } else {
            self.outside_nodes.push(node);
        }

        let dim = view.split_dimension();
        let split = position[dim];
        if let Some(left) = view.left() {
            let mut left_hi = hi;
            left_hi[dim] = split;
            self.clip_subtree(left, lo, left_hi, planes, &straddling);
        }
        if let Some(right) = view.right() {
            let mut right_lo = lo;
            right_lo[dim] = split;
            self.clip_subtree(right, right_lo, hi, planes, &straddling);
        }
    }

    /// Single nodes found inside.
    #[must_use]
    pub fn inside_nodes(&self) -> &[usize] {
        &self.inside_nodes
    }

    /// Roots of subtrees lying entirely inside.
    #[must_use]
    pub fn inside_subtrees(&self) -> &[usize] {
        &self.inside_subtrees
    }

    /// Single nodes found outside.
    #[must_use]
    pub fn outside_nodes(&self) -> &[usize] {
        &self.outside_nodes
    }

    /// Roots of subtrees lying entirely outside.
    #[must_use]
    pub fn outside_subtrees(&self) -> &[usize] {
        &self.outside_subtrees
    }

    /// Source slots of the valid nodes inside.
    #[must_use]
    pub fn inside_values(&self) -> ValidValues<'_, N> {
        ValidValues::new(self.tree, &self.inside_nodes, &self.inside_subtrees)
    }

    /// Source slots of the valid nodes outside.
    #[must_use]
    pub fn outside_values(&self) -> ValidValues<'_, N> {
        ValidValues::new(self.tree, &self.outside_nodes, &self.outside_subtrees)
    }
}
