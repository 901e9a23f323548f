//! # Valid-Value Iteration
//!
//! Walks a mix of single nodes and whole subtrees, yielding the source slot
//! of every valid node reached. Invalid nodes are still expanded, so a valid
//! node below an invalid one is not lost.
//!
//! Order is deterministic for a fixed tree and validity pattern: the pending
//! stack is drained first (left pushed before right, so right pops first),
//! then the next subtree root is expanded, then the next single node is
//! visited.

use crate::tree::KdTree;

/// Single nodes plus subtree roots of one tree, iterable as source slots.
#[derive(Debug, Clone, Copy)]
pub struct ValidValues<'a, const N: usize> {
    tree: &'a KdTree<N>,
    nodes: &'a [usize],
    subtrees: &'a [usize],
}

impl<'a, const N: usize> ValidValues<'a, N> {
    /// Combines single `nodes` and `subtrees` roots of `tree`.
    ///
    /// # Panics
    ///
    /// Panics if a slot is outside `0..tree.len()`.
    #[must_use]
    pub fn new(tree: &'a KdTree<N>, nodes: &'a [usize], subtrees: &'a [usize]) -> Self {
        let len = tree.len();
        if let Some(slot) = nodes.iter().chain(subtrees).find(|&&slot| slot >= len) {
            panic!("node {slot} out of range (tree has {len} nodes)");
        }
        Self {
            tree,
            nodes,
            subtrees,
        }
    }

    /// Starts a fresh pass.
    #[must_use]
    pub fn iter(&self) -> ValidValueIter<'a, N> {
        ValidValueIter {
            tree: self.tree,
            nodes: self.nodes.iter(),
            subtrees: self.subtrees.iter(),
            stack: Vec::new(),
        }
    }
}

impl<'a, const N: usize> IntoIterator for ValidValues<'a, N> {
    type Item = usize;
    type IntoIter = ValidValueIter<'a, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, const N: usize> IntoIterator for &ValidValues<'a, N> {
    type Item = usize;
    type IntoIter = ValidValueIter<'a, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Single-pass iterator over the source slots of valid nodes.
#[derive(Debug)]
pub struct ValidValueIter<'a, const N: usize> {
    tree: &'a KdTree<N>,
    nodes: std::slice::Iter<'a, usize>,
    subtrees: std::slice::Iter<'a, usize>,
    stack: Vec<usize>,
}

impl<const N: usize> ValidValueIter<'_, N> {
    fn expand(&mut self, node: usize) {
        let view = self.tree.view(node);
        if let Some(left) = view.left() {
            self.stack.push(left);
        }
        if let Some(right) = view.right() {
            self.stack.push(right);
        }
    }
}

impl<const N: usize> Iterator for ValidValueIter<'_, N> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            let node = if let Some(node) = self.stack.pop() {
                self.expand(node);
                node
            } else if let Some(&root) = self.subtrees.next() {
                self.expand(root);
                root
            } else {
                *self.nodes.next()?
            };

            let view = self.tree.view(node);
            if view.is_valid() {
                return Some(view.data_index());
            }
        }
    }
}
