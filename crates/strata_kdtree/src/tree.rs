//! # KD-Tree
//!
//! A balanced KD-tree over a snapshot of positions from a source pool.
//!
//! ## Layout
//!
//! Nodes are stored in-order: the node in slot `m` has its whole left
//! subtree in slots below `m` and its right subtree above. Every edge is a
//! slot index, so the tree can be walked, copied or iterated without
//! following any reference.
//!
//! ## Invalidation
//!
//! The structure is fixed once built. Removing a point only flips its
//! invalid flag; valid-only queries and iterators skip flagged nodes while
//! still descending through them.

use std::collections::{HashMap, HashSet};

use strata_pool::{
    Field, Localizable, MappedElementArray, Pool, PoolConfig, PoolError, PoolObject,
};
use tracing::{debug, trace};

use crate::error::{KdTreeError, KdTreeResult};
use crate::iter::ValidValues;
use crate::node::{KdTreeNode, NodeView};

/// Snapshot of the source pool a tree was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SourceStamp {
    modification_count: u64,
}

/// An `N`-dimensional KD-tree whose nodes live in a [`Pool`].
#[derive(Debug)]
pub struct KdTree<const N: usize> {
    nodes: Pool<KdTreeNode<N>>,
    root: Option<usize>,
    bounds: Option<([f64; N], [f64; N])>,
    data_to_node: HashMap<usize, usize>,
    valid_len: usize,
    stamp: SourceStamp,
}

impl<const N: usize> KdTree<N> {
    /// Builds a tree over the records in `slots` of `source`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidHandle`] (wrapped) if a slot is not
    /// allocated in `source`, [`PoolError::IndexOverflow`] (wrapped) if it
    /// does not fit a node's index field, or [`KdTreeError::DuplicateSlot`]
    /// if a slot is listed twice.
    pub fn build<O, A>(source: &Pool<O, A>, slots: &[usize]) -> KdTreeResult<Self>
    where
        O: Localizable<N>,
        A: MappedElementArray,
    {
        let config = PoolConfig::with_initial_capacity(slots.len().max(1));
        let mut tree = Self {
            nodes: Pool::new(&config)?,
            root: None,
            bounds: None,
            data_to_node: HashMap::new(),
            valid_len: 0,
            stamp: SourceStamp {
                modification_count: source.modification_count(),
            },
        };
        tree.rebuild(source, slots)?;
        Ok(tree)
    }

    /// Builds a tree over every record of `source`.
    ///
    /// # Errors
    ///
    /// See [`KdTree::build`].
    pub fn build_all<O, A>(source: &Pool<O, A>) -> KdTreeResult<Self>
    where
        O: Localizable<N>,
        A: MappedElementArray,
    {
        let slots: Vec<usize> = (0..source.len()).collect();
        Self::build(source, &slots)
    }

    /// Rebuilds the tree in place over `slots` of `source`, reusing the node
    /// storage. All nodes start valid.
    ///
    /// # Errors
    ///
    /// See [`KdTree::build`]. The tree is unchanged if `slots` is rejected.
    pub fn rebuild<O, A>(&mut self, source: &Pool<O, A>, slots: &[usize]) -> KdTreeResult<()>
    where
        O: Localizable<N>,
        A: MappedElementArray,
    {
        let mut seen = HashSet::with_capacity(slots.len());
        let mut points = Vec::with_capacity(slots.len());
        for &slot in slots {
            if !seen.insert(slot) {
                return Err(KdTreeError::DuplicateSlot(slot));
            }
            if i32::try_from(slot).is_err() {
                return Err(PoolError::IndexOverflow(slot).into());
            }
            points.push(O::position(&source.access_at(slot)?));
        }

        self.reset();
        if let Err(err) = self.fill(&points, slots) {
            self.reset();
            return Err(err.into());
        }
        self.stamp = SourceStamp {
            modification_count: source.modification_count(),
        };

        debug!(nodes = slots.len(), dimensions = N, "kd-tree built");
        Ok(())
    }

    /// Rebuilds the tree in place over every record of `source`.
    ///
    /// # Errors
    ///
    /// See [`KdTree::build`].
    pub fn rebuild_all<O, A>(&mut self, source: &Pool<O, A>) -> KdTreeResult<()>
    where
        O: Localizable<N>,
        A: MappedElementArray,
    {
        let slots: Vec<usize> = (0..source.len()).collect();
        self.rebuild(source, &slots)
    }

    /// Whether records of `source` have been freed or relocated since the
    /// tree was built, so that data indices may no longer name the same
    /// records. Position edits are not tracked.
    #[must_use]
    pub fn is_stale<O: PoolObject, A: MappedElementArray>(&self, source: &Pool<O, A>) -> bool {
        source.modification_count() != self.stamp.modification_count
    }

    /// Returns the number of nodes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Checks if the tree has no nodes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of valid nodes.
    #[inline]
    #[must_use]
    pub fn valid_len(&self) -> usize {
        self.valid_len
    }

    /// Slot of the root node, `None` for an empty tree.
    #[inline]
    #[must_use]
    pub fn root(&self) -> Option<usize> {
        self.root
    }

    /// Per-dimension `(min, max)` over all points, `None` for an empty tree.
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> Option<([f64; N], [f64; N])> {
        self.bounds
    }

    /// The node storage.
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &Pool<KdTreeNode<N>> {
        &self.nodes
    }

    /// Read-only view of `node`.
    ///
    /// # Errors
    ///
    /// Returns [`KdTreeError::NodeOutOfRange`].
    pub fn node(&self, node: usize) -> KdTreeResult<NodeView<'_, N>> {
        self.check(node)?;
        Ok(self.view(node))
    }

    /// Coordinates of `node`.
    ///
    /// # Errors
    ///
    /// Returns [`KdTreeError::NodeOutOfRange`].
    pub fn position(&self, node: usize) -> KdTreeResult<[f64; N]> {
        Ok(self.node(node)?.position())
    }

    /// Left child of `node`.
    ///
    /// # Errors
    ///
    /// Returns [`KdTreeError::NodeOutOfRange`].
    pub fn left(&self, node: usize) -> KdTreeResult<Option<usize>> {
        Ok(self.node(node)?.left())
    }

    /// Right child of `node`.
    ///
    /// # Errors
    ///
    /// Returns [`KdTreeError::NodeOutOfRange`].
    pub fn right(&self, node: usize) -> KdTreeResult<Option<usize>> {
        Ok(self.node(node)?.right())
    }

    /// Source slot `node` was built from.
    ///
    /// # Errors
    ///
    /// Returns [`KdTreeError::NodeOutOfRange`].
    pub fn data_index(&self, node: usize) -> KdTreeResult<usize> {
        Ok(self.node(node)?.data_index())
    }

    /// Dimension `node` splits on.
    ///
    /// # Errors
    ///
    /// Returns [`KdTreeError::NodeOutOfRange`].
    pub fn split_dimension(&self, node: usize) -> KdTreeResult<usize> {
        Ok(self.node(node)?.split_dimension())
    }

    /// Whether `node` takes part in valid-only queries.
    ///
    /// # Errors
    ///
    /// Returns [`KdTreeError::NodeOutOfRange`].
    pub fn is_valid(&self, node: usize) -> KdTreeResult<bool> {
        Ok(self.node(node)?.is_valid())
    }

    /// Node built from source slot `data_index`.
    #[inline]
    #[must_use]
    pub fn node_of(&self, data_index: usize) -> Option<usize> {
        self.data_to_node.get(&data_index).copied()
    }

    /// Marks `node` valid or invalid. The tree structure is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`KdTreeError::NodeOutOfRange`].
    pub fn set_valid(&mut self, node: usize, valid: bool) -> KdTreeResult<()> {
        let view = self.node(node)?;
        if view.is_valid() == valid {
            return Ok(());
        }
        let flags = KdTreeNode::<N>::pack_flags(view.split_dimension(), !valid);
        self.nodes.set_at(node, KdTreeNode::<N>::FLAGS, flags)?;
        if valid {
            self.valid_len += 1;
        } else {
            self.valid_len -= 1;
        }
        trace!(node, valid, "kd-tree node validity changed");
        Ok(())
    }

    /// Marks the node built from source slot `data_index` valid or invalid.
    ///
    /// # Errors
    ///
    /// Returns [`KdTreeError::NotInTree`].
    pub fn set_valid_data(&mut self, data_index: usize, valid: bool) -> KdTreeResult<()> {
        let node = self
            .node_of(data_index)
            .ok_or(KdTreeError::NotInTree(data_index))?;
        self.set_valid(node, valid)
    }

    /// Marks every node valid.
    ///
    /// # Errors
    ///
    /// Returns [`KdTreeError::Pool`] if the node storage is inconsistent.
    pub fn validate_all(&mut self) -> KdTreeResult<()> {
        for node in 0..self.len() {
            self.set_valid(node, true)?;
        }
        Ok(())
    }

    /// Source slots of all valid nodes.
    #[must_use]
    pub fn valid_values(&self) -> ValidValues<'_, N> {
        ValidValues::new(self, &[], self.root.as_slice())
    }

    /// Unchecked view for traversal code that only follows tree edges.
    #[inline]
    pub(crate) fn view(&self, node: usize) -> NodeView<'_, N> {
        NodeView::new(self.nodes.memory().data().element(node))
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.bounds = None;
        self.data_to_node.clear();
        self.valid_len = 0;
    }

    fn fill(&mut self, points: &[[f64; N]], slots: &[usize]) -> Result<(), PoolError> {
        for _ in 0..slots.len() {
            self.nodes.allocate()?;
        }
        let mut order: Vec<usize> = (0..slots.len()).collect();
        let builder = Builder { points, slots };
        self.root = builder.build(&mut self.nodes, &mut order, 0)?;
        self.bounds = bounding_box(points);
        self.data_to_node = (0..slots.len())
            .map(|node| (self.view(node).data_index(), node))
            .collect();
        self.valid_len = slots.len();
        Ok(())
    }

    #[inline]
    fn check(&self, node: usize) -> KdTreeResult<()> {
        if node < self.len() {
            Ok(())
        } else {
            Err(KdTreeError::NodeOutOfRange {
                node,
                size: self.len(),
            })
        }
    }
}

/// Recursive median-of-spread construction.
struct Builder<'a, const N: usize> {
    points: &'a [[f64; N]],
    slots: &'a [usize],
}

impl<const N: usize> Builder<'_, N> {
    /// Builds the subtree over `order`, whose entries occupy node slots
    /// starting at `first`. Returns the subtree root.
    fn build(
        &self,
        nodes: &mut Pool<KdTreeNode<N>>,
        order: &mut [usize],
        first: usize,
    ) -> Result<Option<usize>, PoolError> {
        if order.is_empty() {
            return Ok(None);
        }

        let dim = self.widest_dimension(order);
        let median = order.len() / 2;
        order.select_nth_unstable_by(median, |&a, &b| {
            self.points[a][dim].total_cmp(&self.points[b][dim])
        });

        let (lower, rest) = order.split_at_mut(median);
        let (pivot, upper) = rest.split_at_mut(1);
        let slot = first + median;
        let left = self.build(nodes, lower, first)?;
        let right = self.build(nodes, upper, slot + 1)?;

        let point = pivot[0];
        let mut access = nodes.access_at_mut(slot)?;
        KdTreeNode::<N>::POSITION.put(&mut access, self.points[point]);
        KdTreeNode::<N>::LEFT.put_slot(&mut access, left)?;
        KdTreeNode::<N>::RIGHT.put_slot(&mut access, right)?;
        KdTreeNode::<N>::DATA_INDEX.put_slot(&mut access, Some(self.slots[point]))?;
        KdTreeNode::<N>::FLAGS.put(&mut access, KdTreeNode::<N>::pack_flags(dim, false));
        Ok(Some(slot))
    }

    /// Dimension with the largest `max - min` over `order`. Ties go to the
    /// lowest dimension.
    fn widest_dimension(&self, order: &[usize]) -> usize {
        let mut best = (0, f64::NEG_INFINITY);
        for d in 0..N {
            let (lo, hi) = order.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                let x = self.points[i][d];
                (lo.min(x), hi.max(x))
            });
            let spread = hi - lo;
            if spread > best.1 {
                best = (d, spread);
            }
        }
        best.0
    }
}

fn bounding_box<const N: usize>(points: &[[f64; N]]) -> Option<([f64; N], [f64; N])> {
    let first = *points.first()?;
    Some(points.iter().fold((first, first), |(mut lo, mut hi), p| {
        for ((l, h), x) in lo.iter_mut().zip(hi.iter_mut()).zip(p) {
            *l = l.min(*x);
            *h = h.max(*x);
        }
        (lo, hi)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_pool::DoubleArrayField;

    struct P2;

    impl P2 {
        const XY: DoubleArrayField<2> = DoubleArrayField::at(0);
    }

    impl PoolObject for P2 {
        const SIZE_IN_BYTES: usize = Self::XY.end();
    }

    impl Localizable<2> for P2 {
        fn position(access: &strata_pool::MappedElement<'_>) -> [f64; 2] {
            Self::XY.get(access)
        }
    }

    fn source(points: &[[f64; 2]]) -> Pool<P2> {
        let mut pool = Pool::with_capacity(points.len().max(1)).unwrap();
        for p in points {
            let slot = pool.allocate().unwrap();
            pool.set_at(slot, P2::XY, *p).unwrap();
        }
        pool
    }

    /// Checks the in-order layout and the split invariant for the subtree at
    /// `node`, returning the slot range it covers.
    fn check_subtree(tree: &KdTree<2>, node: usize) -> (usize, usize) {
        let view = tree.view(node);
        let d = view.split_dimension();
        let split = view.coordinate(d);
        let mut lo = node;
        let mut hi = node;
        if let Some(left) = view.left() {
            assert!(left < node);
            let (a, b) = check_subtree(tree, left);
            assert_eq!(b + 1, node);
            for n in a..=b {
                assert!(tree.view(n).coordinate(d) <= split);
            }
            lo = a;
        }
        if let Some(right) = view.right() {
            assert!(right > node);
            let (a, b) = check_subtree(tree, right);
            assert_eq!(a, node + 1);
            for n in a..=b {
                assert!(tree.view(n).coordinate(d) >= split);
            }
            hi = b;
        }
        (lo, hi)
    }

    #[test]
    fn test_in_order_layout() {
        let points: Vec<[f64; 2]> = (0..37)
            .map(|i| {
                let x = f64::from(i);
                [(x * 7.3) % 11.0, (x * 3.1) % 5.0]
            })
            .collect();
        let pool = source(&points);
        let tree = KdTree::<2>::build_all(&pool).unwrap();

        assert_eq!(tree.len(), 37);
        let root = tree.root().unwrap();
        assert_eq!(check_subtree(&tree, root), (0, 36));

        for slot in 0..37 {
            let node = tree.node_of(slot).unwrap();
            assert_eq!(tree.data_index(node).unwrap(), slot);
            assert_eq!(tree.position(node).unwrap(), points[slot]);
        }
    }

    #[test]
    fn test_split_on_widest_dimension() {
        let pool = source(&[[0.0, 0.0], [1.0, 100.0], [2.0, 50.0]]);
        let tree = KdTree::<2>::build_all(&pool).unwrap();
        let root = tree.root().unwrap();
        assert_eq!(tree.split_dimension(root).unwrap(), 1);
        assert_eq!(tree.position(root).unwrap(), [2.0, 50.0]);
    }

    #[test]
    fn test_empty_tree() {
        let pool = source(&[]);
        let tree = KdTree::<2>::build_all(&pool).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        assert_eq!(tree.bounds(), None);
        assert_eq!(tree.valid_values().into_iter().count(), 0);
        assert_eq!(
            tree.position(0),
            Err(KdTreeError::NodeOutOfRange { node: 0, size: 0 })
        );
    }

    #[test]
    fn test_validity_bookkeeping() {
        let pool = source(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]);
        let mut tree = KdTree::<2>::build_all(&pool).unwrap();
        assert_eq!(tree.valid_len(), 3);

        tree.set_valid_data(1, false).unwrap();
        tree.set_valid_data(1, false).unwrap();
        assert_eq!(tree.valid_len(), 2);
        let node = tree.node_of(1).unwrap();
        assert!(!tree.is_valid(node).unwrap());

        // The split dimension survives the flag flip.
        let dim = tree.split_dimension(node).unwrap();
        tree.set_valid(node, true).unwrap();
        assert_eq!(tree.split_dimension(node).unwrap(), dim);
        assert_eq!(tree.valid_len(), 3);

        assert_eq!(tree.set_valid_data(9, false), Err(KdTreeError::NotInTree(9)));
    }

    #[test]
    fn test_staleness_and_rebuild() {
        let mut pool = source(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]);
        let mut tree = KdTree::<2>::build_all(&pool).unwrap();
        assert!(!tree.is_stale(&pool));

        pool.delete_index(0).unwrap();
        assert!(tree.is_stale(&pool));

        tree.rebuild_all(&pool).unwrap();
        assert!(!tree.is_stale(&pool));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.bounds(), Some(([1.0, 1.0], [2.0, 2.0])));
    }

    #[test]
    fn test_rebuild_rejects_duplicate_slot() {
        let pool = source(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]);
        let mut tree = KdTree::<2>::build_all(&pool).unwrap();

        assert_eq!(tree.rebuild(&pool, &[0, 2, 0]), Err(KdTreeError::DuplicateSlot(0)));
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.valid_len(), 3);
        assert_eq!(tree.node_of(1).map(|n| tree.data_index(n).unwrap()), Some(1));

        assert_eq!(
            KdTree::<2>::build(&pool, &[1, 1]).unwrap_err(),
            KdTreeError::DuplicateSlot(1)
        );
    }

    #[test]
    fn test_build_rejects_slot_beyond_index_range() {
        let pool = source(&[[0.0, 0.0]]);
        let too_big = usize::try_from(i32::MAX).unwrap() + 1;
        assert_eq!(
            KdTree::<2>::build(&pool, &[0, too_big]).unwrap_err(),
            KdTreeError::Pool(PoolError::IndexOverflow(too_big))
        );
    }

    #[test]
    fn test_build_rejects_unallocated_slot() {
        let pool = source(&[[0.0, 0.0]]);
        let err = KdTree::<2>::build(&pool, &[0, 3]).unwrap_err();
        assert!(matches!(err, KdTreeError::Pool(PoolError::InvalidHandle { .. })));
    }
}
