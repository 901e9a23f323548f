//! # KD-Tree Nodes
//!
//! Nodes are pool records, so a tree is one flat buffer with no pointers:
//!
//! | field | type | bytes |
//! |---|---|---|
//! | position | `[f64; N]` | `8 * N` |
//! | left child slot | `i32` | 4 |
//! | right child slot | `i32` | 4 |
//! | data index | `i32` | 4 |
//! | flags | `i32` | 4 |
//!
//! Child and data indices use `-1` for "none". Bit 0 of the flags marks the
//! node invalid; the remaining bits hold the split dimension.

use strata_pool::{
    DoubleArrayField, Field, IndexField, IntField, MappedElement, MappedElementMut, PoolObject,
};

/// Record type of a [`KdTree`](crate::KdTree) node in `N` dimensions.
#[derive(Debug, Clone, Copy)]
pub struct KdTreeNode<const N: usize>;

impl<const N: usize> KdTreeNode<N> {
    /// Coordinates of the point.
    pub const POSITION: DoubleArrayField<N> = DoubleArrayField::at(0);
    /// Slot of the left child.
    pub const LEFT: IndexField = IndexField::at(Self::POSITION.end());
    /// Slot of the right child.
    pub const RIGHT: IndexField = IndexField::at(Self::LEFT.end());
    /// Slot of the point's record in the source pool.
    pub const DATA_INDEX: IndexField = IndexField::at(Self::RIGHT.end());
    /// Invalid bit and split dimension.
    pub const FLAGS: IntField = IntField::at(Self::DATA_INDEX.end());

    /// Flag bit marking a node invalid.
    pub const INVALID: i32 = 1;

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub(crate) const fn pack_flags(split_dimension: usize, invalid: bool) -> i32 {
        ((split_dimension as i32) << 1) | invalid as i32
    }
}

impl<const N: usize> PoolObject for KdTreeNode<N> {
    const SIZE_IN_BYTES: usize = Self::FLAGS.end();

    fn set_to_uninitialized_state(access: &mut MappedElementMut<'_>) {
        Self::LEFT.put(access, IndexField::NONE);
        Self::RIGHT.put(access, IndexField::NONE);
        Self::DATA_INDEX.put(access, IndexField::NONE);
    }
}

/// Read-only view of one node.
#[derive(Clone, Copy)]
pub struct NodeView<'a, const N: usize> {
    access: MappedElement<'a>,
}

impl<'a, const N: usize> NodeView<'a, N> {
    #[inline]
    pub(crate) const fn new(access: MappedElement<'a>) -> Self {
        Self { access }
    }

    /// Coordinates of the point.
    #[inline]
    #[must_use]
    pub fn position(&self) -> [f64; N] {
        KdTreeNode::<N>::POSITION.get(&self.access)
    }

    /// Coordinate `d` of the point.
    #[inline]
    #[must_use]
    pub fn coordinate(&self, d: usize) -> f64 {
        KdTreeNode::<N>::POSITION.get_one(&self.access, d)
    }

    /// Slot of the left child.
    #[inline]
    #[must_use]
    pub fn left(&self) -> Option<usize> {
        KdTreeNode::<N>::LEFT.get_slot(&self.access)
    }

    /// Slot of the right child.
    #[inline]
    #[must_use]
    pub fn right(&self) -> Option<usize> {
        KdTreeNode::<N>::RIGHT.get_slot(&self.access)
    }

    /// Slot of the point's record in the source pool.
    #[inline]
    #[must_use]
    pub fn data_index(&self) -> usize {
        KdTreeNode::<N>::DATA_INDEX.get_slot(&self.access).unwrap_or(usize::MAX)
    }

    /// Dimension the node splits its subtree on.
    #[inline]
    #[must_use]
    pub fn split_dimension(&self) -> usize {
        usize::try_from(KdTreeNode::<N>::FLAGS.get(&self.access) >> 1).unwrap_or(0)
    }

    /// Whether the node takes part in valid-only queries.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        KdTreeNode::<N>::FLAGS.get(&self.access) & KdTreeNode::<N>::INVALID == 0
    }

    /// Squared Euclidean distance from the point to `query`.
    #[inline]
    #[must_use]
    pub fn squared_distance_to(&self, query: &[f64; N]) -> f64 {
        query
            .iter()
            .enumerate()
            .map(|(d, q)| {
                let diff = self.coordinate(d) - q;
                diff * diff
            })
            .sum()
    }
}

impl<const N: usize> std::fmt::Debug for NodeView<'_, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeView")
            .field("position", &self.position())
            .field("left", &self.left())
            .field("right", &self.right())
            .field("data_index", &self.data_index())
            .field("split_dimension", &self.split_dimension())
            .field("valid", &self.is_valid())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_layout() {
        assert_eq!(KdTreeNode::<2>::LEFT.offset(), 16);
        assert_eq!(KdTreeNode::<2>::SIZE_IN_BYTES, 32);
        assert_eq!(KdTreeNode::<3>::SIZE_IN_BYTES, 40);
    }

    #[test]
    fn test_flags() {
        let mut buf = [0u8; KdTreeNode::<3>::SIZE_IN_BYTES];
        let mut access = MappedElementMut::new(&mut buf);
        KdTreeNode::<3>::set_to_uninitialized_state(&mut access);
        KdTreeNode::<3>::FLAGS.put(&mut access, KdTreeNode::<3>::pack_flags(2, true));

        let view = NodeView::<3>::new(access.as_element());
        assert_eq!(view.split_dimension(), 2);
        assert!(!view.is_valid());
        assert_eq!(view.left(), None);
        assert_eq!(view.right(), None);
    }
}
