//! Records that have a position in `N`-dimensional space.

use crate::memory::MappedElement;

use super::pool::PoolObject;

/// A [`PoolObject`] with a real-valued position.
///
/// Spatial indexes read positions through this trait, so any record type can
/// be indexed without copying it out of its pool first.
pub trait Localizable<const N: usize>: PoolObject {
    /// Reads the position of the record in `access`.
    fn position(access: &MappedElement<'_>) -> [f64; N];
}
