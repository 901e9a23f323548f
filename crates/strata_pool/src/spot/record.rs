//! The spot record: a 3-D detection with an ellipsoid shape.

use crate::memory::MappedElement;
use crate::object::{DoubleArrayField, DoubleField, Field, IntField, Layout, Localizable, PoolObject};

/// Record type of a [`SpotPool`](super::SpotPool).
///
/// | field | type | bytes |
/// |---|---|---|
/// | position | `[f64; 3]` | 24 |
/// | covariance (row-major 3x3) | `[f64; 9]` | 72 |
/// | bounding-sphere radius² | `f64` | 8 |
/// | timepoint | `i32` | 4 |
#[derive(Debug, Clone, Copy)]
pub struct Spot;

impl Spot {
    const POS: (DoubleArrayField<3>, Layout) = Layout::new().double_array::<3>();
    const COV: (DoubleArrayField<9>, Layout) = Self::POS.1.double_array::<9>();
    const BSRS: (DoubleField, Layout) = Self::COV.1.double();
    const TP: (IntField, Layout) = Self::BSRS.1.int();

    /// Center of the spot.
    pub const POSITION: DoubleArrayField<3> = Self::POS.0;
    /// Shape covariance, row-major.
    pub const COVARIANCE: DoubleArrayField<9> = Self::COV.0;
    /// Squared radius of the sphere enclosing the ellipsoid.
    pub const BOUNDING_SPHERE_RADIUS_SQUARED: DoubleField = Self::BSRS.0;
    /// Frame the spot belongs to.
    pub const TIMEPOINT: IntField = Self::TP.0;
}

impl PoolObject for Spot {
    const SIZE_IN_BYTES: usize = Self::TP.1.size();
}

impl Localizable<3> for Spot {
    #[inline]
    fn position(access: &MappedElement<'_>) -> [f64; 3] {
        Self::POSITION.get(access)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spot_layout() {
        assert_eq!(Spot::COVARIANCE.offset(), 24);
        assert_eq!(Spot::BOUNDING_SPHERE_RADIUS_SQUARED.offset(), 96);
        assert_eq!(Spot::TIMEPOINT.offset(), 104);
        assert_eq!(Spot::SIZE_IN_BYTES, 108);
    }
}
