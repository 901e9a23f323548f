//! # Clipping
//!
//! Partitions a [`KdTree`](crate::KdTree) by half-spaces. Results are node
//! slots plus subtree roots; a subtree lands in a result whole when its
//! bounding box lies entirely on one side, so clipping touches far fewer
//! nodes than it classifies.

mod hyperplane;
mod polytope;

pub use hyperplane::SplitHyperPlane;
pub use polytope::{ClipConvexPolytope, ConvexPolytope};

/// The half-space `normal · p - offset >= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfSpace<const N: usize> {
    /// Plane normal, pointing into the half-space.
    pub normal: [f64; N],
    /// Plane offset along the normal.
    pub offset: f64,
}

/// Where a box lies relative to a half-space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Inside,
    Outside,
    Straddling,
}

impl<const N: usize> HalfSpace<N> {
    /// Creates the half-space `normal · p - offset >= 0`.
    #[must_use]
    pub const fn new(normal: [f64; N], offset: f64) -> Self {
        Self { normal, offset }
    }

    /// `normal · p - offset`; non-negative inside.
    #[inline]
    #[must_use]
    pub fn evaluate(&self, p: &[f64; N]) -> f64 {
        self.normal.iter().zip(p).map(|(n, x)| n * x).sum::<f64>() - self.offset
    }

    /// Whether `p` lies in the half-space (on the plane counts as inside).
    #[inline]
    #[must_use]
    pub fn contains(&self, p: &[f64; N]) -> bool {
        self.evaluate(p) >= 0.0
    }

    /// Classifies the axis-aligned box `[lo, hi]`.
    pub(crate) fn classify_box(&self, lo: &[f64; N], hi: &[f64; N]) -> Side {
        let mut min = -self.offset;
        let mut max = -self.offset;
        for ((n, l), h) in self.normal.iter().zip(lo).zip(hi) {
            if *n >= 0.0 {
                min += n * l;
                max += n * h;
            } else {
                min += n * h;
                max += n * l;
            }
        }
        if min >= 0.0 {
            Side::Inside
        } else if max < 0.0 {
            Side::Outside
        } else {
            Side::Straddling
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_boundary() {
        let h = HalfSpace::new([1.0, 0.0], 2.0);
        assert!(h.contains(&[2.0, 5.0]));
        assert!(h.contains(&[3.0, -5.0]));
        assert!(!h.contains(&[1.999, 0.0]));
    }

    #[test]
    fn test_classify_box() {
        let h = HalfSpace::new([1.0, -1.0], 0.0);
        assert_eq!(h.classify_box(&[2.0, 0.0], &[3.0, 1.0]), Side::Inside);
        assert_eq!(h.classify_box(&[0.0, 2.0], &[1.0, 3.0]), Side::Outside);
        assert_eq!(h.classify_box(&[0.0, 0.0], &[1.0, 1.0]), Side::Straddling);
    }
}
