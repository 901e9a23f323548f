//! Closed-form eigenvalues of symmetric 3x3 matrices.

/// Largest eigenvalue of the symmetric matrix `m` (row-major).
///
/// Only the upper triangle is read. Uses the trigonometric solution of the
/// characteristic cubic, which is exact for diagonal input and accurate to a
/// few ulps otherwise.
#[must_use]
pub fn max_eigenvalue_symmetric3(m: &[f64; 9]) -> f64 {
    let (a00, a01, a02) = (m[0], m[1], m[2]);
    let (a11, a12, a22) = (m[4], m[5], m[8]);

    let off = a01 * a01 + a02 * a02 + a12 * a12;
    if off <= 0.0 {
        return a00.max(a11).max(a22);
    }

    let q = (a00 + a11 + a22) / 3.0;
    let d00 = a00 - q;
    let d11 = a11 - q;
    let d22 = a22 - q;
    let p = ((d00 * d00 + d11 * d11 + d22 * d22 + 2.0 * off) / 6.0).sqrt();

    // B = (A - qI) / p, det(B) / 2 = cos(3 phi)
    let (b00, b11, b22) = (d00 / p, d11 / p, d22 / p);
    let (b01, b02, b12) = (a01 / p, a02 / p, a12 / p);
    let det = b00 * (b11 * b22 - b12 * b12) - b01 * (b01 * b22 - b12 * b02)
        + b02 * (b01 * b12 - b11 * b02);
    let phi = (det / 2.0).clamp(-1.0, 1.0).acos() / 3.0;

    q + 2.0 * p * phi.cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal() {
        let m = [2.0, 0.0, 0.0, 0.0, 7.0, 0.0, 0.0, 0.0, 3.0];
        assert_eq!(max_eigenvalue_symmetric3(&m), 7.0);
    }

    #[test]
    fn test_coupled() {
        // Eigenvalues of [[2,1,0],[1,2,0],[0,0,1]] are 3, 1, 1.
        let m = [2.0, 1.0, 0.0, 1.0, 2.0, 0.0, 0.0, 0.0, 1.0];
        assert!((max_eigenvalue_symmetric3(&m) - 3.0).abs() < 1e-12);

        // Eigenvalues of [[4,1,2],[1,3,0],[2,0,5]]: largest is 6.5720...
        let m = [4.0, 1.0, 2.0, 1.0, 3.0, 0.0, 2.0, 0.0, 5.0];
        let l = max_eigenvalue_symmetric3(&m);
        let det = |x: f64| {
            let (a, b, c) = (4.0 - x, 3.0 - x, 5.0 - x);
            a * (b * c) - 1.0 * (1.0 * c) + 2.0 * (0.0 - b * 2.0)
        };
        assert!(det(l).abs() < 1e-9);
        assert!(l > 5.0);
    }
}
