//! Homogeneous 2-D transform primitives.
//!
//! Transforms are 3×3 matrices in column-vector convention:
//! `p' = H · [x, y, 1]ᵀ`. Affine transforms keep the bottom row `[0 0 1]`;
//! the 4-point solver may produce a general projective matrix.
//!
//! Canonical composition order for parameter-built transforms is
//! `T · Sh · Sc · R`: applied to a point, rotation acts first, then scale,
//! then shear, then translation. This is the order in which the rendering
//! collaborator assembles the after-image transform from the parameter
//! controls, and the order [`crate::params::decompose`] peels apart.

use nalgebra::{Matrix3, Vector3};

/// Pure translation by `(tx, ty)`.
pub fn translation(tx: f64, ty: f64) -> Matrix3<f64> {
    Matrix3::new(1.0, 0.0, tx, 0.0, 1.0, ty, 0.0, 0.0, 1.0)
}

/// Counter-clockwise rotation about the origin, in degrees.
pub fn rotation_deg(deg: f64) -> Matrix3<f64> {
    rotation_rad(deg.to_radians())
}

/// Counter-clockwise rotation about the origin, in radians.
pub fn rotation_rad(rad: f64) -> Matrix3<f64> {
    let (s, c) = rad.sin_cos();
    Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0)
}

/// Per-axis scale about the origin.
pub fn scaling(sx: f64, sy: f64) -> Matrix3<f64> {
    Matrix3::new(sx, 0.0, 0.0, 0.0, sy, 0.0, 0.0, 0.0, 1.0)
}

/// Shear: `shx` adds `shx·y` to x, `shy` adds `shy·x` to y.
pub fn shearing(shx: f64, shy: f64) -> Matrix3<f64> {
    Matrix3::new(1.0, shx, 0.0, shy, 1.0, 0.0, 0.0, 0.0, 1.0)
}

/// Apply a transform to a 2D point: H * [x, y, 1]^T → [u, v].
pub fn apply(h: &Matrix3<f64>, p: [f64; 2]) -> [f64; 2] {
    let q = h * Vector3::new(p[0], p[1], 1.0);
    if q[2].abs() < 1e-15 {
        return [f64::NAN, f64::NAN];
    }
    [q[0] / q[2], q[1] / q[2]]
}

/// Reprojection error: ||apply(H, src) - dst||.
pub fn reprojection_error(h: &Matrix3<f64>, src: &[f64; 2], dst: &[f64; 2]) -> f64 {
    let p = apply(h, *src);
    let dx = p[0] - dst[0];
    let dy = p[1] - dst[1];
    (dx * dx + dy * dy).sqrt()
}

/// Returns `true` when the bottom row is `[0 0 1]` (no perspective part).
pub fn is_affine(h: &Matrix3<f64>) -> bool {
    h[(2, 0)] == 0.0 && h[(2, 1)] == 0.0 && h[(2, 2)] == 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn translation_moves_points() {
        let t = translation(5.0, -3.0);
        assert_eq!(apply(&t, [1.0, 2.0]), [6.0, -1.0]);
        assert!(is_affine(&t));
    }

    #[test]
    fn rotation_quarter_turn() {
        let r = rotation_deg(90.0);
        let p = apply(&r, [1.0, 0.0]);
        assert_relative_eq!(p[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(p[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn shear_offsets_by_opposite_coordinate() {
        let sh = shearing(0.5, -0.25);
        let p = apply(&sh, [2.0, 4.0]);
        assert_relative_eq!(p[0], 2.0 + 0.5 * 4.0, epsilon = 1e-12);
        assert_relative_eq!(p[1], 4.0 - 0.25 * 2.0, epsilon = 1e-12);
    }

    #[test]
    fn canonical_order_applies_rotation_first() {
        // T · Sc · R at (1, 0): rotate 90° → (0, 1), scale (2, 3) → (0, 3),
        // translate (10, 0) → (10, 3).
        let h = translation(10.0, 0.0) * scaling(2.0, 3.0) * rotation_deg(90.0);
        let p = apply(&h, [1.0, 0.0]);
        assert_relative_eq!(p[0], 10.0, epsilon = 1e-12);
        assert_relative_eq!(p[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn projective_division() {
        let mut h = Matrix3::identity();
        h[(2, 0)] = 0.5;
        assert!(!is_affine(&h));
        let p = apply(&h, [2.0, 4.0]);
        assert_relative_eq!(p[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(p[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn reprojection_error_is_euclidean() {
        let t = translation(3.0, 4.0);
        assert_relative_eq!(
            reprojection_error(&t, &[0.0, 0.0], &[0.0, 0.0]),
            5.0,
            epsilon = 1e-12
        );
    }
}
