//! Closed-form alignment solvers, one per correspondence count.
//!
//! Each solver produces a transform carrying after-image coordinates exactly
//! onto before-image coordinates through its correspondences:
//!
//! 1. [`solve_translation`] — translation only.
//! 2. [`solve_similarity`] — uniform scale + rotation + translation.
//! 3. [`solve_affine`] — general affine map, Cramer's-rule solution of the
//!    exact 6-unknown system.
//! 4. [`solve_projective`] — exact quad-to-quad homography via normalized
//!    DLT (Hartley normalization, smallest-eigenvalue eigenvector of AᵀA).
//!
//! Degenerate input (coincident baseline, collinear points) is an expected
//! interactive state while the user is still placing anchors, not an error:
//! the solver returns the identity transform with the `degenerate` flag
//! raised, and the caller decides what to disable.
//!
//! All solvers are pure: same inputs, same transform, no shared state.

use nalgebra::{Matrix3, SMatrix};

use crate::transform::{rotation_rad, scaling, translation};

// ── Configuration ────────────────────────────────────────────────────────

/// Numeric thresholds for degeneracy detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Collinearity threshold on the signed-area determinant of a point
    /// triple. Triples below it cannot anchor an affine or projective solve.
    pub collinear_eps: f64,
    /// Minimum after-baseline length for the two-point solver. Below it the
    /// rotation and scale of the pair are undefined.
    pub min_baseline: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            collinear_eps: 1e-8,
            min_baseline: 1e-9,
        }
    }
}

/// Outcome of one solver run.
///
/// `degenerate` means the input admitted no solution; `transform` is then
/// the identity so a careless caller still renders something sane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solved {
    /// After-space → before-space transform.
    pub transform: Matrix3<f64>,
    /// Raised when the input was degenerate.
    pub degenerate: bool,
}

impl Solved {
    fn exact(transform: Matrix3<f64>) -> Self {
        Self {
            transform,
            degenerate: false,
        }
    }

    fn identity_fallback() -> Self {
        Self {
            transform: Matrix3::identity(),
            degenerate: true,
        }
    }
}

/// Twice the signed area of the triangle (p0, p1, p2); zero iff collinear.
fn signed_area2(p0: [f64; 2], p1: [f64; 2], p2: [f64; 2]) -> f64 {
    p0[0] * (p1[1] - p2[1]) - p0[1] * (p1[0] - p2[0]) + (p1[0] * p2[1] - p2[0] * p1[1])
}

// ── One pair: translation ────────────────────────────────────────────────

/// Translation taking `after` onto `before`. Never degenerate.
pub fn solve_translation(after: [f64; 2], before: [f64; 2]) -> Solved {
    Solved::exact(translation(before[0] - after[0], before[1] - after[1]))
}

// ── Two pairs: similarity ────────────────────────────────────────────────

/// Uniform scale + rotation + translation taking both after-points onto
/// their before counterparts.
///
/// The after baseline vector fixes scale and rotation; the first pair fixes
/// translation. A baseline shorter than [`SolverConfig::min_baseline`]
/// (coincident picks) is degenerate — checked before dividing, so the
/// result never carries NaN or infinity.
pub fn solve_similarity(
    after: &[[f64; 2]; 2],
    before: &[[f64; 2]; 2],
    config: &SolverConfig,
) -> Solved {
    let v_after = [after[1][0] - after[0][0], after[1][1] - after[0][1]];
    let v_before = [before[1][0] - before[0][0], before[1][1] - before[0][1]];

    let len_after = v_after[0].hypot(v_after[1]);
    if len_after < config.min_baseline {
        return Solved::identity_fallback();
    }
    let scale = v_before[0].hypot(v_before[1]) / len_after;
    let rotation = v_before[1].atan2(v_before[0]) - v_after[1].atan2(v_after[0]);

    // Move the first after-point to the origin, rotate and scale uniformly,
    // then move onto the first before-point.
    let h = translation(before[0][0], before[0][1])
        * rotation_rad(rotation)
        * scaling(scale, scale)
        * translation(-after[0][0], -after[0][1]);
    Solved::exact(h)
}

// ── Three pairs: affine ──────────────────────────────────────────────────

/// Unique affine map taking three non-collinear after-points exactly onto
/// their before counterparts.
///
/// Solves the 6-unknown linear system directly by Cramer's rule; the shared
/// denominator is the signed-area determinant of the after triangle, so
/// collinear after-points are degenerate.
pub fn solve_affine(
    after: &[[f64; 2]; 3],
    before: &[[f64; 2]; 3],
    config: &SolverConfig,
) -> Solved {
    let [x1, y1] = after[0];
    let [x2, y2] = after[1];
    let [x3, y3] = after[2];
    let [u1, v1] = before[0];
    let [u2, v2] = before[1];
    let [u3, v3] = before[2];

    let denom = signed_area2(after[0], after[1], after[2]);
    if denom.abs() < config.collinear_eps {
        return Solved::identity_fallback();
    }

    let a = (u1 * (y2 - y3) - u2 * (y1 - y3) + u3 * (y1 - y2)) / denom;
    let b = (u1 * (x3 - x2) + u2 * (x1 - x3) + u3 * (x2 - x1)) / denom;
    let c = (u1 * (x2 * y3 - x3 * y2) - u2 * (x1 * y3 - x3 * y1) + u3 * (x1 * y2 - x2 * y1)) / denom;

    let d = (v1 * (y2 - y3) - v2 * (y1 - y3) + v3 * (y1 - y2)) / denom;
    let e = (v1 * (x3 - x2) + v2 * (x1 - x3) + v3 * (x2 - x1)) / denom;
    let f = (v1 * (x2 * y3 - x3 * y2) - v2 * (x1 * y3 - x3 * y1) + v3 * (x1 * y2 - x2 * y1)) / denom;

    Solved::exact(Matrix3::new(a, b, c, d, e, f, 0.0, 0.0, 1.0))
}

// ── Four pairs: projective ───────────────────────────────────────────────

/// Normalizing transform: translate the centroid to the origin, scale so the
/// mean distance from it is √2.
fn normalize_points(pts: &[[f64; 2]; 4]) -> (Matrix3<f64>, [[f64; 2]; 4]) {
    let cx: f64 = pts.iter().map(|p| p[0]).sum::<f64>() / 4.0;
    let cy: f64 = pts.iter().map(|p| p[1]).sum::<f64>() / 4.0;

    let mean_dist: f64 = pts
        .iter()
        .map(|p| ((p[0] - cx).powi(2) + (p[1] - cy).powi(2)).sqrt())
        .sum::<f64>()
        / 4.0;

    let s = if mean_dist > 1e-15 {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };

    let t = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);
    let normalized = [
        [s * (pts[0][0] - cx), s * (pts[0][1] - cy)],
        [s * (pts[1][0] - cx), s * (pts[1][1] - cy)],
        [s * (pts[2][0] - cx), s * (pts[2][1] - cy)],
        [s * (pts[3][0] - cx), s * (pts[3][1] - cy)],
    ];
    (t, normalized)
}

/// Any three of the four points collinear?
fn any_triple_collinear(pts: &[[f64; 2]; 4], eps: f64) -> bool {
    const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
    TRIPLES
        .iter()
        .any(|&[i, j, k]| signed_area2(pts[i], pts[j], pts[k]).abs() < eps)
}

/// Unique homography taking four after-points in general position exactly
/// onto their before counterparts (the quad-to-quad problem).
///
/// Direct Linear Transform on the four correspondences: both point sets are
/// Hartley-normalized, the 8×9 design matrix is assembled, and the solution
/// is the eigenvector of AᵀA with the smallest eigenvalue, denormalized and
/// scaled so `h33 = 1` where possible.
///
/// Degenerate when any three of the four after-points are collinear, or
/// when the eigen-solution is numerically unusable.
pub fn solve_projective(
    after: &[[f64; 2]; 4],
    before: &[[f64; 2]; 4],
    config: &SolverConfig,
) -> Solved {
    if any_triple_collinear(after, config.collinear_eps) {
        return Solved::identity_fallback();
    }

    let (t_src, src) = normalize_points(after);
    let (t_dst, dst) = normalize_points(before);

    let mut a = SMatrix::<f64, 8, 9>::zeros();
    for i in 0..4 {
        let (sx, sy) = (src[i][0], src[i][1]);
        let (dx, dy) = (dst[i][0], dst[i][1]);

        // Row 2i:   [  0  0  0 | -sx -sy -1 | dy*sx  dy*sy  dy ]
        a[(2 * i, 3)] = -sx;
        a[(2 * i, 4)] = -sy;
        a[(2 * i, 5)] = -1.0;
        a[(2 * i, 6)] = dy * sx;
        a[(2 * i, 7)] = dy * sy;
        a[(2 * i, 8)] = dy;

        // Row 2i+1: [ sx  sy  1 |  0  0  0 | -dx*sx -dx*sy -dx ]
        a[(2 * i + 1, 0)] = sx;
        a[(2 * i + 1, 1)] = sy;
        a[(2 * i + 1, 2)] = 1.0;
        a[(2 * i + 1, 6)] = -dx * sx;
        a[(2 * i + 1, 7)] = -dx * sy;
        a[(2 * i + 1, 8)] = -dx;
    }

    // The solution is the null direction of A, i.e. the eigenvector of the
    // 9×9 symmetric matrix AᵀA with the smallest eigenvalue.
    let ata = a.transpose() * a;
    let eig = nalgebra::SymmetricEigen::new(ata);

    let mut min_idx = 0;
    let mut min_val = eig.eigenvalues[0].abs();
    for i in 1..9 {
        let v = eig.eigenvalues[i].abs();
        if v < min_val {
            min_val = v;
            min_idx = i;
        }
    }
    let h_norm = Matrix3::new(
        eig.eigenvectors[(0, min_idx)],
        eig.eigenvectors[(1, min_idx)],
        eig.eigenvectors[(2, min_idx)],
        eig.eigenvectors[(3, min_idx)],
        eig.eigenvectors[(4, min_idx)],
        eig.eigenvectors[(5, min_idx)],
        eig.eigenvectors[(6, min_idx)],
        eig.eigenvectors[(7, min_idx)],
        eig.eigenvectors[(8, min_idx)],
    );

    // Denormalize: H = T_dst⁻¹ · H_norm · T_src.
    let t_dst_inv = match t_dst.try_inverse() {
        Some(inv) => inv,
        None => return Solved::identity_fallback(),
    };
    let h = t_dst_inv * h_norm * t_src;

    if h.iter().any(|v| !v.is_finite()) {
        return Solved::identity_fallback();
    }

    let scale = h[(2, 2)];
    if scale.abs() < 1e-15 {
        Solved::exact(h)
    } else {
        Solved::exact(h / scale)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{apply, reprojection_error};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn cfg() -> SolverConfig {
        SolverConfig::default()
    }

    fn random_point(rng: &mut StdRng, span: f64) -> [f64; 2] {
        [rng.gen_range(-span..span), rng.gen_range(-span..span)]
    }

    /// Axis-aligned quad corners with bounded jitter: stays convex, never
    /// grows a collinear triple.
    fn random_quad(rng: &mut StdRng) -> [[f64; 2]; 4] {
        let w: f64 = rng.gen_range(100.0..800.0);
        let h = rng.gen_range(100.0..800.0);
        let ox = rng.gen_range(-500.0..500.0);
        let oy = rng.gen_range(-500.0..500.0);
        let jitter = 0.15 * w.min(h);
        let mut j = |v: f64| v + rng.gen_range(-jitter..jitter);
        [
            [j(ox), j(oy)],
            [j(ox + w), j(oy)],
            [j(ox + w), j(oy + h)],
            [j(ox), j(oy + h)],
        ]
    }

    #[test]
    fn translation_is_exact() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let a = random_point(&mut rng, 5000.0);
            let b = random_point(&mut rng, 5000.0);
            let solved = solve_translation(a, b);
            assert!(!solved.degenerate);
            assert!(reprojection_error(&solved.transform, &a, &b) < 1e-9);
        }
    }

    #[test]
    fn similarity_maps_both_anchors() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..200 {
            let after = [random_point(&mut rng, 1000.0), random_point(&mut rng, 1000.0)];
            let before = [random_point(&mut rng, 1000.0), random_point(&mut rng, 1000.0)];
            let solved = solve_similarity(&after, &before, &cfg());
            assert!(!solved.degenerate);
            for i in 0..2 {
                assert!(
                    reprojection_error(&solved.transform, &after[i], &before[i]) < 1e-6,
                    "anchor {i} missed"
                );
            }
        }
    }

    #[test]
    fn similarity_preserves_uniform_scale_and_angle() {
        // after baseline (1, 0) → before baseline (0, 2): 90° rotation, 2x.
        let after = [[0.0, 0.0], [1.0, 0.0]];
        let before = [[10.0, 10.0], [10.0, 12.0]];
        let solved = solve_similarity(&after, &before, &cfg());
        let p = apply(&solved.transform, [0.5, 0.0]);
        approx::assert_relative_eq!(p[0], 10.0, epsilon = 1e-9);
        approx::assert_relative_eq!(p[1], 11.0, epsilon = 1e-9);
    }

    #[test]
    fn similarity_coincident_anchors_degenerate() {
        let after = [[42.0, 17.0], [42.0, 17.0]];
        let before = [[0.0, 0.0], [100.0, 100.0]];
        let solved = solve_similarity(&after, &before, &cfg());
        assert!(solved.degenerate);
        assert_eq!(solved.transform, Matrix3::identity());
        assert!(solved.transform.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn affine_maps_all_three_anchors() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut done = 0;
        while done < 200 {
            let after = [
                random_point(&mut rng, 1000.0),
                random_point(&mut rng, 1000.0),
                random_point(&mut rng, 1000.0),
            ];
            if signed_area2(after[0], after[1], after[2]).abs() < 1.0 {
                continue; // resample near-collinear triples
            }
            let before = [
                random_point(&mut rng, 1000.0),
                random_point(&mut rng, 1000.0),
                random_point(&mut rng, 1000.0),
            ];
            let solved = solve_affine(&after, &before, &cfg());
            assert!(!solved.degenerate);
            for i in 0..3 {
                assert!(
                    reprojection_error(&solved.transform, &after[i], &before[i]) < 1e-6,
                    "anchor {i} missed"
                );
            }
            done += 1;
        }
    }

    #[test]
    fn affine_collinear_falls_back_to_identity() {
        let after = [[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]];
        let before = [[5.0, 5.0], [6.0, 7.0], [8.0, 9.0]];
        let solved = solve_affine(&after, &before, &cfg());
        assert!(solved.degenerate);
        assert_eq!(solved.transform, Matrix3::identity());
    }

    #[test]
    fn projective_maps_all_four_anchors() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..200 {
            let after = random_quad(&mut rng);
            let before = random_quad(&mut rng);
            let solved = solve_projective(&after, &before, &cfg());
            assert!(!solved.degenerate);
            for i in 0..4 {
                assert!(
                    reprojection_error(&solved.transform, &after[i], &before[i]) < 1e-6,
                    "anchor {i} missed by {}",
                    reprojection_error(&solved.transform, &after[i], &before[i])
                );
            }
        }
    }

    #[test]
    fn projective_recovers_a_known_homography() {
        // Scale + translate + mild perspective.
        let h_true = Matrix3::new(
            3.5, 0.1, 640.0, //
            -0.05, 3.3, 480.0, //
            0.0001, -0.00005, 1.0,
        );
        let after = [[0.0, 0.0], [100.0, 0.0], [100.0, 100.0], [0.0, 100.0]];
        let before = after.map(|p| apply(&h_true, p));

        let solved = solve_projective(&after, &before, &cfg());
        assert!(!solved.degenerate);
        for (a, b) in after.iter().zip(&before) {
            assert!(reprojection_error(&solved.transform, a, b) < 1e-6);
        }
    }

    #[test]
    fn projective_three_collinear_degenerate() {
        let after = [[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [1.0, 5.0]];
        let before = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]];
        let solved = solve_projective(&after, &before, &cfg());
        assert!(solved.degenerate);
        assert_eq!(solved.transform, Matrix3::identity());
    }

    #[test]
    fn solvers_are_deterministic() {
        let after = [[0.0, 1.0], [200.0, 3.0], [190.0, 220.0], [5.0, 210.0]];
        let before = [[12.0, 8.0], [215.0, 22.0], [200.0, 240.0], [9.0, 231.0]];
        let first = solve_projective(&after, &before, &cfg());
        let second = solve_projective(&after, &before, &cfg());
        assert_eq!(first, second);
        for (x, y) in first.transform.iter().zip(second.transform.iter()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }
}
