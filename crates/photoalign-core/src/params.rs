//! Decomposition of a transform into human-editable parameters, and the
//! inverse recomposition.
//!
//! The parameterization is the canonical order `T · Sh · Sc · R` (see
//! [`crate::transform`]). The five linear parameters (two scales, two
//! shears, one rotation) overdetermine the four degrees of freedom of a 2-D
//! linear map, so an arbitrary parameter set is not recoverable per-field;
//! [`decompose`] instead returns the *canonical* representative, the one
//! whose rotation is the angle of the transform's first basis-vector column.
//!
//! Contract:
//! - `recompose(decompose(H)) == H` (within round-off) for every affine `H`
//!   whose de-rotated diagonal is non-zero — including reflections.
//! - `decompose(recompose(p)) == p` for every canonical `p`, in particular
//!   for everything `decompose` itself returns and for all shear-free
//!   uniform-scale parameter sets (the similarity solver's output).
//!
//! Projective matrices are normalized by `h33` and only their affine part is
//! read, matching how the surrounding application populates the parameter
//! controls after a 4-point solve.

use nalgebra::{Matrix2, Matrix3};
use serde::{Deserialize, Serialize};

use crate::transform::{rotation_deg, scaling, shearing, translation};

/// A peeled scale below this magnitude leaves the corresponding shear
/// unrecoverable; it is reported as zero instead of dividing.
const MIN_SCALE: f64 = 1e-12;

/// Independent, human-editable transform parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecomposedParams {
    /// Horizontal translation.
    pub translate_x: f64,
    /// Vertical translation.
    pub translate_y: f64,
    /// Rotation in degrees, range (−180, 180].
    pub rotation_deg: f64,
    /// Scale along x.
    pub scale_x: f64,
    /// Scale along y.
    pub scale_y: f64,
    /// Horizontal shear (x gains `shear_x · y`).
    pub shear_x: f64,
    /// Vertical shear (y gains `shear_y · x`).
    pub shear_y: f64,
}

impl Default for DecomposedParams {
    /// Identity: no translation, no rotation, unit scale, no shear.
    fn default() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            rotation_deg: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            shear_x: 0.0,
            shear_y: 0.0,
        }
    }
}

/// Rebuild a transform from parameters in the fixed canonical order:
/// translate, then shear, then scale, then rotate (rotation applies to the
/// point first).
pub fn recompose(p: &DecomposedParams) -> Matrix3<f64> {
    translation(p.translate_x, p.translate_y)
        * shearing(p.shear_x, p.shear_y)
        * scaling(p.scale_x, p.scale_y)
        * rotation_deg(p.rotation_deg)
}

/// Extract canonical parameters from a transform.
///
/// Peels the canonical composition apart back to front: translation from the
/// constant column, rotation from the angle of the first basis-vector
/// column, then scale from the diagonal of the de-rotated matrix, then shear
/// from its off-diagonal entries.
pub fn decompose(h: &Matrix3<f64>) -> DecomposedParams {
    let m = if h[(2, 2)].abs() > 1e-15 {
        h / h[(2, 2)]
    } else {
        *h
    };

    let translate_x = m[(0, 2)];
    let translate_y = m[(1, 2)];

    let rot = m[(1, 0)].atan2(m[(0, 0)]);
    let (s, c) = rot.sin_cos();
    let a = m.fixed_view::<2, 2>(0, 0).into_owned();
    // Right-multiply by R(−rot): what remains is shear · scale.
    let pure = a * Matrix2::new(c, s, -s, c);

    let scale_x = pure[(0, 0)];
    let scale_y = pure[(1, 1)];
    let shear_x = if scale_y.abs() < MIN_SCALE {
        0.0
    } else {
        pure[(0, 1)] / scale_y
    };
    let shear_y = if scale_x.abs() < MIN_SCALE {
        0.0
    } else {
        pure[(1, 0)] / scale_x
    };

    let mut rotation = rot.to_degrees();
    if rotation <= -180.0 {
        rotation += 360.0;
    }

    DecomposedParams {
        translate_x,
        translate_y,
        rotation_deg: rotation,
        scale_x,
        scale_y,
        shear_x,
        shear_y,
    }
}
