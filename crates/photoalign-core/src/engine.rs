//! Engine facade: solver dispatch plus decomposition.
//!
//! [`AlignmentEngine`] is the single entry point the UI collaborator calls
//! after any anchor edit. It reads how many leading correspondences are
//! complete, runs the highest-order solver that count satisfies, and returns
//! the transform together with its canonical parameter decomposition.

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::anchors::AnchorPairs;
use crate::params::{decompose, DecomposedParams};
use crate::solve::{
    solve_affine, solve_projective, solve_similarity, solve_translation, Solved, SolverConfig,
};
use crate::transform::reprojection_error;

// ── Error type ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignError {
    /// No complete leading correspondence; there is nothing to solve.
    TooFewAnchors,
}

impl std::fmt::Display for AlignError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewAnchors => write!(f, "no complete anchor pair to solve from"),
        }
    }
}

impl std::error::Error for AlignError {}

// ── Result types ─────────────────────────────────────────────────────────

/// Which closed-form rule produced an alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveMethod {
    /// One pair: translation only.
    Translation,
    /// Two pairs: uniform scale + rotation + translation.
    Similarity,
    /// Three pairs: general affine map.
    Affine,
    /// Four pairs: exact quad-to-quad homography.
    Projective,
}

impl SolveMethod {
    /// Number of anchor pairs the rule consumes.
    pub fn anchor_count(self) -> usize {
        match self {
            Self::Translation => 1,
            Self::Similarity => 2,
            Self::Affine => 3,
            Self::Projective => 4,
        }
    }
}

/// One alignment computation: the solved transform, its decomposition for
/// the parameter controls, and how it was obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    /// After-space → before-space transform (homogeneous, column-vector).
    pub transform: Matrix3<f64>,
    /// Canonical decomposition of the transform's affine part.
    pub params: DecomposedParams,
    /// Rule that fired — always the highest anchor count available.
    pub method: SolveMethod,
    /// The anchor configuration was degenerate; `transform` is the identity
    /// and the caller should keep the previous state on screen.
    pub degenerate: bool,
}

// ── Engine ───────────────────────────────────────────────────────────────

/// Alignment computation interface.
///
/// Wraps a [`SolverConfig`]. Create once, call [`compute_best`] after every
/// anchor edit: the computation is deterministic, allocation-free and
/// microsecond-scale, so recomputing eagerly is the intended usage.
///
/// [`compute_best`]: AlignmentEngine::compute_best
#[derive(Debug, Clone, Default)]
pub struct AlignmentEngine {
    config: SolverConfig,
}

impl AlignmentEngine {
    /// Engine with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with explicit thresholds.
    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Solve with the highest-order method the anchor set satisfies
    /// (4 > 3 > 2 > 1) and decompose the result.
    ///
    /// Degeneracy is reported in the returned [`Alignment`], not as an
    /// error; the only error is an anchor set with no complete leading
    /// pair. Calling twice on an unchanged set yields bit-identical output.
    pub fn compute_best(&self, anchors: &AnchorPairs) -> Result<Alignment, AlignError> {
        let ready = anchors.ready_count();
        let (method, solved) = match ready {
            0 => return Err(AlignError::TooFewAnchors),
            1 => {
                let (a, b) = anchors.leading::<1>();
                (SolveMethod::Translation, solve_translation(a[0], b[0]))
            }
            2 => {
                let (a, b) = anchors.leading::<2>();
                (
                    SolveMethod::Similarity,
                    solve_similarity(&a, &b, &self.config),
                )
            }
            3 => {
                let (a, b) = anchors.leading::<3>();
                (SolveMethod::Affine, solve_affine(&a, &b, &self.config))
            }
            _ => {
                let (a, b) = anchors.leading::<4>();
                (
                    SolveMethod::Projective,
                    solve_projective(&a, &b, &self.config),
                )
            }
        };

        tracing::debug!("{} anchor pair(s) ready, solved as {:?}", ready, method);
        if solved.degenerate {
            tracing::warn!(
                "degenerate {:?} anchor configuration, returning identity",
                method
            );
        } else {
            self.trace_residuals(anchors, &solved, method);
        }

        Ok(Alignment {
            transform: solved.transform,
            params: decompose(&solved.transform),
            method,
            degenerate: solved.degenerate,
        })
    }

    fn trace_residuals(&self, anchors: &AnchorPairs, solved: &Solved, method: SolveMethod) {
        for i in 0..method.anchor_count() {
            let slot = anchors.slot(i);
            if let (Some(a), Some(b)) = (slot.after, slot.before) {
                tracing::trace!(
                    "anchor {}: reprojection residual {:.3e}",
                    i + 1,
                    reprojection_error(&solved.transform, &a, &b)
                );
            }
        }
    }
}
