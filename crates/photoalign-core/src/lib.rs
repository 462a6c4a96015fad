//! photoalign-core — closed-form 2-D alignment for before/after photographs.
//!
//! The surrounding application overlays an "after" photograph on a "before"
//! photograph; the user either drags numeric controls or marks matching
//! anchor points on both images. This crate is the numeric core of that
//! workflow:
//!
//! 1. **Anchors** – bookkeeping for up to four (after, before) point
//!    correspondences with explicit per-side presence.
//! 2. **Solve** – four closed-form solvers, one per correspondence count:
//!    translation, similarity, affine (Cramer's rule), exact quad-to-quad
//!    homography (normalized DLT).
//! 3. **Params** – decomposition of a transform into translation, rotation,
//!    per-axis scale and shear, and exact recomposition in the canonical
//!    `T · Sh · Sc · R` order.
//! 4. **Engine** – the facade: picks the highest-order solver the anchor set
//!    satisfies and returns transform + parameters + degeneracy flag.
//!
//! Everything is pure, synchronous computation over value types: no I/O, no
//! rendering, no shared mutable state, safe to re-run after every single
//! anchor edit.

pub mod anchors;
pub mod engine;
pub mod params;
pub mod solve;
pub mod transform;

pub use anchors::{AnchorPairs, AnchorSlot, MAX_ANCHORS};
pub use engine::{AlignError, Alignment, AlignmentEngine, SolveMethod};
pub use params::{decompose, recompose, DecomposedParams};
pub use solve::{
    solve_affine, solve_projective, solve_similarity, solve_translation, Solved, SolverConfig,
};
