//! Anchor correspondence bookkeeping.
//!
//! The point-picking collaborator fills up to [`MAX_ANCHORS`] correspondences
//! between the "after" image and the "before" image; the engine asks how many
//! leading slots are complete and hands exactly those to a solver.

use serde::{Deserialize, Serialize};

/// Maximum number of anchor correspondences.
pub const MAX_ANCHORS: usize = 4;

/// One correspondence slot: a point in after-image coordinates matched with
/// a point in before-image coordinates. Either side may still be unplaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnchorSlot {
    /// Anchor in after-image coordinates, if placed.
    pub after: Option<[f64; 2]>,
    /// Anchor in before-image coordinates, if placed.
    pub before: Option<[f64; 2]>,
}

impl AnchorSlot {
    /// Returns `true` when both sides of the correspondence are placed.
    pub fn is_set(&self) -> bool {
        self.after.is_some() && self.before.is_some()
    }
}

/// Ordered set of up to four anchor correspondences.
///
/// Presence is tracked explicitly per side, so an anchor at the exact origin
/// is a legitimate pick and remains distinguishable from "not yet placed".
///
/// Solvers consume the leading run of complete slots: a complete slot that
/// sits behind a gap does not count until the gap is filled (see
/// [`AnchorPairs::ready_count`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnchorPairs {
    slots: [AnchorSlot; MAX_ANCHORS],
}

impl AnchorPairs {
    /// Empty set: no anchors placed on either side.
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the after-image point of slot `index`.
    ///
    /// `index` must be in `[0, MAX_ANCHORS)`.
    pub fn set_after(&mut self, index: usize, point: [f64; 2]) {
        self.slots[index].after = Some(point);
    }

    /// Place the before-image point of slot `index`.
    ///
    /// `index` must be in `[0, MAX_ANCHORS)`.
    pub fn set_before(&mut self, index: usize, point: [f64; 2]) {
        self.slots[index].before = Some(point);
    }

    /// Retract the after-image point of slot `index`.
    pub fn clear_after(&mut self, index: usize) {
        self.slots[index].after = None;
    }

    /// Retract the before-image point of slot `index`.
    pub fn clear_before(&mut self, index: usize) {
        self.slots[index].before = None;
    }

    /// Returns `true` when slot `index` has both sides placed.
    pub fn is_set(&self, index: usize) -> bool {
        self.slots[index].is_set()
    }

    /// Read one slot.
    pub fn slot(&self, index: usize) -> AnchorSlot {
        self.slots[index]
    }

    /// Number of leading complete slots.
    ///
    /// Scans from slot 0 and stops at the first incomplete slot, so a
    /// complete slot at index 2 contributes nothing while index 1 is open.
    pub fn ready_count(&self) -> usize {
        self.slots
            .iter()
            .take_while(|slot| slot.is_set())
            .count()
    }

    /// Empty every slot on both sides.
    pub fn clear(&mut self) {
        self.slots = [AnchorSlot::default(); MAX_ANCHORS];
    }

    /// First `N` (after, before) point pairs.
    ///
    /// Precondition: `N <= ready_count()`; the engine's dispatch guarantees
    /// this, so an unset slot here is a caller bug.
    pub fn leading<const N: usize>(&self) -> ([[f64; 2]; N], [[f64; 2]; N]) {
        debug_assert!(N <= self.ready_count(), "leading::<{N}> on incomplete set");
        let mut after = [[0.0; 2]; N];
        let mut before = [[0.0; 2]; N];
        for i in 0..N {
            if let (Some(a), Some(b)) = (self.slots[i].after, self.slots[i].before) {
                after[i] = a;
                before[i] = b;
            }
        }
        (after, before)
    }
}
