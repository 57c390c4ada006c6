use std::collections::BTreeSet;

use crate::math::Point3;

use super::patch::PatchId;

slotmap::new_key_type! {
    /// Unique identifier for a control point in the mesh store.
    pub struct PointId;
}

/// Data associated with a control point.
///
/// A point may be referenced by several patches at once; `owners` records
/// exactly which ones. Anchor points have no owners.
#[derive(Debug, Clone)]
pub struct PointData {
    /// The 3D position of the point.
    pub position: Point3,
    /// Patches referencing this point in one of their 16 slots.
    pub owners: BTreeSet<PatchId>,
    /// Selected for dragging.
    pub selected: bool,
    /// Marked as one of the two points of a pending merge.
    pub selected_for_merge: bool,
    /// Stays selected across clicks.
    pub sticky: bool,
}

impl PointData {
    /// Creates an unowned, unselected point at the given position.
    #[must_use]
    pub fn new(position: Point3) -> Self {
        Self {
            position,
            owners: BTreeSet::new(),
            selected: false,
            selected_for_merge: false,
            sticky: false,
        }
    }

    /// Copies position and flags into a new point with no owners.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            position: self.position,
            owners: BTreeSet::new(),
            selected: self.selected,
            selected_for_merge: self.selected_for_merge,
            sticky: self.sticky,
        }
    }
}
