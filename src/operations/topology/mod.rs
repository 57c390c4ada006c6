//! Structural edits of the patch mesh.
//!
//! Every operation leaves the store satisfying
//! [`MeshStore::validate`](crate::topology::MeshStore::validate) on all
//! return paths. Requests that make no sense (merging a point with itself,
//! touching an anchor, attaching onto an occupied side, ...) are logged and
//! ignored rather than reported as errors.

mod attach;
mod delete_patch_group;
mod detach;
mod merge_points;
mod merge_selected;
mod rebuild;
mod split_point;

pub use attach::Attach;
pub use delete_patch_group::DeletePatchGroup;
pub use detach::Detach;
pub use merge_points::MergePoints;
pub use merge_selected::MergeSelected;
pub use rebuild::{PointRemap, Rebuild};
pub use split_point::SplitPoint;

use crate::math::Point3;

/// How the position of a merged point is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// The merged point sits halfway between both inputs.
    #[default]
    Interpolate,
    /// The second point's position wins.
    Snap,
}

impl MergePolicy {
    /// Position of the point that results from merging `second` into `first`.
    #[must_use]
    pub fn resolve(self, first: &Point3, second: &Point3) -> Point3 {
        match self {
            MergePolicy::Interpolate => Point3::from((first.coords + second.coords) * 0.5),
            MergePolicy::Snap => *second,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::math::Point3;
    use crate::topology::{MeshStore, PatchId, GRID_SIZE, SLOT_COUNT};

    /// Unit-spaced flat grid whose top-left control point sits at `(x, y, 0)`.
    #[allow(clippy::cast_precision_loss)]
    pub fn grid(x: f64, y: f64) -> [Point3; SLOT_COUNT] {
        std::array::from_fn(|slot| {
            let (row, col) = (slot / GRID_SIZE, slot % GRID_SIZE);
            Point3::new(x + col as f64, y - row as f64, 0.0)
        })
    }

    /// Two unconnected patches, the second one 4 units right of the first.
    pub fn two_apart(store: &mut MeshStore) -> (PatchId, PatchId) {
        let a = store.add_patch_with_positions("Patch_0", &grid(0.0, 3.0));
        let b = store.add_patch_with_positions("Patch_1", &grid(4.0, 3.0));
        (a, b)
    }

    /// A 2x2 block of patches laid out edge to edge, unconnected:
    /// `[top_left, top_right, bottom_left, bottom_right]`.
    pub fn quad_block(store: &mut MeshStore) -> [PatchId; 4] {
        [
            store.add_patch_with_positions("Patch_0", &grid(0.0, 6.0)),
            store.add_patch_with_positions("Patch_1", &grid(3.0, 6.0)),
            store.add_patch_with_positions("Patch_2", &grid(0.0, 3.0)),
            store.add_patch_with_positions("Patch_3", &grid(3.0, 3.0)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolate_averages() {
        let p = MergePolicy::Interpolate.resolve(&Point3::new(0.0, 2.0, 4.0), &Point3::new(2.0, 2.0, 0.0));
        assert_eq!(p, Point3::new(1.0, 2.0, 2.0));
    }

    #[test]
    fn interpolate_of_equal_points_is_exact() {
        let a = Point3::new(0.1, -7.3, 1e-7);
        assert_eq!(MergePolicy::Interpolate.resolve(&a, &a), a);
    }

    #[test]
    fn snap_takes_second() {
        let p = MergePolicy::Snap.resolve(&Point3::new(0.0, 0.0, 0.0), &Point3::new(5.0, 6.0, 7.0));
        assert_eq!(p, Point3::new(5.0, 6.0, 7.0));
    }
}
