use tracing::{debug, warn};

use crate::error::Result;
use crate::topology::{Direction, MeshStore, PatchId};

use super::{MergePoints, MergePolicy};

/// Connects `second` to `first` in the given direction.
///
/// Each boundary point pair is merged into one shared point and the
/// symmetric neighbor keys are set. Edges merge 4 pairs, corners 1.
///
/// `Right`, `Below`, `BelowLeft` and `BelowRight` are carried out as the
/// mirrored attach with swapped patches. Under [`MergePolicy::Snap`] the
/// boundary positions are exchanged first, so the second patch's positions
/// win in every direction.
pub struct Attach {
    direction: Direction,
    first: PatchId,
    second: PatchId,
    policy: MergePolicy,
}

impl Attach {
    /// Creates a new `Attach` operation using [`MergePolicy::Interpolate`].
    #[must_use]
    pub fn new(direction: Direction, first: PatchId, second: PatchId) -> Self {
        Self {
            direction,
            first,
            second,
            policy: MergePolicy::default(),
        }
    }

    /// Sets how merged boundary positions are chosen.
    #[must_use]
    pub fn with_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Executes the attach.
    ///
    /// Nothing happens if a patch is attached to itself or if either side
    /// already has a different neighbor in that slot.
    ///
    /// # Errors
    ///
    /// Returns an error if either patch is not in the store.
    pub fn execute(&self, store: &mut MeshStore) -> Result<()> {
        let (first, second, direction) = (self.first, self.second, self.direction);
        if first == second {
            warn!(?first, ?direction, "cannot attach a patch to itself");
            return Ok(());
        }

        let existing = store.patch(first)?.neighbor(direction);
        let existing_back = store.patch(second)?.neighbor(direction.opposite());
        if existing.is_some_and(|n| n != second) || existing_back.is_some_and(|n| n != first) {
            warn!(
                ?first,
                ?second,
                ?direction,
                "attach refused: side already connected to another patch"
            );
            return Ok(());
        }

        match direction {
            Direction::Right | Direction::Below | Direction::BelowLeft | Direction::BelowRight => {
                if self.policy == MergePolicy::Snap {
                    swap_boundary_positions(store, direction, first, second)?;
                }
                merge_boundary(store, direction.opposite(), second, first, self.policy)
            }
            _ => merge_boundary(store, direction, first, second, self.policy),
        }
    }
}

/// Merges every boundary pair of `direction` (first's point survives) and
/// links the two patches.
fn merge_boundary(
    store: &mut MeshStore,
    direction: Direction,
    first: PatchId,
    second: PatchId,
    policy: MergePolicy,
) -> Result<()> {
    for &(first_slot, second_slot) in direction.boundary() {
        // Slots are re-read each time: a previous merge may have rewritten them.
        let kept = store.patch(first)?.points[first_slot];
        let absorbed = store.patch(second)?.points[second_slot];
        MergePoints::new(kept, absorbed)
            .with_policy(policy)
            .execute(store)?;
    }
    store.link(first, direction, second)?;
    debug!(?first, ?second, ?direction, "patches attached");
    Ok(())
}

fn swap_boundary_positions(
    store: &mut MeshStore,
    direction: Direction,
    first: PatchId,
    second: PatchId,
) -> Result<()> {
    for &(first_slot, second_slot) in direction.boundary() {
        let a = store.patch(first)?.points[first_slot];
        let b = store.patch(second)?.points[second_slot];
        if a == b {
            continue;
        }
        let pa = store.point(a)?.position;
        let pb = store.point(b)?.position;
        store.point_mut(a)?.position = pb;
        store.point_mut(b)?.position = pa;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::topology::fixtures::{grid, quad_block, two_apart};

    fn boundary_points(store: &MeshStore, patch: PatchId, slots: &[usize]) -> Vec<Point3> {
        let data = store.patch(patch).unwrap();
        slots
            .iter()
            .map(|&s| store.point(data.points[s]).unwrap().position)
            .collect()
    }

    #[test]
    fn right_attach_interpolates_and_shares_identity() {
        let mut store = MeshStore::new();
        let (a, b) = two_apart(&mut store);
        let before_a = boundary_points(&store, a, &[3, 7, 11, 15]);
        let before_b = boundary_points(&store, b, &[0, 4, 8, 12]);

        Attach::new(Direction::Right, a, b).execute(&mut store).unwrap();

        let pa = store.patch(a).unwrap().clone();
        let pb = store.patch(b).unwrap().clone();
        for (i, (sa, sb)) in [(3, 0), (7, 4), (11, 8), (15, 12)].into_iter().enumerate() {
            assert_eq!(pa.points[sa], pb.points[sb]);
            let expected = Point3::from((before_a[i].coords + before_b[i].coords) * 0.5);
            assert_eq!(store.point(pa.points[sa]).unwrap().position, expected);
        }
        assert_eq!(pa.neighbor(Direction::Right), Some(b));
        assert_eq!(pb.neighbor(Direction::Left), Some(a));
        assert_eq!(store.point_count(), 28);
        store.validate().unwrap();
    }

    #[test]
    fn above_attach_snap_takes_second_positions() {
        let mut store = MeshStore::new();
        let a = store.add_patch_with_positions("Patch_0", &grid(0.0, 3.0));
        let b = store.add_patch_with_positions("Patch_1", &grid(0.0, 7.0));
        let expected = boundary_points(&store, b, &[12, 13, 14, 15]);

        Attach::new(Direction::Above, a, b)
            .with_policy(MergePolicy::Snap)
            .execute(&mut store)
            .unwrap();

        assert_eq!(boundary_points(&store, a, &[0, 1, 2, 3]), expected);
        store.validate().unwrap();
    }

    #[test]
    fn below_attach_snap_also_takes_second_positions() {
        let mut store = MeshStore::new();
        let a = store.add_patch_with_positions("Patch_0", &grid(0.0, 7.0));
        let b = store.add_patch_with_positions("Patch_1", &grid(0.0, 3.0));
        let expected = boundary_points(&store, b, &[0, 1, 2, 3]);

        Attach::new(Direction::Below, a, b)
            .with_policy(MergePolicy::Snap)
            .execute(&mut store)
            .unwrap();

        assert_eq!(boundary_points(&store, a, &[12, 13, 14, 15]), expected);
        assert_eq!(store.patch(a).unwrap().neighbor(Direction::Below), Some(b));
        assert_eq!(store.patch(b).unwrap().neighbor(Direction::Above), Some(a));
        store.validate().unwrap();
    }

    #[test]
    fn corner_attach_merges_one_point_and_links() {
        let mut store = MeshStore::new();
        let [tl, _, _, br] = quad_block(&mut store);
        Attach::new(Direction::BelowRight, tl, br).execute(&mut store).unwrap();

        assert_eq!(store.patch(tl).unwrap().points[15], store.patch(br).unwrap().points[0]);
        assert_eq!(store.patch(tl).unwrap().neighbor(Direction::BelowRight), Some(br));
        assert_eq!(store.patch(br).unwrap().neighbor(Direction::AboveLeft), Some(tl));
        assert_eq!(store.point_count(), 63);
        store.validate().unwrap();
    }

    #[test]
    fn four_patches_share_center_point() {
        let mut store = MeshStore::new();
        let [tl, tr, bl, br] = quad_block(&mut store);
        Attach::new(Direction::Right, tl, tr).execute(&mut store).unwrap();
        Attach::new(Direction::Right, bl, br).execute(&mut store).unwrap();
        Attach::new(Direction::Below, tl, bl).execute(&mut store).unwrap();
        Attach::new(Direction::Below, tr, br).execute(&mut store).unwrap();
        Attach::new(Direction::BelowRight, tl, br).execute(&mut store).unwrap();
        Attach::new(Direction::BelowLeft, tr, bl).execute(&mut store).unwrap();

        let center = store.patch(tl).unwrap().points[15];
        assert_eq!(store.point(center).unwrap().owners.len(), 4);
        assert_eq!(store.point(center).unwrap().position, Point3::new(3.0, 3.0, 0.0));
        // 7 x 7 grid of distinct control points.
        assert_eq!(store.point_count(), 49);
        store.validate().unwrap();
    }

    #[test]
    fn conflicting_neighbor_is_refused() {
        let mut store = MeshStore::new();
        let [tl, tr, bl, _] = quad_block(&mut store);
        Attach::new(Direction::Right, tl, tr).execute(&mut store).unwrap();
        Attach::new(Direction::Right, tl, bl).execute(&mut store).unwrap();

        assert_eq!(store.patch(tl).unwrap().neighbor(Direction::Right), Some(tr));
        assert_eq!(store.patch(bl).unwrap().neighbor(Direction::Left), None);
        assert_ne!(store.patch(tl).unwrap().points[3], store.patch(bl).unwrap().points[0]);
        store.validate().unwrap();
    }

    #[test]
    fn repeated_attach_is_idempotent() {
        let mut store = MeshStore::new();
        let (a, b) = two_apart(&mut store);
        Attach::new(Direction::Right, a, b).execute(&mut store).unwrap();
        Attach::new(Direction::Left, b, a).execute(&mut store).unwrap();
        assert_eq!(store.point_count(), 28);
        store.validate().unwrap();
    }

    #[test]
    fn self_attach_is_refused() {
        let mut store = MeshStore::new();
        let (a, _) = two_apart(&mut store);
        Attach::new(Direction::Above, a, a).execute(&mut store).unwrap();
        assert_eq!(store.patch(a).unwrap().neighbor(Direction::Above), None);
        store.validate().unwrap();
    }
}
