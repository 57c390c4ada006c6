use tracing::{debug, warn};

use crate::error::Result;
use crate::topology::{Direction, MeshStore, PatchId, PointId};

use super::{Attach, MergePolicy};

/// Attaches the patches of the two points flagged `selected_for_merge`.
///
/// The direction is inferred from the slots the two points occupy: the
/// unique direction whose boundary pairs those slots. Edge directions are
/// tried before corners. Merge flags are cleared once the attach is done.
pub struct MergeSelected {
    policy: MergePolicy,
}

impl MergeSelected {
    /// Creates a new `MergeSelected` operation.
    #[must_use]
    pub fn new(policy: MergePolicy) -> Self {
        Self { policy }
    }

    /// Executes the merge, returning the attach that was performed.
    ///
    /// Returns `None` without mutation unless exactly two points are flagged,
    /// their slots match a boundary pair, and that side of both patches is
    /// free. Merge flags are kept in that case.
    ///
    /// # Errors
    ///
    /// Returns an error if a flagged point or its owners are not in the store.
    pub fn execute(&self, store: &mut MeshStore) -> Result<Option<(Direction, PatchId, PatchId)>> {
        let flagged: Vec<PointId> = store
            .point_ids()
            .iter()
            .copied()
            .filter(|&id| store.point(id).is_ok_and(|p| p.selected_for_merge))
            .collect();
        let [first, second] = flagged[..] else {
            debug!(count = flagged.len(), "merge needs exactly two flagged points");
            return Ok(None);
        };

        let Some((direction, a, b)) = find_attachment(store, first, second)? else {
            warn!(?first, ?second, "selected points do not face each other across a boundary");
            return Ok(None);
        };

        Attach::new(direction, a, b)
            .with_policy(self.policy)
            .execute(store)?;
        if store.patch(a)?.neighbor(direction) != Some(b) {
            debug!(?a, ?b, ?direction, "attach refused, merge flags kept");
            return Ok(None);
        }
        for id in store.point_ids().to_vec() {
            store.point_mut(id)?.selected_for_merge = false;
        }
        Ok(Some((direction, a, b)))
    }
}

fn find_attachment(
    store: &MeshStore,
    first: PointId,
    second: PointId,
) -> Result<Option<(Direction, PatchId, PatchId)>> {
    let mut candidates = Vec::new();
    for &pa in &store.point(first)?.owners {
        let Some(sa) = store.patch(pa)?.slot_of(first) else {
            continue;
        };
        for &pb in &store.point(second)?.owners {
            if pa == pb {
                continue;
            }
            let Some(sb) = store.patch(pb)?.slot_of(second) else {
                continue;
            };
            for direction in Direction::ALL {
                if direction.boundary().contains(&(sa, sb)) {
                    candidates.push((direction, pa, pb));
                }
            }
        }
    }
    candidates.sort_by_key(|(direction, _, _)| direction.is_corner());
    Ok(candidates.into_iter().next())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::topology::fixtures::{grid, quad_block, two_apart};

    fn flag(store: &mut MeshStore, patch: PatchId, slot: usize) {
        let p = store.patch(patch).unwrap().points[slot];
        store.point_mut(p).unwrap().selected_for_merge = true;
    }

    #[test]
    fn edge_points_attach_along_edge() {
        let mut store = MeshStore::new();
        let (a, b) = two_apart(&mut store);
        flag(&mut store, a, 7);
        flag(&mut store, b, 4);

        let done = MergeSelected::new(MergePolicy::Interpolate)
            .execute(&mut store)
            .unwrap();

        assert_eq!(done, Some((Direction::Right, a, b)));
        assert_eq!(store.patch(a).unwrap().neighbor(Direction::Right), Some(b));
        assert!(store
            .point_ids()
            .iter()
            .all(|&p| !store.point(p).unwrap().selected_for_merge));
        store.validate().unwrap();
    }

    #[test]
    fn corner_points_attach_diagonally() {
        let mut store = MeshStore::new();
        let [tl, _, _, br] = quad_block(&mut store);
        flag(&mut store, tl, 15);
        flag(&mut store, br, 0);

        let done = MergeSelected::new(MergePolicy::Snap)
            .execute(&mut store)
            .unwrap();

        assert_eq!(done, Some((Direction::BelowRight, tl, br)));
        store.validate().unwrap();
    }

    #[test]
    fn edge_end_corners_attach_along_the_edge() {
        let mut store = MeshStore::new();
        let (a, b) = two_apart(&mut store);
        flag(&mut store, a, 3);
        flag(&mut store, b, 0);

        let done = MergeSelected::new(MergePolicy::Interpolate)
            .execute(&mut store)
            .unwrap();

        assert_eq!(done.map(|(d, _, _)| d), Some(Direction::Right));
        assert_eq!(store.point_count(), 28);
    }

    #[test]
    fn occupied_side_is_refused_and_flags_kept() {
        let mut store = MeshStore::new();
        let (a, b) = two_apart(&mut store);
        let c = store.add_patch_with_positions("Patch_2", &grid(4.0, -1.0));
        Attach::new(Direction::Right, a, b).execute(&mut store).unwrap();
        flag(&mut store, a, 7);
        flag(&mut store, c, 4);
        let points = store.point_count();

        let done = MergeSelected::new(MergePolicy::Interpolate)
            .execute(&mut store)
            .unwrap();

        assert!(done.is_none());
        assert_eq!(store.patch(c).unwrap().neighbor(Direction::Left), None);
        assert_eq!(store.patch(a).unwrap().neighbor(Direction::Right), Some(b));
        assert_eq!(store.point_count(), points);
        let flagged = store
            .point_ids()
            .iter()
            .filter(|&&p| store.point(p).unwrap().selected_for_merge)
            .count();
        assert_eq!(flagged, 2);
        store.validate().unwrap();
    }

    #[test]
    fn single_flag_is_noop() {
        let mut store = MeshStore::new();
        let (a, _) = two_apart(&mut store);
        flag(&mut store, a, 3);
        let done = MergeSelected::new(MergePolicy::Interpolate)
            .execute(&mut store)
            .unwrap();
        assert!(done.is_none());
        assert_eq!(store.point_count(), 32);
    }

    #[test]
    fn interior_points_do_not_merge() {
        let mut store = MeshStore::new();
        let (a, b) = two_apart(&mut store);
        flag(&mut store, a, 5);
        flag(&mut store, b, 6);
        let done = MergeSelected::new(MergePolicy::Interpolate)
            .execute(&mut store)
            .unwrap();
        assert!(done.is_none());
        assert_eq!(store.point_count(), 32);
    }
}
