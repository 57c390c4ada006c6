use tracing::{debug, warn};

use crate::error::Result;
use crate::topology::{Direction, MeshStore, PatchId, PointId};

use super::split_point::split_owners;
use super::Rebuild;

/// Disconnects `second` from `first` in the given direction.
///
/// The neighbor links are cleared and every boundary point the two patches
/// shared is duplicated, the copy going to `second`. When a shared point
/// still has to be shared with `second` through another link (a junction of
/// three or four patches), it is split and the mesh is rebuilt from the
/// remaining links.
pub struct Detach {
    direction: Direction,
    first: PatchId,
    second: PatchId,
}

impl Detach {
    /// Creates a new `Detach` operation.
    #[must_use]
    pub fn new(direction: Direction, first: PatchId, second: PatchId) -> Self {
        Self {
            direction,
            first,
            second,
        }
    }

    /// Executes the detach.
    ///
    /// Nothing happens if `second` is not `first`'s neighbor in that
    /// direction.
    ///
    /// # Errors
    ///
    /// Returns an error if either patch or a boundary point is not in the
    /// store.
    pub fn execute(&self, store: &mut MeshStore) -> Result<()> {
        let (first, second, direction) = (self.first, self.second, self.direction);
        let first_data = store.patch(first)?;
        let second_data = store.patch(second)?;
        if first_data.neighbor(direction) != Some(second) {
            warn!(?first, ?second, ?direction, "detach refused: patches are not linked");
            return Ok(());
        }

        let shared: Vec<PointId> = direction
            .boundary()
            .iter()
            .map(|&(f, s)| (first_data.points[f], second_data.points[s]))
            .filter(|(a, b)| a == b)
            .map(|(a, _)| a)
            .collect();
        for &point in &shared {
            store.point(point)?;
        }

        store.unlink(first, direction)?;

        let mut junctions = Vec::new();
        for point in shared {
            let mut copy = store.point(point)?.duplicate();
            copy.owners.insert(second);
            let copy = store.add_point(copy);
            store.patch_mut(second)?.replace_point(point, copy);
            store.point_mut(point)?.owners.remove(&second);
            if still_shared_with(store, point, second)? {
                junctions.push(point);
            }
        }

        if !junctions.is_empty() {
            for &point in &junctions {
                split_owners(store, point)?;
            }
            Rebuild::new().execute(store)?;
        }
        debug!(?first, ?second, ?direction, junctions = junctions.len(), "patches detached");
        Ok(())
    }
}

/// Returns `true` if some remaining owner of `point` is still linked to
/// `patch` through a boundary that contains `point`.
fn still_shared_with(store: &MeshStore, point: PointId, patch: PatchId) -> Result<bool> {
    for &owner in &store.point(point)?.owners {
        let data = store.patch(owner)?;
        for (direction, neighbor) in data.linked() {
            if neighbor == patch
                && direction
                    .boundary()
                    .iter()
                    .any(|&(slot, _)| data.points[slot] == point)
            {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::topology::fixtures::{quad_block, two_apart};
    use crate::operations::topology::Attach;

    #[test]
    fn detach_gives_second_fresh_points() {
        let mut store = MeshStore::new();
        let (a, b) = two_apart(&mut store);
        Attach::new(Direction::Right, a, b).execute(&mut store).unwrap();
        let shared: Vec<PointId> = [3, 7, 11, 15]
            .iter()
            .map(|&s| store.patch(a).unwrap().points[s])
            .collect();
        let values: Vec<_> = shared
            .iter()
            .map(|&p| store.point(p).unwrap().position)
            .collect();

        Detach::new(Direction::Right, a, b).execute(&mut store).unwrap();

        let pa = store.patch(a).unwrap();
        let pb = store.patch(b).unwrap();
        for (i, (sa, sb)) in [(3, 0), (7, 4), (11, 8), (15, 12)].into_iter().enumerate() {
            assert_eq!(pa.points[sa], shared[i]);
            assert_ne!(pb.points[sb], shared[i]);
            assert_eq!(store.point(pb.points[sb]).unwrap().position, values[i]);
        }
        assert_eq!(pa.neighbor(Direction::Right), None);
        assert_eq!(pb.neighbor(Direction::Left), None);
        assert_eq!(store.point_count(), 32);
        store.validate().unwrap();
    }

    #[test]
    fn detached_points_move_independently() {
        let mut store = MeshStore::new();
        let (a, b) = two_apart(&mut store);
        Attach::new(Direction::Right, a, b).execute(&mut store).unwrap();
        Detach::new(Direction::Right, a, b).execute(&mut store).unwrap();

        let pb = store.patch(b).unwrap().points[4];
        store.point_mut(pb).unwrap().position.z = 2.0;
        let pa = store.patch(a).unwrap().points[7];
        assert!(store.point(pa).unwrap().position.z.abs() < f64::EPSILON);
    }

    #[test]
    fn detach_without_link_is_noop() {
        let mut store = MeshStore::new();
        let (a, b) = two_apart(&mut store);
        Detach::new(Direction::Right, a, b).execute(&mut store).unwrap();
        assert_eq!(store.point_count(), 32);
        store.validate().unwrap();
    }

    #[test]
    fn detach_edge_in_block_keeps_center_shared_through_other_links() {
        let mut store = MeshStore::new();
        let [tl, tr, bl, br] = quad_block(&mut store);
        Attach::new(Direction::Right, tl, tr).execute(&mut store).unwrap();
        Attach::new(Direction::Right, bl, br).execute(&mut store).unwrap();
        Attach::new(Direction::Below, tl, bl).execute(&mut store).unwrap();
        Attach::new(Direction::Below, tr, br).execute(&mut store).unwrap();

        Detach::new(Direction::Right, tl, tr).execute(&mut store).unwrap();

        // tl and tr still meet at the center via bl and br.
        let center = store.patch(tl).unwrap().points[15];
        assert_eq!(store.patch(tr).unwrap().points[12], center);
        assert_eq!(store.point(center).unwrap().owners.len(), 4);
        // The other three edge points are no longer shared.
        for (sa, sb) in [(3, 0), (7, 4), (11, 8)] {
            assert_ne!(store.patch(tl).unwrap().points[sa], store.patch(tr).unwrap().points[sb]);
        }
        assert_eq!(store.patch(tl).unwrap().neighbor(Direction::Right), None);
        assert_eq!(store.point_count(), 52);
        store.validate().unwrap();
    }

    #[test]
    fn detach_corner_of_block_splits_corner_point() {
        let mut store = MeshStore::new();
        let [tl, _, _, br] = quad_block(&mut store);
        Attach::new(Direction::BelowRight, tl, br).execute(&mut store).unwrap();

        Detach::new(Direction::BelowRight, tl, br).execute(&mut store).unwrap();

        assert_ne!(store.patch(tl).unwrap().points[15], store.patch(br).unwrap().points[0]);
        assert_eq!(store.patch(br).unwrap().neighbor(Direction::AboveLeft), None);
        assert_eq!(store.point_count(), 64);
        store.validate().unwrap();
    }
}
