use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::Result;
use crate::topology::{Direction, MeshStore, PatchId, PointData, PointId, SLOT_COUNT};

use super::Attach;

/// Maps point keys from before a rebuild to the keys that replaced them.
pub type PointRemap = HashMap<PointId, PointId>;

/// Re-derives all shared-vertex identity from the neighbor links.
///
/// The links are snapshotted as `(patch, direction, neighbor)` triples
/// restricted to [`Direction::FORWARD`], every patch gets 16 private copies
/// of its points (position and flags), the old points are discarded, and the
/// snapshotted links are replayed through [`Attach`].
///
/// Patch keys survive a rebuild. Point keys do not; the returned
/// [`PointRemap`] translates them.
#[derive(Debug, Default)]
pub struct Rebuild;

impl Rebuild {
    /// Creates a new `Rebuild` operation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the rebuild.
    ///
    /// # Errors
    ///
    /// Returns an error if a patch references a point that is not in the
    /// store. The store is unchanged in that case.
    pub fn execute(&self, store: &mut MeshStore) -> Result<PointRemap> {
        let patch_ids = store.patch_ids().to_vec();

        let mut links: Vec<(PatchId, Direction, PatchId)> = Vec::new();
        let mut snapshots: Vec<(PatchId, Vec<(PointId, PointData)>)> =
            Vec::with_capacity(patch_ids.len());
        for &id in &patch_ids {
            let patch = store.patch(id)?;
            for direction in Direction::FORWARD {
                let Some(neighbor) = patch.neighbor(direction) else {
                    continue;
                };
                if store.contains_patch(neighbor) {
                    links.push((id, direction, neighbor));
                } else {
                    warn!(patch = ?id, ?direction, "dropping link to a deleted patch");
                }
            }
            let mut points = Vec::with_capacity(SLOT_COUNT);
            for &point in &patch.points {
                points.push((point, store.point(point)?.duplicate()));
            }
            snapshots.push((id, points));
        }

        store.clear_points();
        for (id, points) in &snapshots {
            let mut fresh = [PointId::default(); SLOT_COUNT];
            for (slot, (_, data)) in points.iter().enumerate() {
                let mut data = data.clone();
                data.owners.insert(*id);
                fresh[slot] = store.add_point(data);
            }
            let patch = store.patch_mut(*id)?;
            patch.points = fresh;
            patch.neighbors = [None; 8];
        }

        for &(first, direction, second) in &links {
            Attach::new(direction, first, second).execute(store)?;
        }

        let mut remap = PointRemap::new();
        for (id, points) in &snapshots {
            let patch = store.patch(*id)?;
            for (slot, (old, _)) in points.iter().enumerate() {
                remap.entry(*old).or_insert(patch.points[slot]);
            }
        }

        debug!(
            patches = patch_ids.len(),
            links = links.len(),
            points = store.point_count(),
            "mesh rebuilt"
        );
        Ok(remap)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::topology::fixtures::{quad_block, two_apart};
    use crate::operations::topology::MergePoints;

    #[test]
    fn rebuild_preserves_links_and_sharing() {
        let mut store = MeshStore::new();
        let (a, b) = two_apart(&mut store);
        Attach::new(Direction::Right, a, b).execute(&mut store).unwrap();
        let before = store.patch_positions(b).unwrap();

        let remap = Rebuild::new().execute(&mut store).unwrap();

        assert_eq!(store.patch_count(), 2);
        assert_eq!(store.point_count(), 28);
        assert_eq!(store.patch(a).unwrap().neighbor(Direction::Right), Some(b));
        assert_eq!(store.patch(b).unwrap().neighbor(Direction::Left), Some(a));
        assert_eq!(store.patch_positions(b).unwrap(), before);
        assert_eq!(remap.len(), 28);
        store.validate().unwrap();
    }

    #[test]
    fn rebuild_replaces_every_point() {
        let mut store = MeshStore::new();
        let (a, _) = two_apart(&mut store);
        let old = store.patch(a).unwrap().points[6];
        store.point_mut(old).unwrap().selected = true;

        let remap = Rebuild::new().execute(&mut store).unwrap();

        assert!(!store.contains_point(old));
        let new = remap[&old];
        assert_eq!(store.patch(a).unwrap().points[6], new);
        assert!(store.point(new).unwrap().selected);
        store.validate().unwrap();
    }

    #[test]
    fn rebuild_drops_sharing_without_link() {
        let mut store = MeshStore::new();
        let (a, b) = two_apart(&mut store);
        let pa = store.patch(a).unwrap().points[3];
        let pb = store.patch(b).unwrap().points[0];
        MergePoints::new(pa, pb).execute(&mut store).unwrap();

        Rebuild::new().execute(&mut store).unwrap();

        assert_eq!(store.point_count(), 32);
        let (na, nb) = (store.patch(a).unwrap().points[3], store.patch(b).unwrap().points[0]);
        assert_ne!(na, nb);
        assert_eq!(store.point(na).unwrap().position, Point3::new(3.5, 3.0, 0.0));
        assert_eq!(store.point(nb).unwrap().position, Point3::new(3.5, 3.0, 0.0));
        store.validate().unwrap();
    }

    #[test]
    fn rebuild_of_full_block_restores_center() {
        let mut store = MeshStore::new();
        let [tl, tr, bl, br] = quad_block(&mut store);
        Attach::new(Direction::Right, tl, tr).execute(&mut store).unwrap();
        Attach::new(Direction::Right, bl, br).execute(&mut store).unwrap();
        Attach::new(Direction::Below, tl, bl).execute(&mut store).unwrap();
        Attach::new(Direction::Below, tr, br).execute(&mut store).unwrap();

        Rebuild::new().execute(&mut store).unwrap();

        let center = store.patch(tl).unwrap().points[15];
        assert_eq!(store.point(center).unwrap().owners.len(), 4);
        assert_eq!(store.point_count(), 49);
        store.validate().unwrap();
    }
}
