use tracing::{debug, warn};

use crate::error::Result;
use crate::topology::{MeshStore, PatchId, PointId};

use super::Rebuild;

/// Removes every patch that owns the given point.
///
/// Neighbors of the removed patches lose their links to them, and points
/// left without any owner are destroyed. The mesh is rebuilt afterwards.
pub struct DeletePatchGroup {
    point: PointId,
}

impl DeletePatchGroup {
    /// Creates a new `DeletePatchGroup` operation.
    #[must_use]
    pub fn new(point: PointId) -> Self {
        Self { point }
    }

    /// Executes the deletion, returning the removed patch keys.
    ///
    /// Anchors own no patches and are refused.
    ///
    /// # Errors
    ///
    /// Returns an error if the point or one of its owners is not in the
    /// store. The store is unchanged in that case.
    pub fn execute(&self, store: &mut MeshStore) -> Result<Vec<PatchId>> {
        let point = self.point;
        if store.is_anchor(point) {
            warn!(?point, "anchor points cannot be deleted");
            return Ok(Vec::new());
        }
        let doomed: Vec<PatchId> = store.point(point)?.owners.iter().copied().collect();
        for &patch in &doomed {
            store.patch(patch)?;
        }

        for &patch in &doomed {
            let data = store.remove_patch(patch)?;
            for (direction, neighbor) in data.linked() {
                if let Ok(other) = store.patch_mut(neighbor) {
                    if other.neighbor(direction.opposite()) == Some(patch) {
                        other.set_neighbor(direction.opposite(), None);
                    }
                }
            }
            for slot_point in data.unique_points() {
                let orphaned = {
                    let owned = store.point_mut(slot_point)?;
                    owned.owners.remove(&patch);
                    owned.owners.is_empty()
                };
                if orphaned {
                    store.remove_point(slot_point)?;
                }
            }
        }

        Rebuild::new().execute(store)?;
        debug!(?point, removed = doomed.len(), "patch group deleted");
        Ok(doomed)
    }
}
