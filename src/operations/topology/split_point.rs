use tracing::{debug, warn};

use crate::error::Result;
use crate::topology::{Direction, MeshStore, PatchId, PointId};

use super::Rebuild;

/// Separates a point shared by several patches into one private point per
/// patch.
///
/// Links among the owners whose shared boundary contains the point are
/// dissolved first, otherwise the closing [`Rebuild`] would merge the copies
/// again.
pub struct SplitPoint {
    point: PointId,
}

impl SplitPoint {
    /// Creates a new `SplitPoint` operation.
    #[must_use]
    pub fn new(point: PointId) -> Self {
        Self { point }
    }

    /// Executes the split.
    ///
    /// Anchors are refused and points with a single owner are left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the point or one of its owners is not in the
    /// store. The store is unchanged in that case.
    pub fn execute(&self, store: &mut MeshStore) -> Result<()> {
        let point = self.point;
        if store.is_anchor(point) {
            warn!(?point, "anchor points cannot be split");
            return Ok(());
        }
        let owners: Vec<PatchId> = store.point(point)?.owners.iter().copied().collect();
        if owners.len() <= 1 {
            debug!(?point, "point has a single owner, nothing to split");
            return Ok(());
        }

        let mut links: Vec<(PatchId, Direction)> = Vec::new();
        for &owner in &owners {
            let patch = store.patch(owner)?;
            for (direction, neighbor) in patch.linked() {
                let through_point = direction
                    .boundary()
                    .iter()
                    .any(|&(slot, _)| patch.points[slot] == point);
                if through_point && owners.contains(&neighbor) {
                    links.push((owner, direction));
                }
            }
        }

        for (owner, direction) in links {
            store.unlink(owner, direction)?;
        }
        split_owners(store, point)?;
        Rebuild::new().execute(store)?;
        debug!(?point, owners = owners.len(), "point split");
        Ok(())
    }
}

/// Gives every owner after the first a private copy of `point`.
pub(super) fn split_owners(store: &mut MeshStore, point: PointId) -> Result<()> {
    let data = store.point(point)?;
    let extra: Vec<PatchId> = data.owners.iter().skip(1).copied().collect();
    let template = data.duplicate();
    for owner in extra {
        let mut copy = template.clone();
        copy.owners.insert(owner);
        let copy = store.add_point(copy);
        store.patch_mut(owner)?.replace_point(point, copy);
        store.point_mut(point)?.owners.remove(&owner);
    }
    Ok(())
}
