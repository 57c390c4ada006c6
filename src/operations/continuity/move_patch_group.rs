use tracing::debug;

use crate::error::Result;
use crate::math::Vector3;
use crate::topology::{MeshStore, PointId};

use super::{Continuity, MovePoint};

/// Translates every patch owning a point, then re-runs the continuity
/// correction around that point.
///
/// Points shared by several of the moved patches are translated once.
/// Moving an anchor translates only the anchor.
pub struct MovePatchGroup {
    point: PointId,
    delta: Vector3,
    continuity: Continuity,
}

impl MovePatchGroup {
    /// Creates a new `MovePatchGroup` operation.
    #[must_use]
    pub fn new(point: PointId, delta: Vector3, continuity: Continuity) -> Self {
        Self {
            point,
            delta,
            continuity,
        }
    }

    /// Executes the move.
    ///
    /// # Errors
    ///
    /// Returns an error if the point or one of its owners is not in the store.
    pub fn execute(&self, store: &mut MeshStore) -> Result<()> {
        let owners: Vec<_> = store.point(self.point)?.owners.iter().copied().collect();
        if owners.is_empty() {
            store.point_mut(self.point)?.position += self.delta;
            return Ok(());
        }

        let mut group: Vec<PointId> = Vec::new();
        for &owner in &owners {
            for p in store.patch(owner)?.unique_points() {
                if !group.contains(&p) {
                    group.push(p);
                }
            }
        }
        for &p in &group {
            MovePoint::new(p, self.delta, Continuity::None).execute(store)?;
        }
        MovePoint::new(self.point, Vector3::zeros(), self.continuity).execute(store)?;
        debug!(
            point = ?self.point,
            patches = owners.len(),
            points = group.len(),
            "patch group moved"
        );
        Ok(())
    }
}
