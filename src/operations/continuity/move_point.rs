use tracing::trace;

use crate::error::Result;
use crate::math::{Vector3, TOLERANCE};
use crate::topology::{MeshStore, PatchId, PointId};

use super::{fix_colinear, Continuity};

/// Re-mirrors `mirror` through `pivot` from the dragged point.
#[derive(Debug, Clone, Copy)]
struct Reflection {
    pivot: PointId,
    mirror: PointId,
}

/// Drags a control point by `delta`, keeping the requested continuity with
/// every neighboring patch.
///
/// For each patch owning the point and each neighbor of that patch, every
/// shared boundary point is a pivot with one control point on either side
/// (the slots one step inward from the boundary). The control point on the
/// neighbor's side is re-mirrored with [`fix_colinear`] when:
///
/// - the dragged point is the near control point: it is reflected through
///   the pivot;
/// - the dragged point is the pivot itself: it is reflected through the
///   pivot's old position. Each such link is corrected once, from the owner
///   that comes first in patch order, and a zero `delta` leaves it alone.
///
/// A mirror that is the dragged point itself only receives the final
/// translation. Anchors, and any point under [`Continuity::None`], are simply
/// translated.
pub struct MovePoint {
    point: PointId,
    delta: Vector3,
    continuity: Continuity,
}

impl MovePoint {
    /// Creates a new `MovePoint` operation.
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
    /// Returns an error if the point or a patch it belongs to is not in the
    /// store. The store is unchanged in that case.
    pub fn execute(&self, store: &mut MeshStore) -> Result<()> {
        let point = self.point;
        store.point(point)?;
        if store.is_anchor(point) || self.continuity == Continuity::None {
            store.point_mut(point)?.position += self.delta;
            return Ok(());
        }

        let dragging_pivot = self.delta.norm() >= TOLERANCE;
        let reflections = collect_reflections(store, point, dragging_pivot)?;
        let moved = store.point(point)?.position;
        for reflection in &reflections {
            let pivot = store.point(reflection.pivot)?.position;
            let target = store.point_mut(reflection.mirror)?;
            target.position = fix_colinear(
                &moved,
                &pivot,
                &target.position,
                &self.delta,
                self.continuity,
            );
        }
        store.point_mut(point)?.position += self.delta;
        trace!(?point, corrections = reflections.len(), "point moved");
        Ok(())
    }
}

fn collect_reflections(
    store: &MeshStore,
    point: PointId,
    dragging_pivot: bool,
) -> Result<Vec<Reflection>> {
    let mut owners: Vec<PatchId> = store.point(point)?.owners.iter().copied().collect();
    owners.sort_by_key(|&owner| store.patch_index(owner));

    let mut reflections: Vec<Reflection> = Vec::new();
    let mut push = |reflection: Reflection| {
        let target = reflection.mirror;
        if target != point && reflections.iter().all(|r| r.mirror != target) {
            reflections.push(reflection);
        }
    };

    for (rank, &owner) in owners.iter().enumerate() {
        let patch = store.patch(owner)?;
        for (direction, neighbor_id) in patch.linked() {
            let neighbor = store.patch(neighbor_id)?;
            for &(slot, neighbor_slot) in direction.boundary() {
                let pivot = patch.points[slot];
                if pivot != neighbor.points[neighbor_slot] {
                    continue;
                }
                let near = patch.points[direction.inward(slot)];
                let far = neighbor.points[direction.opposite().inward(neighbor_slot)];
                let pivot_role =
                    pivot == point && dragging_pivot && !owners[..rank].contains(&neighbor_id);
                if near == point || pivot_role {
                    push(Reflection { pivot, mirror: far });
                }
            }
        }
    }
    Ok(reflections)
}
