pub mod direction;
pub mod patch;
pub mod point;

pub use direction::Direction;
pub use patch::{PatchData, PatchId, SideColor, GRID_SIZE, SLOT_COUNT};
pub use point::{PointData, PointId};

use crate::error::TopologyError;
use crate::math::{Aabb, Point3};
use slotmap::SlotMap;

/// Central arena that owns all points and patches of one document.
///
/// Patches reference points and each other through typed keys (generational
/// indices), so two slots sharing a control point simply hold the same
/// [`PointId`]. Insertion order is tracked separately to give the stable,
/// index-addressable iteration the editor shell relies on.
///
/// The two anchor points (contact point and end point) live in the same point
/// arena but are never owned by a patch and never appear in [`Self::point_ids`].
#[derive(Debug)]
pub struct MeshStore {
    points: SlotMap<PointId, PointData>,
    patches: SlotMap<PatchId, PatchData>,
    point_order: Vec<PointId>,
    patch_order: Vec<PatchId>,
    contact_point: PointId,
    end_point: PointId,
}

impl Default for MeshStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshStore {
    /// Creates an empty store holding only the two anchor points.
    #[must_use]
    pub fn new() -> Self {
        let mut points = SlotMap::with_key();
        let contact_point = points.insert(PointData::new(Point3::origin()));
        let end_point = points.insert(PointData::new(Point3::origin()));
        Self {
            points,
            patches: SlotMap::with_key(),
            point_order: Vec::new(),
            patch_order: Vec::new(),
            contact_point,
            end_point,
        }
    }

    // --- Anchors ---

    /// The anchor the whole mesh is attached by.
    #[must_use]
    pub fn contact_point(&self) -> PointId {
        self.contact_point
    }

    /// The anchor marking the far end of the mesh.
    #[must_use]
    pub fn end_point(&self) -> PointId {
        self.end_point
    }

    /// Returns `true` if `id` is one of the two anchors.
    #[must_use]
    pub fn is_anchor(&self, id: PointId) -> bool {
        id == self.contact_point || id == self.end_point
    }

    /// Resolves an editor point id: 0 and 1 are the anchors, `n >= 2` is the
    /// `n - 2`th patch point in insertion order.
    #[must_use]
    pub fn point_by_id(&self, id: usize) -> Option<PointId> {
        match id {
            0 => Some(self.contact_point),
            1 => Some(self.end_point),
            n => self.point_at(n - 2),
        }
    }

    // --- Point operations ---

    /// Inserts a point and returns its ID.
    pub fn add_point(&mut self, data: PointData) -> PointId {
        let id = self.points.insert(data);
        self.point_order.push(id);
        id
    }

    /// Returns a reference to the point data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn point(&self, id: PointId) -> Result<&PointData, TopologyError> {
        self.points
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("point {id:?}")))
    }

    /// Returns a mutable reference to the point data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn point_mut(&mut self, id: PointId) -> Result<&mut PointData, TopologyError> {
        self.points
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("point {id:?}")))
    }

    /// Removes a patch point from the store and returns its data.
    ///
    /// # Errors
    ///
    /// Returns an error if the point is not found or is an anchor.
    pub fn remove_point(&mut self, id: PointId) -> Result<PointData, TopologyError> {
        if self.is_anchor(id) {
            return Err(TopologyError::InvalidTopology(
                "anchor points cannot be removed".into(),
            ));
        }
        let data = self
            .points
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("point {id:?}")))?;
        self.point_order.retain(|&p| p != id);
        Ok(data)
    }

    /// Returns `true` if the point is live.
    #[must_use]
    pub fn contains_point(&self, id: PointId) -> bool {
        self.points.contains_key(id)
    }

    /// Patch points in insertion order (anchors excluded).
    #[must_use]
    pub fn point_ids(&self) -> &[PointId] {
        &self.point_order
    }

    /// The `index`th patch point in insertion order.
    #[must_use]
    pub fn point_at(&self, index: usize) -> Option<PointId> {
        self.point_order.get(index).copied()
    }

    /// Number of patch points (anchors excluded).
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.point_order.len()
    }

    // --- Patch operations ---

    /// Inserts a patch and returns its ID.
    ///
    /// The caller is responsible for registering the patch as owner of its
    /// points; [`Self::add_patch_with_positions`] does both.
    pub fn add_patch(&mut self, data: PatchData) -> PatchId {
        let id = self.patches.insert(data);
        self.patch_order.push(id);
        id
    }

    /// Creates a patch over 16 fresh points at the given positions.
    pub fn add_patch_with_positions(
        &mut self,
        name: impl Into<String>,
        positions: &[Point3; SLOT_COUNT],
    ) -> PatchId {
        let points: [PointId; SLOT_COUNT] =
            std::array::from_fn(|slot| self.add_point(PointData::new(positions[slot])));
        let patch = self.add_patch(PatchData::new(name, points));
        for id in points {
            if let Some(point) = self.points.get_mut(id) {
                point.owners.insert(patch);
            }
        }
        patch
    }

    /// Returns a reference to the patch data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn patch(&self, id: PatchId) -> Result<&PatchData, TopologyError> {
        self.patches
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("patch {id:?}")))
    }

    /// Returns a mutable reference to the patch data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn patch_mut(&mut self, id: PatchId) -> Result<&mut PatchData, TopologyError> {
        self.patches
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("patch {id:?}")))
    }

    /// Removes a patch from the store and returns its data.
    ///
    /// Ownership sets and neighbor links are left untouched; see
    /// [`crate::operations::topology::DeletePatchGroup`] for the full removal.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn remove_patch(&mut self, id: PatchId) -> Result<PatchData, TopologyError> {
        let data = self
            .patches
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("patch {id:?}")))?;
        self.patch_order.retain(|&p| p != id);
        Ok(data)
    }

    /// Returns `true` if the patch is live.
    #[must_use]
    pub fn contains_patch(&self, id: PatchId) -> bool {
        self.patches.contains_key(id)
    }

    /// Patches in insertion order.
    #[must_use]
    pub fn patch_ids(&self) -> &[PatchId] {
        &self.patch_order
    }

    /// The `index`th patch in insertion order.
    #[must_use]
    pub fn patch_at(&self, index: usize) -> Option<PatchId> {
        self.patch_order.get(index).copied()
    }

    /// Position of a patch in insertion order.
    #[must_use]
    pub fn patch_index(&self, id: PatchId) -> Option<usize> {
        self.patch_order.iter().position(|&p| p == id)
    }

    /// Number of patches.
    #[must_use]
    pub fn patch_count(&self) -> usize {
        self.patch_order.len()
    }

    /// First patch with the given display name.
    #[must_use]
    pub fn find_patch(&self, name: &str) -> Option<PatchId> {
        self.patch_order
            .iter()
            .copied()
            .find(|&id| self.patches.get(id).is_some_and(|p| p.name == name))
    }

    /// Positions of a patch's 16 control points in slot order.
    ///
    /// # Errors
    ///
    /// Returns an error if the patch or one of its points is not found.
    pub fn patch_positions(&self, id: PatchId) -> Result<[Point3; SLOT_COUNT], TopologyError> {
        let patch = self.patch(id)?;
        let mut positions = [Point3::origin(); SLOT_COUNT];
        for (slot, &point) in patch.points.iter().enumerate() {
            positions[slot] = self.point(point)?.position;
        }
        Ok(positions)
    }

    // --- Links ---

    /// Sets the symmetric pair of neighbor keys: `second` becomes `first`'s
    /// neighbor in `direction` and `first` becomes `second`'s neighbor in the
    /// opposite direction.
    ///
    /// # Errors
    ///
    /// Returns an error if either patch is not found.
    pub fn link(
        &mut self,
        first: PatchId,
        direction: Direction,
        second: PatchId,
    ) -> Result<(), TopologyError> {
        self.patch(second)?;
        self.patch_mut(first)?.set_neighbor(direction, Some(second));
        self.patch_mut(second)?
            .set_neighbor(direction.opposite(), Some(first));
        Ok(())
    }

    /// Clears `first`'s neighbor in `direction` and the matching back link.
    /// Returns the former neighbor.
    ///
    /// # Errors
    ///
    /// Returns an error if `first` is not found.
    pub fn unlink(
        &mut self,
        first: PatchId,
        direction: Direction,
    ) -> Result<Option<PatchId>, TopologyError> {
        let former = self.patch(first)?.neighbor(direction);
        self.patch_mut(first)?.set_neighbor(direction, None);
        if let Some(other) = former {
            if let Some(data) = self.patches.get_mut(other) {
                if data.neighbor(direction.opposite()) == Some(first) {
                    data.set_neighbor(direction.opposite(), None);
                }
            }
        }
        Ok(former)
    }

    // --- Whole-mesh queries ---

    /// Bounding box of all patch points, or `None` for an empty mesh.
    #[must_use]
    pub fn bounding_box(&self) -> Option<Aabb> {
        let mut positions = self
            .point_order
            .iter()
            .filter_map(|&id| self.points.get(id))
            .map(|p| p.position);
        let first = positions.next()?;
        let mut aabb = Aabb::from_point(first);
        for p in positions {
            aabb.extend(&p);
        }
        Some(aabb)
    }

    /// Removes every patch point, keeping the anchors.
    ///
    /// Patch slots dangle until they are refilled; only
    /// [`crate::operations::topology::Rebuild`] calls this.
    pub(crate) fn clear_points(&mut self) {
        for id in std::mem::take(&mut self.point_order) {
            self.points.remove(id);
        }
    }

    /// Removes every patch and patch point, keeping the anchors.
    pub fn clear(&mut self) {
        for id in std::mem::take(&mut self.point_order) {
            self.points.remove(id);
        }
        for id in std::mem::take(&mut self.patch_order) {
            self.patches.remove(id);
        }
    }

    /// Checks every structural invariant of the mesh.
    ///
    /// - each slot's point is live and lists the patch as an owner
    /// - each owner of a point references it in some slot
    /// - only anchors have an empty owner set
    /// - neighbor keys are live and symmetric
    /// - linked patches share their boundary points by identity
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::InvalidTopology`] describing the first
    /// violation found.
    pub fn validate(&self) -> Result<(), TopologyError> {
        let invalid = |msg: String| Err(TopologyError::InvalidTopology(msg));

        if self.point_order.len() + 2 != self.points.len() {
            return invalid(format!(
                "point order lists {} points, arena holds {} plus anchors",
                self.point_order.len(),
                self.points.len().saturating_sub(2)
            ));
        }
        if self.patch_order.len() != self.patches.len() {
            return invalid("patch order out of sync with arena".into());
        }

        for (patch_id, patch) in &self.patches {
            for (slot, &point_id) in patch.points.iter().enumerate() {
                let Some(point) = self.points.get(point_id) else {
                    return invalid(format!("patch {patch_id:?} slot {slot}: dead point"));
                };
                if self.is_anchor(point_id) {
                    return invalid(format!("patch {patch_id:?} slot {slot}: anchor point"));
                }
                if !point.owners.contains(&patch_id) {
                    return invalid(format!(
                        "patch {patch_id:?} slot {slot}: point {point_id:?} does not list it as owner"
                    ));
                }
            }

            for (direction, neighbor_id) in patch.linked() {
                let Some(neighbor) = self.patches.get(neighbor_id) else {
                    return invalid(format!(
                        "patch {patch_id:?} {direction:?}: dangling neighbor {neighbor_id:?}"
                    ));
                };
                if neighbor.neighbor(direction.opposite()) != Some(patch_id) {
                    return invalid(format!(
                        "patch {patch_id:?} {direction:?}: neighbor {neighbor_id:?} does not link back"
                    ));
                }
                for &(first, second) in direction.boundary() {
                    if patch.points[first] != neighbor.points[second] {
                        return invalid(format!(
                            "patch {patch_id:?} {direction:?}: slot {first} not shared with slot {second} of {neighbor_id:?}"
                        ));
                    }
                }
            }
        }

        for (point_id, point) in &self.points {
            if self.is_anchor(point_id) {
                if !point.owners.is_empty() {
                    return invalid(format!("anchor {point_id:?} has owners"));
                }
                continue;
            }
            if point.owners.is_empty() {
                return invalid(format!("point {point_id:?} has no owner"));
            }
            for &owner in &point.owners {
                let Some(patch) = self.patches.get(owner) else {
                    return invalid(format!("point {point_id:?}: dead owner {owner:?}"));
                };
                if patch.slot_of(point_id).is_none() {
                    return invalid(format!(
                        "point {point_id:?}: owner {owner:?} does not reference it"
                    ));
                }
            }
        }

        Ok(())
    }
}
