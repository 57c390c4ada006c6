//! The editing session of one open mesh file.
//!
//! [`Document`] owns the [`MeshStore`] together with the file header and the
//! active [`EditSettings`], and exposes the operations the editor shell
//! calls. Every editing operation receives the settings explicitly, so the
//! operations themselves carry no state.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{Result, TopologyError};
use crate::geometry::{BezierPatch, Surface};
use crate::io::{read_mesh, write_mesh, MeshHeader};
use crate::math::{Point3, Vector3};
use crate::operations::continuity::{Continuity, MovePatchGroup, MovePoint};
use crate::operations::creation::MakeDefaultPatch;
use crate::operations::topology::{
    Attach, DeletePatchGroup, Detach, MergePoints, MergePolicy, MergeSelected, SplitPoint,
};
use crate::topology::{Direction, MeshStore, PatchId, PointData, PointId};

/// User-selectable editing modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditSettings {
    /// Continuity kept across boundaries while dragging points.
    pub continuity: Continuity,
    /// How positions of merged points are chosen.
    pub merge_policy: MergePolicy,
}

/// One open mesh document.
#[derive(Debug, Default)]
pub struct Document {
    store: MeshStore,
    header: MeshHeader,
    settings: EditSettings,
}

impl Document {
    /// Creates an empty document with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty document with the given settings.
    #[must_use]
    pub fn with_settings(settings: EditSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// The underlying point and patch store.
    #[must_use]
    pub fn store(&self) -> &MeshStore {
        &self.store
    }

    /// Header fields carried through read and write.
    #[must_use]
    pub fn header(&self) -> &MeshHeader {
        &self.header
    }

    /// Mutable access to the header fields.
    pub fn header_mut(&mut self) -> &mut MeshHeader {
        &mut self.header
    }

    /// The current editing settings.
    #[must_use]
    pub fn settings(&self) -> EditSettings {
        self.settings
    }

    /// Sets the continuity applied by point moves.
    pub fn set_continuity(&mut self, continuity: Continuity) {
        self.settings.continuity = continuity;
    }

    /// Sets how shared boundary points are placed on attach.
    pub fn set_merge_policy(&mut self, policy: MergePolicy) {
        self.settings.merge_policy = policy;
    }

    // --- Files ---

    /// Replaces the mesh with the contents of a file.
    ///
    /// # Errors
    ///
    /// Returns a file error if the file cannot be read; the document is
    /// unchanged in that case.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let (store, header) = read_mesh(path, self.settings.merge_policy)?;
        self.store = store;
        self.header = header;
        info!(
            path = %path.display(),
            patches = self.store.patch_count(),
            "mesh loaded"
        );
        Ok(())
    }

    /// Writes the mesh to a file. The stored bounding box is refreshed from
    /// the current points first.
    ///
    /// # Errors
    ///
    /// Returns a file error if the file cannot be written; the document is
    /// unchanged in that case.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut header = self.header;
        if let Some(bounding_box) = self.store.bounding_box() {
            header.bounding_box = bounding_box;
        }
        write_mesh(path, &self.store, &header)?;
        self.header = header;
        info!(path = %path.display(), "mesh saved");
        Ok(())
    }

    // --- Patches ---

    /// Adds a flat square patch of side [`MeshHeader::scale`] at the origin,
    /// named `Patch_<n>` with the smallest free `n` not below the patch count.
    ///
    /// # Errors
    ///
    /// Returns an error if the document scale is not positive.
    pub fn create_default_patch(&mut self) -> Result<PatchId> {
        let mut n = self.store.patch_count();
        while self.store.find_patch(&format!("Patch_{n}")).is_some() {
            n += 1;
        }
        MakeDefaultPatch::new(Point3::origin(), self.header.scale, format!("Patch_{n}"))
            .execute(&mut self.store)
    }

    /// Display names in patch order.
    #[must_use]
    pub fn patch_names(&self) -> Vec<&str> {
        self.store
            .patch_ids()
            .iter()
            .filter_map(|&id| self.store.patch(id).ok())
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Renames the `index`th patch.
    ///
    /// Names are file tokens, so empty names, names containing whitespace
    /// and names already used by another patch are refused with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no patch at `index`.
    pub fn rename_patch(&mut self, index: usize, name: &str) -> Result<()> {
        let id = self.patch_at(index)?;
        if name.is_empty() || name.contains(char::is_whitespace) || name == "~" {
            warn!(index, name, "patch name must be a single non-empty token");
            return Ok(());
        }
        if self.store.find_patch(name).is_some_and(|other| other != id) {
            warn!(index, name, "patch name already in use");
            return Ok(());
        }
        self.store.patch_mut(id)?.name = name.to_owned();
        Ok(())
    }

    /// Sets the highlight flag of the `index`th patch.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no patch at `index`.
    pub fn set_highlight(&mut self, index: usize, highlighted: bool) -> Result<()> {
        let id = self.patch_at(index)?;
        self.store.patch_mut(id)?.highlighted = highlighted;
        Ok(())
    }

    /// Evaluates the surface of the `index`th patch at `(u, v)`.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no patch at `index` or the parameters are
    /// outside `[0, 1]`.
    pub fn evaluate_patch(&self, index: usize, u: f64, v: f64) -> Result<Point3> {
        let id = self.patch_at(index)?;
        BezierPatch::new(self.store.patch_positions(id)?).evaluate(u, v)
    }

    fn patch_at(&self, index: usize) -> Result<PatchId> {
        self.store
            .patch_at(index)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("patch #{index}")).into())
    }

    // --- Points ---

    /// Resolves an editor point id: 0 and 1 are the anchors, `n >= 2` the
    /// `n - 2`th patch point.
    #[must_use]
    pub fn point_by_id(&self, id: usize) -> Option<PointId> {
        self.store.point_by_id(id)
    }

    /// Drags a point, correcting neighbors under the current continuity.
    ///
    /// # Errors
    ///
    /// Returns an error if the point is not in the mesh.
    pub fn move_point(&mut self, point: PointId, delta: Vector3) -> Result<()> {
        MovePoint::new(point, delta, self.settings.continuity).execute(&mut self.store)
    }

    /// Moves every patch owning `point`, then corrects outside neighbors.
    ///
    /// # Errors
    ///
    /// Returns an error if the point is not in the mesh.
    pub fn move_patch_group(&mut self, point: PointId, delta: Vector3) -> Result<()> {
        MovePatchGroup::new(point, delta, self.settings.continuity).execute(&mut self.store)
    }

    /// Collapses `second` into `first` using the current merge policy.
    ///
    /// # Errors
    ///
    /// Returns an error if either point is not in the mesh.
    pub fn merge_points(&mut self, first: PointId, second: PointId) -> Result<()> {
        MergePoints::new(first, second)
            .with_policy(self.settings.merge_policy)
            .execute(&mut self.store)
    }

    /// Attaches the patches of the two points flagged for merging.
    ///
    /// # Errors
    ///
    /// Returns an error if a flagged point is not in the mesh.
    pub fn merge_selected(&mut self) -> Result<Option<(Direction, PatchId, PatchId)>> {
        MergeSelected::new(self.settings.merge_policy).execute(&mut self.store)
    }

    /// Connects `second` to `first` in `direction`.
    ///
    /// # Errors
    ///
    /// Returns an error if either patch is not in the mesh.
    pub fn attach(&mut self, direction: Direction, first: PatchId, second: PatchId) -> Result<()> {
        Attach::new(direction, first, second)
            .with_policy(self.settings.merge_policy)
            .execute(&mut self.store)
    }

    /// Disconnects `second` from `first` in `direction`. Point handles may be
    /// invalidated.
    ///
    /// # Errors
    ///
    /// Returns an error if either patch is not in the mesh.
    pub fn detach(&mut self, direction: Direction, first: PatchId, second: PatchId) -> Result<()> {
        Detach::new(direction, first, second).execute(&mut self.store)
    }

    /// Gives every patch owning `point` its own copy of it. Point handles
    /// may be invalidated.
    ///
    /// # Errors
    ///
    /// Returns an error if the point is not in the mesh.
    pub fn split_point(&mut self, point: PointId) -> Result<()> {
        SplitPoint::new(point).execute(&mut self.store)
    }

    /// Deletes every patch owning `point` and returns their former keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the point is not in the mesh.
    pub fn delete_patch_group(&mut self, point: PointId) -> Result<Vec<PatchId>> {
        let removed = DeletePatchGroup::new(point).execute(&mut self.store)?;
        debug!(removed = removed.len(), "patch group deleted");
        Ok(removed)
    }

    // --- Selection ---

    /// Sets the selection flag of a point.
    ///
    /// # Errors
    ///
    /// Returns an error if the point is not in the mesh.
    pub fn set_selected(&mut self, point: PointId, selected: bool) -> Result<()> {
        self.point_mut(point)?.selected = selected;
        Ok(())
    }

    /// Flags a point as one end of the next merge.
    ///
    /// # Errors
    ///
    /// Returns an error if the point is not in the mesh.
    pub fn set_selected_for_merge(&mut self, point: PointId, flagged: bool) -> Result<()> {
        self.point_mut(point)?.selected_for_merge = flagged;
        Ok(())
    }

    /// Marks a point as sticky.
    ///
    /// # Errors
    ///
    /// Returns an error if the point is not in the mesh.
    pub fn set_sticky(&mut self, point: PointId, sticky: bool) -> Result<()> {
        self.point_mut(point)?.sticky = sticky;
        Ok(())
    }

    /// Deselects every non-sticky point and drops all merge flags.
    pub fn clear_selection(&mut self) {
        let ids: Vec<PointId> = self.store.point_ids().to_vec();
        for id in ids
            .into_iter()
            .chain([self.store.contact_point(), self.store.end_point()])
        {
            if let Ok(point) = self.store.point_mut(id) {
                if !point.sticky {
                    point.selected = false;
                }
                point.selected_for_merge = false;
            }
        }
    }

    /// Points currently selected for dragging, in point order.
    #[must_use]
    pub fn selected_points(&self) -> Vec<PointId> {
        self.store
            .point_ids()
            .iter()
            .copied()
            .filter(|&id| self.store.point(id).is_ok_and(|p| p.selected))
            .collect()
    }

    fn point_mut(&mut self, point: PointId) -> Result<&mut PointData> {
        Ok(self.store.point_mut(point)?)
    }
}
