use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::math::{Point3, TOLERANCE};
use crate::topology::{MeshStore, PatchId, GRID_SIZE, SLOT_COUNT};

/// Creates a flat, square 4x4 patch with no neighbors.
///
/// The grid lies in the XY plane with its lower-left corner at `origin`.
/// Row 0 is the top row (largest Y), column 0 the left column (smallest X).
pub struct MakeDefaultPatch {
    origin: Point3,
    size: f64,
    name: String,
}

impl MakeDefaultPatch {
    /// Creates a new `MakeDefaultPatch` operation.
    #[must_use]
    pub fn new(origin: Point3, size: f64, name: impl Into<String>) -> Self {
        Self {
            origin,
            size,
            name: name.into(),
        }
    }

    /// Control point positions of the patch, row-major.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if `size` is not positive.
    #[allow(clippy::cast_precision_loss)]
    pub fn positions(&self) -> Result<[Point3; SLOT_COUNT]> {
        if self.size.is_nan() || self.size <= TOLERANCE {
            return Err(
                GeometryError::Degenerate(format!("patch size must be positive, got {}", self.size))
                    .into(),
            );
        }
        let step = self.size / (GRID_SIZE - 1) as f64;
        Ok(std::array::from_fn(|slot| {
            let (row, col) = (slot / GRID_SIZE, slot % GRID_SIZE);
            Point3::new(
                self.origin.x + col as f64 * step,
                self.origin.y + (GRID_SIZE - 1 - row) as f64 * step,
                self.origin.z,
            )
        }))
    }

    /// Executes the operation, adding the patch and its 16 points to the
    /// store.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is not positive.
    pub fn execute(&self, store: &mut MeshStore) -> Result<PatchId> {
        let positions = self.positions()?;
        let patch = store.add_patch_with_positions(self.name.clone(), &positions);
        debug!(?patch, name = %self.name, "default patch created");
        Ok(patch)
    }
}
