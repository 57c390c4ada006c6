use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::topology::{GRID_SIZE, SLOT_COUNT};

use super::{Surface, SurfaceDomain};

/// A bicubic Bézier surface over a 4x4 control grid.
///
/// Control points are row-major, the same layout as a patch's slots. `u`
/// runs along a row (left to right), `v` down the columns (top to bottom).
///
/// Parametric form: `S(u, v) = Σ_j Σ_i B_j(v) B_i(u) P[j * 4 + i]` with the
/// cubic Bernstein basis `B`.
#[derive(Debug, Clone)]
pub struct BezierPatch {
    control: [Point3; SLOT_COUNT],
}

impl BezierPatch {
    /// Creates a patch surface from its 16 control points.
    #[must_use]
    pub fn new(control: [Point3; SLOT_COUNT]) -> Self {
        Self { control }
    }

    /// Returns the control points.
    #[must_use]
    pub fn control_points(&self) -> &[Point3; SLOT_COUNT] {
        &self.control
    }

    fn control(&self, row: usize, col: usize) -> Vector3 {
        self.control[row * GRID_SIZE + col].coords
    }

    /// Partial derivatives `(dS/du, dS/dv)` at `(u, v)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are outside `[0, 1]`.
    pub fn derivatives(&self, u: f64, v: f64) -> Result<(Vector3, Vector3)> {
        SurfaceDomain::UNIT.check(u, v)?;
        let (bu, bv) = (bernstein3(u), bernstein3(v));
        let (du, dv) = (bernstein2(u), bernstein2(v));

        let mut su = Vector3::zeros();
        let mut sv = Vector3::zeros();
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE - 1 {
                let diff = self.control(row, col + 1) - self.control(row, col);
                su += diff * (3.0 * du[col] * bv[row]);
            }
        }
        for row in 0..GRID_SIZE - 1 {
            for col in 0..GRID_SIZE {
                let diff = self.control(row + 1, col) - self.control(row, col);
                sv += diff * (3.0 * bu[col] * dv[row]);
            }
        }
        Ok((su, sv))
    }
}

impl Surface for BezierPatch {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        SurfaceDomain::UNIT.check(u, v)?;
        let (bu, bv) = (bernstein3(u), bernstein3(v));
        let mut sum = Vector3::zeros();
        for (row, wv) in bv.iter().enumerate() {
            for (col, wu) in bu.iter().enumerate() {
                sum += self.control(row, col) * (wu * wv);
            }
        }
        Ok(Point3::from(sum))
    }

    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        let (su, sv) = self.derivatives(u, v)?;
        // Rows run downward, so dv x du points out of the front side.
        let n = sv.cross(&su);
        let len = n.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(n / len)
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::UNIT
    }
}

fn bernstein3(t: f64) -> [f64; 4] {
    let s = 1.0 - t;
    [s * s * s, 3.0 * t * s * s, 3.0 * t * t * s, t * t * t]
}

fn bernstein2(t: f64) -> [f64; 3] {
    let s = 1.0 - t;
    [s * s, 2.0 * t * s, t * t]
}
