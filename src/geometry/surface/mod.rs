mod bezier_patch;

pub use bezier_patch::BezierPatch;

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3};

/// Rectangular `(u, v)` parameter range of a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDomain {
    /// Lower bound of `u`.
    pub u_min: f64,
    /// Upper bound of `u`.
    pub u_max: f64,
    /// Lower bound of `v`.
    pub v_min: f64,
    /// Upper bound of `v`.
    pub v_max: f64,
}

impl SurfaceDomain {
    /// The unit square every patch surface is defined on.
    pub const UNIT: Self = Self::new(0.0, 1.0, 0.0, 1.0);

    /// Creates a new surface domain.
    #[must_use]
    pub const fn new(u_min: f64, u_max: f64, v_min: f64, v_max: f64) -> Self {
        Self {
            u_min,
            u_max,
            v_min,
            v_max,
        }
    }

    /// Returns `true` if `(u, v)` lies inside the domain, bounds included.
    #[must_use]
    pub fn contains(&self, u: f64, v: f64) -> bool {
        (self.u_min..=self.u_max).contains(&u) && (self.v_min..=self.v_max).contains(&v)
    }

    /// Checks both parameters against the domain.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ParameterOutOfRange`] naming the first
    /// parameter outside its range.
    pub fn check(&self, u: f64, v: f64) -> Result<()> {
        let checks = [
            ("u", u, self.u_min, self.u_max),
            ("v", v, self.v_min, self.v_max),
        ];
        for (parameter, value, min, max) in checks {
            if !(min..=max).contains(&value) {
                return Err(GeometryError::ParameterOutOfRange {
                    parameter,
                    value,
                    min,
                    max,
                }
                .into());
            }
        }
        Ok(())
    }
}

/// A parametric surface in 3D space.
///
/// Used by the editor shell to draw evaluated patches; every method takes
/// parameters inside [`Surface::domain`].
pub trait Surface {
    /// Point on the surface at `(u, v)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are outside the domain.
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3>;

    /// Unit normal at `(u, v)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are outside the domain or the
    /// surface is degenerate there.
    fn normal(&self, u: f64, v: f64) -> Result<Vector3>;

    /// The parameter domain the surface is defined on.
    fn domain(&self) -> SurfaceDomain;
}
