//! Smoothness correction across patch boundaries while dragging points.

mod move_patch_group;
mod move_point;

pub use move_patch_group::MovePatchGroup;
pub use move_point::MovePoint;

use crate::math::{Point3, Vector3, TOLERANCE};

/// Continuity enforced across shared boundaries when a point is dragged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Continuity {
    /// Points move freely.
    #[default]
    None,
    /// Tangent directions stay aligned across the boundary.
    G1,
    /// Tangent vectors stay equal across the boundary: the far control
    /// point is the point reflection of the near one through the boundary.
    C1,
}

/// New position of `mirror` so that it stays colinear with `moved + delta`
/// through `pivot`.
///
/// The reflected vector `-(moved + delta - pivot)` is used as-is under
/// [`Continuity::C1`]; under [`Continuity::G1`] it is rescaled to the current
/// distance from `pivot` to `mirror`, so only the direction changes. A
/// zero-length reflected vector leaves a G1 mirror where it is, and
/// [`Continuity::None`] never moves it.
#[must_use]
pub fn fix_colinear(
    moved: &Point3,
    pivot: &Point3,
    mirror: &Point3,
    delta: &Vector3,
    continuity: Continuity,
) -> Point3 {
    let mut d1 = (moved + delta) - pivot;
    d1 = -d1;
    match continuity {
        Continuity::None => return *mirror,
        Continuity::G1 => {
            let len = d1.norm();
            if len < TOLERANCE {
                return *mirror;
            }
            d1 = d1 / len * (mirror - pivot).norm();
        }
        Continuity::C1 => {}
    }
    pivot + d1
}
