//! The plain-text mesh file format.
//!
//! A file is a whitespace-separated token stream:
//!
//! ```text
//! -1 4 -1 4 0 0
//! CONTACT POINT X: 0 Y: 0 Z: 0
//! END POINT X: 0 Y: 0 Z: 0
//! HEADING X: 0 Y: 0 Z: 1
//! UP X: 0 Y: 1 Z: 0
//! SIZE: 3
//! Patch_0
//! TOP COLOR: 16777215 DIFFUSE: 0.80 BOTTOM COLOR: 16777215 DIFFUSE: 0.80
//! AL: ~ A: ~ AR: ~ L: ~ R: Patch_1 BL: ~ B: ~ BR: ~
//! 0 3 0
//! ...
//! ```
//!
//! The bounding box line is present only when the file does not start with a
//! letter. Header lines may come in any order; a `PRECISION` line is skipped.
//! Each patch block holds a name, optional colors, the 8 neighbor names in
//! file direction order (`~` for none) and 16 rows of coordinates.

mod reader;
mod writer;

pub use reader::{parse_mesh, read_mesh};
pub use writer::{write_mesh, write_mesh_to};

use crate::math::{Aabb, Point3, Vector3};

/// Per-document settings stored in the mesh file next to the patches.
///
/// The anchor positions are kept in the
/// [`MeshStore`](crate::topology::MeshStore) itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshHeader {
    /// Bounding box of the mesh as last written.
    pub bounding_box: Aabb,
    /// Viewing direction of the mesh.
    pub heading: Vector3,
    /// Up direction of the mesh.
    pub up: Vector3,
    /// Overall size, used by the shell to scale its view.
    pub scale: f64,
}

impl Default for MeshHeader {
    fn default() -> Self {
        Self {
            bounding_box: Aabb::from_point(Point3::origin()),
            heading: Vector3::z(),
            up: Vector3::y(),
            scale: 1.0,
        }
    }
}

/// Formats `value` with `digits` significant digits, in the style of C's
/// `%g`: fixed notation for moderate exponents, scientific otherwise, and no
/// trailing zeros.
#[must_use]
pub fn format_significant(value: f64, digits: usize) -> String {
    let digits = digits.max(1);
    if value == 0.0 {
        return "0".into();
    }
    if !value.is_finite() {
        return value.to_string();
    }
    let scientific = format!("{:.*e}", digits - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let max_exponent = i32::try_from(digits).unwrap_or(i32::MAX);
    if exponent < -4 || exponent >= max_exponent {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        );
    }
    let decimals = usize::try_from(max_exponent - 1 - exponent).unwrap_or(0);
    trim_fraction(&format!("{value:.decimals$}")).to_owned()
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}
