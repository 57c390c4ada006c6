use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{FileError, Result};
use crate::math::Point3;
use crate::topology::{Direction, MeshStore, SideColor};

use super::{format_significant, MeshHeader};

const DIGITS: usize = 7;

/// Writes the mesh to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`FileError::Write`] if the file cannot be created or written.
/// The store is never modified.
pub fn write_mesh(path: impl AsRef<Path>, store: &MeshStore, header: &MeshHeader) -> Result<()> {
    let path = path.as_ref();
    let to_error = |source: io::Error| FileError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(to_error)?;
    let mut out = BufWriter::new(file);
    write_mesh_to(&mut out, store, header).map_err(to_error)?;
    out.flush().map_err(to_error)?;
    debug!(path = %path.display(), patches = store.patch_count(), "mesh written");
    Ok(())
}

/// Writes the mesh text to any writer.
///
/// # Errors
///
/// Returns any error of the underlying writer.
pub fn write_mesh_to(out: &mut impl Write, store: &MeshStore, header: &MeshHeader) -> io::Result<()> {
    let b = &header.bounding_box;
    writeln!(
        out,
        "{} {} {} {} {} {}",
        num(b.min.x),
        num(b.max.x),
        num(b.min.y),
        num(b.max.y),
        num(b.min.z),
        num(b.max.z)
    )?;
    let contact = store.point(store.contact_point()).map_err(io::Error::other)?;
    let end = store.point(store.end_point()).map_err(io::Error::other)?;
    writeln!(out, "CONTACT POINT {}", xyz(&contact.position))?;
    writeln!(out, "END POINT {}", xyz(&end.position))?;
    writeln!(out, "HEADING {}", xyz(&Point3::from(header.heading)))?;
    writeln!(out, "UP {}", xyz(&Point3::from(header.up)))?;
    writeln!(out, "SIZE: {}", num(header.scale))?;

    for &id in store.patch_ids() {
        let patch = store.patch(id).map_err(io::Error::other)?;
        writeln!(out, "{}", patch.name)?;
        writeln!(out, "TOP {} BOTTOM {}", side(&patch.top), side(&patch.bottom))?;

        let mut links = Vec::with_capacity(8);
        for direction in Direction::ALL {
            let name = match patch.neighbor(direction) {
                Some(n) => store.patch(n).map_err(io::Error::other)?.name.as_str(),
                None => "~",
            };
            links.push(format!("{}: {name}", direction.label()));
        }
        writeln!(out, "{}", links.join(" "))?;

        for position in store.patch_positions(id).map_err(io::Error::other)? {
            writeln!(
                out,
                "{} {} {}",
                num(position.x),
                num(position.y),
                num(position.z)
            )?;
        }
    }
    Ok(())
}

fn num(value: f64) -> String {
    format_significant(value, DIGITS)
}

fn xyz(p: &Point3) -> String {
    format!("X: {} Y: {} Z: {}", num(p.x), num(p.y), num(p.z))
}

fn side(side: &SideColor) -> String {
    format!("COLOR: {} DIFFUSE: {:.2}", side.color, side.diffuse)
}
