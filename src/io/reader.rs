use std::path::Path;

use tracing::{debug, warn};

use crate::error::{FileError, Result};
use crate::math::{Aabb, Point3};
use crate::operations::topology::{Attach, MergePolicy};
use crate::topology::{Direction, MeshStore, PatchId, PointId, SideColor, SLOT_COUNT};

use super::MeshHeader;

/// Reads a mesh file into a fresh store.
///
/// # Errors
///
/// Returns [`FileError::Read`] if the file cannot be read. Malformed
/// contents are not an error; see [`parse_mesh`].
pub fn read_mesh(path: impl AsRef<Path>, policy: MergePolicy) -> Result<(MeshStore, MeshHeader)> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_mesh(&text, policy)
}

/// Parses mesh file text into a fresh store.
///
/// Parsing stops at the first token that does not fit the format; everything
/// read up to that point is kept, except a patch block cut short, which is
/// dropped. Neighbor references are then resolved by patch name, falling back
/// to `Patch_<index>`, and replayed as [`Attach`] operations with `policy`.
///
/// # Errors
///
/// Only fails on internal store inconsistencies, which a fresh store never
/// has.
pub fn parse_mesh(text: &str, policy: MergePolicy) -> Result<(MeshStore, MeshHeader)> {
    let mut tokens = Tokens::new(text);
    let mut store = MeshStore::new();
    let mut header = MeshHeader::default();

    let starts_alphabetic = text.starts_with(|c: char| c.is_ascii_alphabetic());
    let file_box = if !text.trim().is_empty() && !starts_alphabetic {
        read_bounding_box(&mut tokens)
    } else {
        None
    };

    let mut size = None;
    loop {
        let keyword = tokens.peek();
        let complete = match keyword {
            Some("CONTACT") => {
                let anchor = store.contact_point();
                read_anchor(&mut tokens).map(|p| set_anchor(&mut store, anchor, p))
            }
            Some("END") => {
                let anchor = store.end_point();
                read_anchor(&mut tokens).map(|p| set_anchor(&mut store, anchor, p))
            }
            Some("HEADING") => read_xyz(&mut tokens).map(|v| header.heading = v.coords),
            Some("UP") => read_xyz(&mut tokens).map(|v| header.up = v.coords),
            Some("SIZE:") => {
                tokens.next();
                tokens.next_f64().map(|s| size = Some(s))
            }
            Some("PRECISION") => {
                tokens.skip_line();
                Some(())
            }
            _ => break,
        };
        if complete.is_none() {
            debug!(line = tokens.line(), "mesh header cut short");
            break;
        }
    }

    let mut records = Vec::new();
    while tokens.peek().is_some() {
        let start = tokens.line();
        match read_patch(&mut tokens) {
            Some(record) => records.push(record),
            None => {
                debug!(line = start, "incomplete patch block dropped, parsing stopped");
                break;
            }
        }
    }

    let ids: Vec<PatchId> = records
        .iter()
        .map(|record| {
            let id = store.add_patch_with_positions(record.name.clone(), &record.positions);
            if let Some((top, bottom)) = record.colors {
                if let Ok(patch) = store.patch_mut(id) {
                    patch.top = top;
                    patch.bottom = bottom;
                }
            }
            id
        })
        .collect();

    for (record, &id) in records.iter().zip(&ids) {
        for direction in Direction::ALL {
            let Some(name) = &record.neighbors[direction.index()] else {
                continue;
            };
            match resolve_neighbor(&store, name) {
                Some(neighbor) => Attach::new(direction, id, neighbor)
                    .with_policy(policy)
                    .execute(&mut store)?,
                None => warn!(patch = %record.name, neighbor = %name, "unknown neighbor skipped"),
            }
        }
    }

    header.bounding_box = file_box
        .or_else(|| store.bounding_box())
        .unwrap_or(header.bounding_box);
    header.scale = size.unwrap_or_else(|| {
        let span = store.bounding_box().map_or(0.0, |b| b.max_span());
        if span > 0.0 {
            span
        } else {
            1.0
        }
    });
    debug!(patches = store.patch_count(), points = store.point_count(), "mesh parsed");
    Ok((store, header))
}

fn set_anchor(store: &mut MeshStore, anchor: PointId, position: Point3) {
    if let Ok(point) = store.point_mut(anchor) {
        point.position = position;
    }
}

fn resolve_neighbor(store: &MeshStore, name: &str) -> Option<PatchId> {
    store.find_patch(name).or_else(|| {
        name.strip_prefix("Patch_")
            .and_then(|index| index.parse::<usize>().ok())
            .and_then(|index| store.patch_at(index))
    })
}

struct PatchRecord {
    name: String,
    colors: Option<(SideColor, SideColor)>,
    neighbors: [Option<String>; 8],
    positions: [Point3; SLOT_COUNT],
}

fn read_bounding_box(tokens: &mut Tokens<'_>) -> Option<Aabb> {
    let mut v = [0.0; 6];
    for value in &mut v {
        *value = tokens.next_f64()?;
    }
    Some(Aabb::new(
        Point3::new(v[0], v[2], v[4]),
        Point3::new(v[1], v[3], v[5]),
    ))
}

/// `CONTACT POINT X: x Y: y Z: z` or `END POINT ...`.
fn read_anchor(tokens: &mut Tokens<'_>) -> Option<Point3> {
    tokens.next()?;
    read_xyz(tokens)
}

/// `<keyword> X: x Y: y Z: z`; label tokens are not checked.
fn read_xyz(tokens: &mut Tokens<'_>) -> Option<Point3> {
    tokens.next()?;
    let mut v = [0.0; 3];
    for value in &mut v {
        tokens.next()?;
        *value = tokens.next_f64()?;
    }
    Some(Point3::new(v[0], v[1], v[2]))
}

fn read_side(tokens: &mut Tokens<'_>) -> Option<SideColor> {
    tokens.next()?;
    tokens.next()?;
    let color = tokens.next()?.parse().ok()?;
    tokens.next()?;
    let diffuse = tokens.next_f64()?;
    Some(SideColor { color, diffuse })
}

fn read_patch(tokens: &mut Tokens<'_>) -> Option<PatchRecord> {
    let name = tokens.next()?.to_owned();
    let colors = if tokens.peek().is_some_and(|t| t.starts_with('T')) {
        Some((read_side(tokens)?, read_side(tokens)?))
    } else {
        None
    };

    let mut neighbors: [Option<String>; 8] = Default::default();
    for neighbor in &mut neighbors {
        tokens.next()?;
        let value = tokens.next()?;
        *neighbor = (value != "~").then(|| value.to_owned());
    }

    let mut positions = [Point3::origin(); SLOT_COUNT];
    for position in &mut positions {
        *position = Point3::new(tokens.next_f64()?, tokens.next_f64()?, tokens.next_f64()?);
    }
    Some(PatchRecord {
        name,
        colors,
        neighbors,
        positions,
    })
}

/// Whitespace-separated tokens tagged with their 1-based line number.
struct Tokens<'a> {
    items: Vec<(usize, &'a str)>,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        let items = text
            .lines()
            .enumerate()
            .flat_map(|(i, line)| line.split_whitespace().map(move |t| (i + 1, t)))
            .collect();
        Self { items, pos: 0 }
    }

    fn peek(&self) -> Option<&'a str> {
        self.items.get(self.pos).map(|&(_, t)| t)
    }

    fn next(&mut self) -> Option<&'a str> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn next_f64(&mut self) -> Option<f64> {
        let value = self.peek()?.parse().ok()?;
        self.pos += 1;
        Some(value)
    }

    /// Line of the next token, or of the last one at end of input.
    fn line(&self) -> usize {
        self.items
            .get(self.pos)
            .or_else(|| self.items.last())
            .map_or(0, |&(line, _)| line)
    }

    fn skip_line(&mut self) {
        let line = self.line();
        while self.items.get(self.pos).is_some_and(|&(l, _)| l == line) {
            self.pos += 1;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Vector3, TOLERANCE};

    const GRID: &str = "0 3 0\n1 3 0\n2 3 0\n3 3 0\n\
                        0 2 0\n1 2 0\n2 2 0\n3 2 0\n\
                        0 1 0\n1 1 0\n2 1 0\n3 1 0\n\
                        0 0 0\n1 0 0\n2 0 0\n3 0 0\n";

    const SHIFTED: &str = "3 3 0\n4 3 0\n5 3 0\n6 3 0\n\
                           3 2 0\n4 2 0\n5 2 0\n6 2 0\n\
                           3 1 0\n4 1 0\n5 1 0\n6 1 0\n\
                           3 0 0\n4 0 0\n5 0 0\n6 0 0\n";

    const NO_NEIGHBORS: &str = "AL: ~ A: ~ AR: ~ L: ~ R: ~ BL: ~ B: ~ BR: ~\n";

    #[test]
    fn empty_text_gives_empty_mesh() {
        let (store, header) = parse_mesh("", MergePolicy::Interpolate).unwrap();
        assert_eq!(store.patch_count(), 0);
        assert_eq!(header, MeshHeader::default());
    }

    #[test]
    fn header_fields_are_read_in_any_order() {
        let text = "-1 2 -3 4 -5 6\n\
                    UP X: 1 Y: 0 Z: 0\n\
                    PRECISION 12 whatever\n\
                    END POINT X: 7 Y: 8 Z: 9\n\
                    CONTACT POINT X: 1 Y: 2 Z: 3\n\
                    HEADING X: 0 Y: -1 Z: 0\n\
                    SIZE: 2.5\n";
        let (store, header) = parse_mesh(text, MergePolicy::Interpolate).unwrap();
        assert_eq!(
            header.bounding_box,
            Aabb::new(Point3::new(-1.0, -3.0, -5.0), Point3::new(2.0, 4.0, 6.0))
        );
        assert_eq!(header.up, Vector3::x());
        assert_eq!(header.heading, -Vector3::y());
        assert!((header.scale - 2.5).abs() < TOLERANCE);
        let contact = store.point(store.contact_point()).unwrap().position;
        let end = store.point(store.end_point()).unwrap().position;
        assert_eq!(contact, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(end, Point3::new(7.0, 8.0, 9.0));
    }

    #[test]
    fn leading_whitespace_is_not_a_keyword() {
        let text = "  \n-1 2 -3 4 -5 6\nSIZE: 2\n";
        let (_, header) = parse_mesh(text, MergePolicy::Interpolate).unwrap();
        assert_eq!(
            header.bounding_box,
            Aabb::new(Point3::new(-1.0, -3.0, -5.0), Point3::new(2.0, 4.0, 6.0))
        );
        assert!((header.scale - 2.0).abs() < TOLERANCE);

        let text = format!(" Patch_0\n{NO_NEIGHBORS}{GRID}");
        let (store, header) = parse_mesh(&text, MergePolicy::Interpolate).unwrap();
        assert_eq!(store.patch_count(), 1);
        assert_eq!(
            header.bounding_box,
            Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(3.0, 3.0, 0.0))
        );
    }

    #[test]
    fn single_patch_without_colors() {
        let text = format!("Patch_0\n{NO_NEIGHBORS}{GRID}");
        let (store, header) = parse_mesh(&text, MergePolicy::Interpolate).unwrap();
        assert_eq!(store.patch_count(), 1);
        assert_eq!(store.point_count(), 16);
        let id = store.patch_at(0).unwrap();
        let patch = store.patch(id).unwrap();
        assert_eq!(patch.name, "Patch_0");
        assert_eq!(patch.top, SideColor::default());
        assert_eq!(store.patch_positions(id).unwrap()[4], Point3::new(0.0, 2.0, 0.0));
        assert!((header.scale - 3.0).abs() < TOLERANCE);
        store.validate().unwrap();
    }

    #[test]
    fn colors_are_read_when_present() {
        let text = format!(
            "Wing\nTOP COLOR: 255 DIFFUSE: 0.50 BOTTOM COLOR: 65280 DIFFUSE: 0.25\n{NO_NEIGHBORS}{GRID}"
        );
        let (store, _) = parse_mesh(&text, MergePolicy::Interpolate).unwrap();
        let patch = store.patch(store.patch_at(0).unwrap()).unwrap();
        assert_eq!(patch.top, SideColor { color: 255, diffuse: 0.5 });
        assert_eq!(patch.bottom, SideColor { color: 65280, diffuse: 0.25 });
    }

    #[test]
    fn neighbors_resolve_and_share_points() {
        let text = format!(
            "Left\nAL: ~ A: ~ AR: ~ L: ~ R: Right BL: ~ B: ~ BR: ~\n{GRID}\
             Right\nAL: ~ A: ~ AR: ~ L: Patch_0 R: ~ BL: ~ B: ~ BR: ~\n{SHIFTED}"
        );
        let (store, _) = parse_mesh(&text, MergePolicy::Interpolate).unwrap();
        let (left, right) = (store.patch_at(0).unwrap(), store.patch_at(1).unwrap());
        assert_eq!(store.patch(left).unwrap().neighbor(Direction::Right), Some(right));
        assert_eq!(store.patch(right).unwrap().neighbor(Direction::Left), Some(left));
        assert_eq!(store.point_count(), 28);
        store.validate().unwrap();
    }

    #[test]
    fn unknown_neighbor_is_skipped() {
        let text = format!("Solo\nAL: ~ A: Ghost AR: ~ L: Patch_9 R: ~ BL: ~ B: ~ BR: ~\n{GRID}");
        let (store, _) = parse_mesh(&text, MergePolicy::Interpolate).unwrap();
        assert_eq!(store.patch_count(), 1);
        assert!(store.patch(store.patch_at(0).unwrap()).unwrap().linked().next().is_none());
    }

    #[test]
    fn truncated_patch_is_dropped() {
        let text = format!("Patch_0\n{NO_NEIGHBORS}{GRID}Patch_1\n{NO_NEIGHBORS}0 0 0\n1 0");
        let (store, _) = parse_mesh(&text, MergePolicy::Interpolate).unwrap();
        assert_eq!(store.patch_count(), 1);
        store.validate().unwrap();
    }

    #[test]
    fn bad_number_stops_parsing() {
        let text = format!("Patch_0\n{NO_NEIGHBORS}{GRID}Patch_1\n{NO_NEIGHBORS}0 zero 0\n{GRID}");
        let (store, _) = parse_mesh(&text, MergePolicy::Interpolate).unwrap();
        assert_eq!(store.patch_count(), 1);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let path = std::env::temp_dir().join("patchmesh_missing_dir_x").join("none.mesh");
        let err = read_mesh(&path, MergePolicy::Interpolate).unwrap_err();
        assert!(matches!(
            err,
            crate::error::PatchMeshError::File(FileError::Read { .. })
        ));
    }
}
