use super::direction::Direction;
use super::point::PointId;

slotmap::new_key_type! {
    /// Unique identifier for a patch in the mesh store.
    pub struct PatchId;
}

/// Number of control points along one side of a patch.
pub const GRID_SIZE: usize = 4;

/// Number of control point slots in a patch.
pub const SLOT_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// Color and diffuse factor for one side of a patch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideColor {
    /// Packed RGB color.
    pub color: u32,
    /// Diffuse reflectance factor.
    pub diffuse: f64,
}

impl Default for SideColor {
    fn default() -> Self {
        Self {
            color: 0x00ff_ffff,
            diffuse: 0.8,
        }
    }
}

/// Data associated with a bicubic patch.
///
/// The 16 slots are row-major: slot `row * 4 + col`. Row 0 faces
/// [`Direction::Above`] and column 0 faces [`Direction::Left`]. Two slots of
/// different patches hold the same [`PointId`] when the patches share that
/// control point.
#[derive(Debug, Clone)]
pub struct PatchData {
    /// Control point slots.
    pub points: [PointId; SLOT_COUNT],
    /// Neighbor patches, indexed by [`Direction::index`].
    pub neighbors: [Option<PatchId>; 8],
    /// Display name, also used to reference the patch from the mesh file.
    pub name: String,
    /// Drawn highlighted by the shell.
    pub highlighted: bool,
    /// Front side material.
    pub top: SideColor,
    /// Back side material.
    pub bottom: SideColor,
}

impl PatchData {
    /// Creates a patch without neighbors over the given point slots.
    #[must_use]
    pub fn new(name: impl Into<String>, points: [PointId; SLOT_COUNT]) -> Self {
        Self {
            points,
            neighbors: [None; 8],
            name: name.into(),
            highlighted: false,
            top: SideColor::default(),
            bottom: SideColor::default(),
        }
    }

    /// Returns the neighbor in the given direction, if any.
    #[must_use]
    pub fn neighbor(&self, direction: Direction) -> Option<PatchId> {
        self.neighbors[direction.index()]
    }

    /// Sets or clears the neighbor in the given direction.
    pub fn set_neighbor(&mut self, direction: Direction, neighbor: Option<PatchId>) {
        self.neighbors[direction.index()] = neighbor;
    }

    /// Returns the first slot holding `point`.
    #[must_use]
    pub fn slot_of(&self, point: PointId) -> Option<usize> {
        self.points.iter().position(|&p| p == point)
    }

    /// Points every slot holding `old` at `new` instead. Returns the number of
    /// slots rewritten.
    pub fn replace_point(&mut self, old: PointId, new: PointId) -> usize {
        let mut count = 0;
        for slot in &mut self.points {
            if *slot == old {
                *slot = new;
                count += 1;
            }
        }
        count
    }

    /// Distinct points referenced by this patch, in slot order.
    #[must_use]
    pub fn unique_points(&self) -> Vec<PointId> {
        let mut unique: Vec<PointId> = Vec::with_capacity(SLOT_COUNT);
        for &p in &self.points {
            if !unique.contains(&p) {
                unique.push(p);
            }
        }
        unique
    }

    /// Iterates over present neighbors with their directions.
    pub fn linked(&self) -> impl Iterator<Item = (Direction, PatchId)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(|d| self.neighbor(d).map(|n| (d, n)))
    }
}
