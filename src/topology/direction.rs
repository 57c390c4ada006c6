/// One of the 8 boundary directions in which a patch can have a neighbor.
///
/// Variants are ordered as they appear in the mesh file
/// (`AL A AR L R BL B BR`), which makes every direction's opposite sit at the
/// mirrored index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    AboveLeft,
    Above,
    AboveRight,
    Left,
    Right,
    BelowLeft,
    Below,
    BelowRight,
}

// (slot in the first patch, slot in the second patch)
const ABOVE: [(usize, usize); 4] = [(0, 12), (1, 13), (2, 14), (3, 15)];
const BELOW: [(usize, usize); 4] = [(12, 0), (13, 1), (14, 2), (15, 3)];
const LEFT: [(usize, usize); 4] = [(0, 3), (4, 7), (8, 11), (12, 15)];
const RIGHT: [(usize, usize); 4] = [(3, 0), (7, 4), (11, 8), (15, 12)];
const ABOVE_LEFT: [(usize, usize); 1] = [(0, 15)];
const ABOVE_RIGHT: [(usize, usize); 1] = [(3, 12)];
const BELOW_LEFT: [(usize, usize); 1] = [(12, 3)];
const BELOW_RIGHT: [(usize, usize); 1] = [(15, 0)];

impl Direction {
    /// All directions in file order.
    pub const ALL: [Direction; 8] = [
        Direction::AboveLeft,
        Direction::Above,
        Direction::AboveRight,
        Direction::Left,
        Direction::Right,
        Direction::BelowLeft,
        Direction::Below,
        Direction::BelowRight,
    ];

    /// The directions a rebuild snapshots. Every link is visible from one of
    /// its two patches through one of these.
    pub const FORWARD: [Direction; 4] = [
        Direction::Above,
        Direction::AboveLeft,
        Direction::AboveRight,
        Direction::Left,
    ];

    /// Index of this direction into a patch's neighbor array.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The direction pointing back from the neighbor.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::ALL[7 - self.index()]
    }

    /// Returns `true` for the four diagonal directions.
    #[must_use]
    pub const fn is_corner(self) -> bool {
        matches!(
            self,
            Direction::AboveLeft
                | Direction::AboveRight
                | Direction::BelowLeft
                | Direction::BelowRight
        )
    }

    /// Short label used by the mesh file (`"AL"`, `"A"`, ...).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Direction::AboveLeft => "AL",
            Direction::Above => "A",
            Direction::AboveRight => "AR",
            Direction::Left => "L",
            Direction::Right => "R",
            Direction::BelowLeft => "BL",
            Direction::Below => "B",
            Direction::BelowRight => "BR",
        }
    }

    /// Boundary slot pairs shared when `second` sits in this direction of
    /// `first`. Edges yield 4 pairs, corners 1.
    #[must_use]
    pub fn boundary(self) -> &'static [(usize, usize)] {
        match self {
            Direction::Above => &ABOVE,
            Direction::Below => &BELOW,
            Direction::Left => &LEFT,
            Direction::Right => &RIGHT,
            Direction::AboveLeft => &ABOVE_LEFT,
            Direction::AboveRight => &ABOVE_RIGHT,
            Direction::BelowLeft => &BELOW_LEFT,
            Direction::BelowRight => &BELOW_RIGHT,
        }
    }

    /// Slot offset from a boundary slot facing this direction to the
    /// control point one step further inside the same patch.
    #[must_use]
    pub const fn inward_step(self) -> isize {
        match self {
            Direction::Above => 4,
            Direction::Below => -4,
            Direction::Left => 1,
            Direction::Right => -1,
            Direction::AboveLeft => 5,
            Direction::AboveRight => 3,
            Direction::BelowLeft => -3,
            Direction::BelowRight => -5,
        }
    }

    /// The slot one step inside the patch from `slot`, which must lie on the
    /// boundary facing this direction.
    #[must_use]
    pub fn inward(self, slot: usize) -> usize {
        slot.wrapping_add_signed(self.inward_step())
    }
}
