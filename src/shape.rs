use strum::{Display, VariantArray};

use crate::location::Location;

/// A single step between orthogonally adjacent cells of the grid.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum Step {
    /// Towards row 0.
    Up,
    /// Away from row 0.
    Down,
    /// Towards column 0.
    Left,
    /// Away from column 0.
    Right,
}

impl Step {
    /// The directions in which candidate bridges are scanned for.
    ///
    /// Stepping in a forward direction always moves to a location ordered after the origin, so each pair of
    /// mutually visible islands is found exactly once. Horizontal scanning comes first, which fixes bridge ids:
    /// all horizontal candidates are numbered before any vertical one.
    pub const FORWARD_VARIANTS: &'static [Self] = &[Self::Right, Self::Down];

    /// The location one step away from `location`. Stepping off the top or left edge wraps around to an index
    /// no grid contains.
    pub fn attempt_from(&self, location: Location) -> Location {
        match self {
            Self::Up => location.offset_by((-1, 0)),
            Self::Down => location.offset_by((1, 0)),
            Self::Left => location.offset_by((0, -1)),
            Self::Right => location.offset_by((0, 1)),
        }
    }

    /// The step leading back.
    pub fn invert(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// The axis this step moves along.
    pub fn orientation(&self) -> Orientation {
        match self {
            Self::Up | Self::Down => Orientation::Vertical,
            Self::Left | Self::Right => Orientation::Horizontal,
        }
    }
}

/// The axis a bridge runs along.
#[derive(Copy, Clone, VariantArray, Display, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum Orientation {
    /// Along a row.
    #[strum(serialize = "H")]
    Horizontal,
    /// Along a column.
    #[strum(serialize = "V")]
    Vertical,
}

impl Orientation {
    /// The rendered symbol for `count` parallel bridges along this axis.
    pub fn symbol(&self, count: u8) -> char {
        match (self, count) {
            (Self::Horizontal, 1) => '-',
            (Self::Horizontal, _) => '=',
            (Self::Vertical, 1) => '|',
            (Self::Vertical, _) => '$',
        }
    }
}
