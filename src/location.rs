use std::fmt::{Display, Formatter};

use ndarray::Ix;

pub(crate) type Coord = usize;

#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug)]
/// A location `(row, column)` on a grid. The top left corner is `Location(0, 0)`.
///
/// The derived ordering is row-major, which is also the order islands are numbered in.
pub struct Location(pub Coord, pub Coord);

impl Location {
    /// Zero-based, counted from the top.
    #[inline]
    pub fn row(&self) -> Coord {
        self.0
    }

    /// Zero-based, counted from the left.
    #[inline]
    pub fn column(&self) -> Coord {
        self.1
    }

    pub(crate) fn as_index(&self) -> (Ix, Ix) {
        (self.0, self.1)
    }

    pub(crate) fn offset_by(self, rhs: (isize, isize)) -> Self {
        Self(self.0.wrapping_add_signed(rhs.0), self.1.wrapping_add_signed(rhs.1))
    }
}

impl From<(Ix, Ix)> for Location {
    fn from(value: (Ix, Ix)) -> Self {
        Self(value.0, value.1)
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}
