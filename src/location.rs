use std::num::NonZero;

use ndarray::Ix;
use serde::{Deserialize, Serialize};

/// A single row or column index.
pub type Coord = usize;
pub(crate) type Dimension = NonZero<Coord>;

#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug, Serialize, Deserialize)]
/// A cell `(row, col)` on a board. The top left corner is `Location(0, 0)`.
pub struct Location(pub Coord, pub Coord);

impl Location {
    /// The row, counted down from the top.
    #[inline]
    pub fn row(&self) -> Coord {
        self.0
    }

    /// The column, counted right from the left edge.
    #[inline]
    pub fn col(&self) -> Coord {
        self.1
    }

    /// Checkerboard colour of this cell: `0` if `row + col` is even, `1` otherwise.
    #[inline]
    pub fn parity(&self) -> usize {
        (self.0 ^ self.1) & 1
    }

    pub(crate) fn as_index(&self) -> (Coord, Coord) {
        (self.0, self.1)
    }

    // None when the step leaves the coordinate space
    pub(crate) fn offset_by(self, rhs: (isize, isize)) -> Option<Self> {
        Some(Self(self.0.checked_add_signed(rhs.0)?, self.1.checked_add_signed(rhs.1)?))
    }
}

impl From<(Ix, Ix)> for Location {
    fn from(value: (Ix, Ix)) -> Self {
        Self(value.0, value.1)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}
