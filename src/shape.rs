//! Grid geometry: the steps between edge-adjacent cells.

use ndarray::Array2;
use strum::VariantArray;

use crate::location::Location;

/// The four edge-adjacent steps on a square grid.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum SquareStep {
    /// Towards row 0.
    Up,
    /// Away from row 0.
    Down,
    /// Towards column 0.
    Left,
    /// Away from column 0.
    Right,
}

impl SquareStep {
    /// The "forward" directions: stepping in one of these leads to a location ordered after the origin.
    pub const FORWARD_VARIANTS: &'static [Self] = &[Self::Right, Self::Down];

    /// Attempt the step from `location` in the direction specified by `self` and return the resultant [`Location`],
    /// or [`None`] if the step leaves the coordinate space.
    pub fn attempt_from(&self, location: Location) -> Option<Location> {
        match self {
            Self::Up => location.offset_by((-1, 0)),
            Self::Down => location.offset_by((1, 0)),
            Self::Left => location.offset_by((0, -1)),
            Self::Right => location.offset_by((0, 1)),
        }
    }

    /// The opposite direction.
    pub fn invert(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Convert this step to a forward direction, if it is not already one.
    pub fn ensure_forward(&self) -> Self {
        match Self::FORWARD_VARIANTS.contains(self) {
            true => *self,
            false => self.invert(),
        }
    }

    /// Determine the direction from `a` to `b`, or [`None`] if the two are not edge-adjacent.
    ///
    /// This considers geometry only; whether either location is on a board is not checked.
    pub fn direction_to(a: Location, b: Location) -> Option<Self> {
        Self::VARIANTS.iter().find(|dir| dir.attempt_from(a) == Some(b)).copied()
    }
}

/// Dump a character grid row by row.
pub(crate) fn print(board: &Array2<char>) -> String {
    let mut out = String::with_capacity(board.nrows() * (board.ncols() + 1));

    for row in board.rows() {
        for col in row {
            out.push(*col);
        }
        out.push('\n');
    }

    out
}
