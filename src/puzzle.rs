use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::constraint::Region;
use crate::domino::{Domino, DominoId};
use crate::location::Location;

/// A puzzle description as handed over by the caller.
///
/// Nothing here is trusted: cells may repeat, regions may overlap or stray off the board, and the domino count
/// may be wrong. Run [`validate`](crate::validate) before [`solve`](crate::solve) to catch such input.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    /// Width of the bounding box; the board need not fill it.
    pub width: usize,
    /// Height of the bounding box.
    pub height: usize,
    /// The valid cells. Several disconnected islands are allowed.
    pub cells: Vec<Location>,
    /// Constrained groups of cells. Cells outside every region are unconstrained.
    pub regions: Vec<Region>,
    /// The supply of dominoes, each to be used at most once.
    pub dominoes: Vec<Domino>,
    /// Cells inside the bounding box that are not part of the board. Informational only.
    #[serde(default)]
    pub blocked: Vec<Location>,
}

impl Puzzle {
    /// The adjacency graph over this puzzle's valid cells.
    pub fn board(&self) -> Board {
        Board::new((self.height, self.width), self.cells.iter().copied())
    }

    /// Look up a domino by identity.
    pub fn domino(&self, id: DominoId) -> Option<&Domino> {
        self.dominoes.iter().find(|domino| domino.id == id)
    }

    /// Total of every pip over every available domino.
    pub fn total_pips(&self) -> i64 {
        self.dominoes.iter().map(|domino| i64::from(domino.sum())).sum()
    }
}
