use serde::{Deserialize, Serialize};
use unordered_pair::UnorderedPair;

use crate::location::Location;

/// The value on one half of a domino.
pub type Pip = u8;

/// Largest pip value on a standard double-six set.
pub const MAX_PIP: Pip = 6;

/// Stable identity of a domino. Two dominoes showing the same pips are still distinct resources.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DominoId(pub usize);

impl std::fmt::Display for DominoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One tile from the puzzle's supply. Serialized as `{"id": n, "pips": [a, b]}`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "DominoRepr", into = "DominoRepr")]
pub struct Domino {
    /// Which domino this is.
    pub id: DominoId,
    /// The two printed values, without orientation.
    pub pips: UnorderedPair<Pip>,
}

#[derive(Serialize, Deserialize)]
struct DominoRepr {
    id: DominoId,
    pips: (Pip, Pip),
}

impl From<DominoRepr> for Domino {
    fn from(value: DominoRepr) -> Self {
        Self { id: value.id, pips: UnorderedPair::from(value.pips) }
    }
}

impl From<Domino> for DominoRepr {
    fn from(value: Domino) -> Self {
        let UnorderedPair(a, b) = value.pips;
        Self { id: value.id, pips: (a, b) }
    }
}

impl Domino {
    /// Create domino number `id` showing `pips`.
    pub fn new(id: usize, pips: (Pip, Pip)) -> Self {
        Self { id: DominoId(id), pips: UnorderedPair::from(pips) }
    }

    /// Total of both halves.
    #[inline]
    pub fn sum(&self) -> i32 {
        self.pips.0 as i32 + self.pips.1 as i32
    }

    /// Whether both halves show the same value.
    #[inline]
    pub fn is_double(&self) -> bool {
        self.pips.0 == self.pips.1
    }

    /// The distinct ways to lay this domino onto an ordered pair of cells.
    /// A double has only one.
    pub fn orientations(&self) -> Vec<(Pip, Pip)> {
        let UnorderedPair(a, b) = self.pips;
        if self.is_double() {
            vec![(a, b)]
        } else {
            vec![(a, b), (b, a)]
        }
    }

    /// Whether both halves lie in `0..=MAX_PIP`.
    pub fn pips_in_range(&self) -> bool {
        self.pips.0 <= MAX_PIP && self.pips.1 <= MAX_PIP
    }
}

/// A domino laid onto two cells; `pips.0` lands on `cells.0` and `pips.1` on `cells.1`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// The domino laid down.
    pub domino: DominoId,
    /// The two covered cells. They must share an edge.
    pub cells: (Location, Location),
    /// The pip on each of `cells`, in the same order.
    pub pips: (Pip, Pip),
}

impl Placement {
    /// Lay `domino` so that `pips.0` covers `cells.0` and `pips.1` covers `cells.1`.
    pub fn new(domino: DominoId, cells: (Location, Location), pips: (Pip, Pip)) -> Self {
        Self { domino, cells, pips }
    }

    /// Whether either half covers `location`.
    #[inline]
    pub fn touches(&self, location: Location) -> bool {
        self.cells.0 == location || self.cells.1 == location
    }

    /// The pip placed on `location`, if this placement covers it.
    pub fn pip_at(&self, location: Location) -> Option<Pip> {
        if self.cells.0 == location {
            Some(self.pips.0)
        } else if self.cells.1 == location {
            Some(self.pips.1)
        } else {
            None
        }
    }

    /// Both halves as `(cell, pip)`.
    pub fn covered(&self) -> [(Location, Pip); 2] {
        [(self.cells.0, self.pips.0), (self.cells.1, self.pips.1)]
    }

    /// The covered cells without orientation.
    pub fn cell_pair(&self) -> UnorderedPair<Location> {
        UnorderedPair::from(self.cells)
    }

    /// Whether the placed pips are the ones printed on `domino`, in either orientation.
    pub fn matches(&self, domino: &Domino) -> bool {
        domino.id == self.domino && domino.pips == UnorderedPair::from(self.pips)
    }
}

#[cfg(test)]
mod tests {
    use unordered_pair::UnorderedPair;

    use crate::location::Location;

    use super::{Domino, DominoId, Placement};

    #[test]
    fn doubles_have_one_orientation() {
        assert_eq!(Domino::new(0, (4, 4)).orientations(), vec![(4, 4)]);
        assert_eq!(Domino::new(1, (2, 5)).orientations(), vec![(2, 5), (5, 2)]);
        assert_eq!(Domino::new(1, (2, 5)).sum(), 7);
    }

    #[test]
    fn duplicate_pips_are_different_dominoes() {
        assert_ne!(Domino::new(0, (2, 3)), Domino::new(1, (2, 3)));
        assert_eq!(Domino::new(0, (2, 3)), Domino::new(0, (3, 2)));
    }

    #[test]
    fn placement_reads_back_pips() {
        let placement = Placement::new(DominoId(3), (Location(0, 0), Location(0, 1)), (5, 1));
        assert_eq!(placement.pip_at(Location(0, 1)), Some(1));
        assert_eq!(placement.pip_at(Location(1, 1)), None);
        assert!(placement.matches(&Domino::new(3, (1, 5))));
        assert!(!placement.matches(&Domino::new(3, (1, 4))));
        assert_eq!(placement.cell_pair(), UnorderedPair(Location(0, 1), Location(0, 0)));
    }
}
