//! Checks a human-entered, possibly incomplete set of placements.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use log::trace;
use thiserror::Error;

use crate::constraint::Constraint;
use crate::domino::{DominoId, Pip, Placement};
use crate::location::Location;
use crate::puzzle::Puzzle;
use crate::shape::SquareStep;

/// One problem with a set of placements.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum VerifyError {
    /// Two placements cover the same cell.
    #[error("cell {cell} is covered by more than one domino ({first} and {second})")]
    Overlap {
        /// The doubly covered cell.
        cell: Location,
        /// The domino that covered it first.
        first: DominoId,
        /// The domino that covered it again.
        second: DominoId,
    },
    /// A domino laid across two cells that do not share an edge.
    #[error("domino {domino} covers {} and {}, which are not edge-adjacent", .cells.0, .cells.1)]
    NotAdjacent {
        /// The misplaced domino.
        domino: DominoId,
        /// The cells it was laid on.
        cells: (Location, Location),
    },
    /// A domino laid over a cell that is not on the board.
    #[error("domino {domino} covers {cell}, which is not on the board")]
    OffBoard {
        /// The misplaced domino.
        domino: DominoId,
        /// The cell not on the board.
        cell: Location,
    },
    /// No domino in the puzzle has this id.
    #[error("domino {0} does not exist in this puzzle")]
    UnknownDomino(DominoId),
    /// The same domino placed twice.
    #[error("domino {0} is placed more than once")]
    DominoReused(DominoId),
    /// The placed pips are not the ones printed on the domino.
    #[error("domino {domino} is placed showing {pips:?}, which are not its pips")]
    PipMismatch {
        /// The domino placed.
        domino: DominoId,
        /// The pips it was placed showing.
        pips: (Pip, Pip),
    },
    /// The pips placed so far in a region already fail its partial check.
    #[error("region {region} breaks its constraint ({constraint})")]
    RegionViolated {
        /// Region id.
        region: String,
        /// The broken constraint.
        constraint: Constraint,
    },
}

/// Outcome of [`verify`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Verification {
    /// Every violation found, in placement order followed by region order.
    pub errors: Vec<VerifyError>,
    /// The placements are valid, cover the whole board, and every region passes its complete check.
    pub solved: bool,
}

impl Verification {
    /// Whether nothing is wrong so far. The board may still be unfinished.
    #[inline]
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Every violation, rendered for display.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect_vec()
    }
}

/// Check `placements` against the board and every region, collecting all violations.
///
/// Regions are held to their partial check only, so an unfinished board is never an error. A `greater` region that
/// is full but still too small is therefore not reported here; it only keeps [`Verification::solved`] false.
pub fn verify(puzzle: &Puzzle, placements: &[Placement]) -> Verification {
    let board = puzzle.board();
    let mut errors = Vec::new();
    let mut pips: HashMap<Location, Pip> = HashMap::with_capacity(placements.len() * 2);
    let mut owner: HashMap<Location, DominoId> = HashMap::with_capacity(placements.len() * 2);
    let mut used: HashSet<DominoId> = HashSet::with_capacity(placements.len());

    for placement in placements {
        let id = placement.domino;

        match puzzle.domino(id) {
            None => errors.push(VerifyError::UnknownDomino(id)),
            Some(domino) if !placement.matches(domino) => {
                errors.push(VerifyError::PipMismatch { domino: id, pips: placement.pips });
            }
            Some(_) => {}
        }

        if !used.insert(id) {
            errors.push(VerifyError::DominoReused(id));
        }

        if SquareStep::direction_to(placement.cells.0, placement.cells.1).is_none() {
            errors.push(VerifyError::NotAdjacent { domino: id, cells: placement.cells });
        }

        for (cell, pip) in placement.covered() {
            if !board.contains(cell) {
                errors.push(VerifyError::OffBoard { domino: id, cell });
                continue;
            }

            match owner.get(&cell) {
                Some(first) => errors.push(VerifyError::Overlap { cell, first: *first, second: id }),
                None => {
                    owner.insert(cell, id);
                    pips.insert(cell, pip);
                }
            }
        }
    }

    let mut complete = true;
    for region in &puzzle.regions {
        let cells = region.cells.iter().unique().collect_vec();
        let placed = cells.iter().filter_map(|cell| pips.get(cell).copied()).collect_vec();

        if !region.constraint.satisfies(&placed, false) {
            errors.push(VerifyError::RegionViolated { region: region.id.clone(), constraint: region.constraint });
        }

        complete &= placed.len() == cells.len() && region.constraint.satisfies(&placed, true);
    }

    let solved = errors.is_empty() && complete && board.cells().iter().all(|cell| pips.contains_key(cell));
    trace!(target: "verifier", "{} placements: {} errors, solved: {}", placements.len(), errors.len(), solved);

    Verification { errors, solved }
}

#[cfg(test)]
mod tests {
    use std::num::NonZero;

    use crate::builder::PuzzleBuilder;
    use crate::constraint::Constraint;
    use crate::domino::{Domino, DominoId, Placement};
    use crate::location::Location;
    use crate::puzzle::Puzzle;

    use super::{verify, VerifyError};

    fn puzzle() -> Puzzle {
        PuzzleBuilder::with_dims((NonZero::new(2).unwrap(), NonZero::new(2).unwrap()))
            .add_region("top", vec![Location(0, 0), Location(0, 1)], Constraint::greater(8))
            .add_region("bottom", vec![Location(1, 0), Location(1, 1)], Constraint::less(5))
            .add_dominoes(&[(3, 4), (2, 2)])
            .build()
            .unwrap()
    }

    fn place(id: usize, a: Location, b: Location, pips: (u8, u8)) -> Placement {
        Placement::new(DominoId(id), (a, b), pips)
    }

    #[test]
    fn empty_board_is_valid() {
        let verification = verify(&puzzle(), &[]);
        assert!(verification.valid());
        assert!(!verification.solved);
    }

    #[test]
    fn underfilled_greater_is_not_an_error() {
        let placements = [
            place(0, Location(0, 0), Location(0, 1), (3, 4)),
            place(1, Location(1, 0), Location(1, 1), (2, 2)),
        ];
        let verification = verify(&puzzle(), &placements);
        assert!(verification.valid(), "{:?}", verification.errors);
        assert!(!verification.solved);
    }

    #[test]
    fn less_is_checked_while_partial() {
        let placements = [place(0, Location(1, 0), Location(0, 0), (4, 3)), place(1, Location(1, 1), Location(0, 1), (2, 2))];
        let verification = verify(&puzzle(), &placements);
        assert_eq!(verification.errors, vec![VerifyError::RegionViolated {
            region: "bottom".into(),
            constraint: Constraint::less(5),
        }]);
    }

    #[test]
    fn solved_board() {
        let puzzle = PuzzleBuilder::with_dims((NonZero::new(2).unwrap(), NonZero::new(2).unwrap()))
            .add_region("left", vec![Location(0, 0), Location(1, 0)], Constraint::greater(6))
            .add_dominoes(&[(3, 4), (2, 2)])
            .build()
            .unwrap();
        let placements = [place(0, Location(0, 0), Location(1, 0), (3, 4)), place(1, Location(0, 1), Location(1, 1), (2, 2))];
        let verification = verify(&puzzle, &placements);
        assert!(verification.valid());
        assert!(verification.solved);
    }

    #[test]
    fn collects_every_violation() {
        let placements = [
            place(0, Location(0, 0), Location(1, 1), (4, 3)),
            place(0, Location(0, 1), Location(0, 2), (3, 4)),
            place(7, Location(1, 0), Location(1, 1), (1, 1)),
            place(1, Location(1, 0), Location(0, 0), (2, 3)),
        ];
        let errors = verify(&puzzle(), &placements).errors;

        assert!(errors.contains(&VerifyError::NotAdjacent { domino: DominoId(0), cells: (Location(0, 0), Location(1, 1)) }));
        assert!(errors.contains(&VerifyError::DominoReused(DominoId(0))));
        assert!(errors.contains(&VerifyError::OffBoard { domino: DominoId(0), cell: Location(0, 2) }));
        assert!(errors.contains(&VerifyError::UnknownDomino(DominoId(7))));
        assert!(errors.contains(&VerifyError::Overlap { cell: Location(1, 1), first: DominoId(0), second: DominoId(7) }));
        assert!(errors.contains(&VerifyError::PipMismatch { domino: DominoId(1), pips: (2, 3) }));
    }

    #[test]
    fn row_ends_are_not_adjacent() {
        let puzzle = Puzzle {
            width: 2,
            height: 1,
            cells: vec![Location(0, 0), Location(0, usize::MAX)],
            regions: vec![],
            dominoes: vec![Domino::new(0, (1, 2))],
            blocked: vec![],
        };

        let verification = verify(&puzzle, &[place(0, Location(0, usize::MAX), Location(0, 0), (1, 2))]);
        assert_eq!(verification.errors, vec![VerifyError::NotAdjacent {
            domino: DominoId(0),
            cells: (Location(0, usize::MAX), Location(0, 0)),
        }]);
        assert!(!verification.solved);
    }
}
