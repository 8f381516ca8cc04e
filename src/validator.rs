//! Structural and arithmetic checks over a whole [`Puzzle`], run before any search.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use log::debug;
use thiserror::Error;
use unordered_pair::UnorderedPair;

use crate::board::Board;
use crate::constraint::{ConstraintKind, DISTINCT_PIPS};
use crate::domino::{DominoId, Pip, MAX_PIP};
use crate::location::Location;
use crate::puzzle::Puzzle;

/// A defect that rules out any tiling. The solver must not be run.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ValidationError {
    /// The board is empty.
    #[error("puzzle has no valid cells")]
    NoCells,
    /// A cell appears twice in [`Puzzle::cells`].
    #[error("cell {0} is listed more than once")]
    DuplicateCell(Location),
    /// Dominoes cover cells two at a time.
    #[error("odd cell count ({0}); dominoes can only cover an even number of cells")]
    OddCellCount(usize),
    /// There must be exactly one domino per two cells.
    #[error("{dominoes} dominoes supplied for {cells} cells; expected {}", .cells / 2)]
    DominoCountMismatch {
        /// Distinct valid cells.
        cells: usize,
        /// Dominoes supplied.
        dominoes: usize,
    },
    /// A domino shows a value above six.
    #[error("domino {id} has pips {pips:?}; pips must lie in 0..={}", MAX_PIP)]
    PipOutOfRange {
        /// The offending domino.
        id: DominoId,
        /// Its pips as given.
        pips: (Pip, Pip),
    },
    /// Two dominoes share an id.
    #[error("domino id {0} is used by more than one domino")]
    DuplicateDominoId(DominoId),
    /// A region lists the same cell twice.
    #[error("region {region} lists cell {cell} more than once")]
    DuplicateRegionCell {
        /// Region id.
        region: String,
        /// The repeated cell.
        cell: Location,
    },
    /// A region reaches outside the board.
    #[error("region {region} contains cell {cell}, which is not on the board")]
    RegionCellOffBoard {
        /// Region id.
        region: String,
        /// The cell not on the board.
        cell: Location,
    },
    /// A cell belongs to two regions.
    #[error("cell {cell} belongs to both region {first} and region {second}")]
    RegionOverlap {
        /// The shared cell.
        cell: Location,
        /// The region that claimed it first.
        first: String,
        /// The region that claimed it again.
        second: String,
    },
    /// A region's cells do not form one connected piece.
    #[error("region {region} is not contiguous; it splits into {pieces} pieces")]
    RegionNotContiguous {
        /// Region id.
        region: String,
        /// Number of connected pieces.
        pieces: usize,
    },
    /// An island of the board has an odd number of cells, so it can never be covered.
    #[error("island at {start} has an odd cell count ({size})")]
    IslandOddCount {
        /// Smallest cell of the island.
        start: Location,
        /// Cells in the island.
        size: usize,
    },
    /// Every domino covers one cell of each checkerboard colour, so an island needs equally many of each.
    #[error("island at {start} has {even} cells of one checkerboard colour and {odd} of the other")]
    IslandParityImbalance {
        /// Smallest cell of the island.
        start: Location,
        /// Cells with parity 0.
        even: usize,
        /// Cells with parity 1.
        odd: usize,
    },
    /// A `sum`, `greater` or `less` region has no value.
    #[error("region {region} has a {kind} constraint without a value")]
    MissingConstraintValue {
        /// Region id.
        region: String,
        /// The constraint kind missing its value.
        kind: ConstraintKind,
    },
    /// No choice of pips can reach a `sum` target.
    #[error("region {region} needs sum {target}, outside the reachable range 0..={max}")]
    SumOutOfRange {
        /// Region id.
        region: String,
        /// The requested total.
        target: i32,
        /// Largest total the region can hold.
        max: i32,
    },
    /// A `different` region has more cells than there are pip values.
    #[error("region {region} has {size} cells but only {} distinct pip values exist", DISTINCT_PIPS)]
    TooManyDifferent {
        /// Region id.
        region: String,
        /// Distinct cells in the region.
        size: usize,
    },
    /// A `greater` region can never exceed its bound.
    #[error("region {region} must exceed {bound}, but its largest possible sum is {max}")]
    GreaterUnreachable {
        /// Region id.
        region: String,
        /// The bound to exceed.
        bound: i32,
        /// Largest total the region can hold.
        max: i32,
    },
    /// A `less` region can never stay under its bound.
    #[error("region {region} must stay below {bound}, which no sum of pips can")]
    LessUnreachable {
        /// Region id.
        region: String,
        /// The bound to stay under.
        bound: i32,
    },
}

/// Something suspicious that does not block solving.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ValidationWarning {
    /// A region with no cells constrains nothing.
    #[error("region {0} has no cells")]
    EmptyRegion(String),
    /// These cells are outside every region.
    #[error("{} cells belong to no region and are treated as unconstrained", .0.len())]
    UnassignedCells(Vec<Location>),
    /// A two-cell `sum` region whose target no single domino totals, so it must be split across two.
    #[error("region {region} needs sum {target} but no domino has that pip total")]
    NoDominoForSum {
        /// Region id.
        region: String,
        /// The requested total.
        target: i32,
    },
    /// `sum` regions cover the whole board, yet their targets disagree with the dominoes.
    #[error("sum regions cover the board and total {targets}, but the dominoes total {pips}")]
    SumTotalMismatch {
        /// Total of every `sum` target.
        targets: i64,
        /// Total of every domino's pips.
        pips: i64,
    },
}

/// Outcome of [`validate`]. Errors block solving; warnings do not.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValidationReport {
    /// Defects that block solving.
    pub errors: Vec<ValidationError>,
    /// Oddities worth reporting that do not block solving.
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// Whether the puzzle may be handed to the solver.
    #[inline]
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Every error, rendered for display.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect_vec()
    }

    /// Every warning, rendered for display.
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect_vec()
    }
}

/// Run every structural check over `puzzle`, collecting all errors and warnings rather than stopping at the first.
///
/// This never searches for a tiling. A puzzle that passes may still have no solution.
pub fn validate(puzzle: &Puzzle) -> ValidationReport {
    let mut report = ValidationReport::default();
    let board = puzzle.board();

    if puzzle.cells.is_empty() {
        report.errors.push(ValidationError::NoCells);
    }

    report.errors.extend(puzzle.cells.iter().duplicates().sorted().map(|cell| ValidationError::DuplicateCell(*cell)));

    let cell_count = board.cell_count();
    if cell_count % 2 != 0 {
        report.errors.push(ValidationError::OddCellCount(cell_count));
    }

    if puzzle.dominoes.len() * 2 != cell_count {
        report.errors.push(ValidationError::DominoCountMismatch { cells: cell_count, dominoes: puzzle.dominoes.len() });
    }

    for domino in puzzle.dominoes.iter().filter(|domino| !domino.pips_in_range()) {
        let UnorderedPair(a, b) = domino.pips;
        report.errors.push(ValidationError::PipOutOfRange { id: domino.id, pips: (a, b) });
    }

    report.errors.extend(puzzle.dominoes.iter().map(|domino| domino.id).duplicates().map(ValidationError::DuplicateDominoId));

    check_regions(puzzle, &board, &mut report);
    check_islands(&board, &mut report);
    check_ranges(puzzle, &mut report);
    check_sums(puzzle, &board, &mut report);

    debug!(target: "validator", "validated {} cells, {} regions, {} dominoes: {} errors, {} warnings",
        cell_count, puzzle.regions.len(), puzzle.dominoes.len(), report.errors.len(), report.warnings.len());

    report
}

fn check_regions(puzzle: &Puzzle, board: &Board, report: &mut ValidationReport) {
    let mut owner: HashMap<Location, &str> = HashMap::new();

    for region in &puzzle.regions {
        if region.cells.is_empty() {
            report.warnings.push(ValidationWarning::EmptyRegion(region.id.clone()));
            continue;
        }

        for cell in region.cells.iter().duplicates() {
            report.errors.push(ValidationError::DuplicateRegionCell { region: region.id.clone(), cell: *cell });
        }

        let cells: HashSet<Location> = region.cells.iter().copied().collect();

        for cell in cells.iter().sorted() {
            if !board.contains(*cell) {
                report.errors.push(ValidationError::RegionCellOffBoard { region: region.id.clone(), cell: *cell });
                continue;
            }

            match owner.get(cell) {
                Some(first) => report.errors.push(ValidationError::RegionOverlap {
                    cell: *cell,
                    first: first.to_string(),
                    second: region.id.clone(),
                }),
                None => {
                    owner.insert(*cell, &region.id);
                }
            }
        }

        let pieces = board.components_within(&cells).len();
        if pieces > 1 {
            report.errors.push(ValidationError::RegionNotContiguous { region: region.id.clone(), pieces });
        }
    }

    let unassigned = board.cells().into_iter().filter(|cell| !owner.contains_key(cell)).collect_vec();
    if !unassigned.is_empty() {
        report.warnings.push(ValidationWarning::UnassignedCells(unassigned));
    }
}

// per-region checks cannot see an island that can never be tiled on its own
fn check_islands(board: &Board, report: &mut ValidationReport) {
    for island in board.islands() {
        let start = island[0];
        if island.len() % 2 != 0 {
            report.errors.push(ValidationError::IslandOddCount { start, size: island.len() });
        }

        let even = island.iter().filter(|cell| cell.parity() == 0).count();
        let odd = island.len() - even;
        if even != odd {
            report.errors.push(ValidationError::IslandParityImbalance { start, even, odd });
        }
    }
}

fn check_ranges(puzzle: &Puzzle, report: &mut ValidationReport) {
    for region in &puzzle.regions {
        let size = region.cells.iter().unique().count();
        if size == 0 {
            continue;
        }

        let max = i32::try_from(size).map_or(i32::MAX, |size| size.saturating_mul(i32::from(MAX_PIP)));
        let id = || region.id.clone();
        let constraint = region.constraint;

        match (constraint.kind, constraint.value) {
            (kind, None) if kind.needs_value() => {
                report.errors.push(ValidationError::MissingConstraintValue { region: id(), kind });
            }
            (ConstraintKind::Sum, Some(target)) if !(0..=max).contains(&target) => {
                report.errors.push(ValidationError::SumOutOfRange { region: id(), target, max });
            }
            (ConstraintKind::Different, _) if size > DISTINCT_PIPS => {
                report.errors.push(ValidationError::TooManyDifferent { region: id(), size });
            }
            (ConstraintKind::Greater, Some(bound)) if bound >= max => {
                report.errors.push(ValidationError::GreaterUnreachable { region: id(), bound, max });
            }
            (ConstraintKind::Less, Some(bound)) if bound <= 0 => {
                report.errors.push(ValidationError::LessUnreachable { region: id(), bound });
            }
            _ => {}
        }
    }
}

fn check_sums(puzzle: &Puzzle, board: &Board, report: &mut ValidationReport) {
    let sum_regions = puzzle.regions.iter()
        .filter(|region| region.constraint.kind == ConstraintKind::Sum)
        .filter_map(|region| region.constraint.value.map(|target| (region, target)))
        .collect_vec();

    for (region, target) in &sum_regions {
        let cells = region.cells.iter().copied().unique().collect_vec();
        if cells.len() != 2 || !board.adjacent(UnorderedPair(cells[0], cells[1])) {
            continue;
        }

        if !puzzle.dominoes.iter().any(|domino| domino.sum() == *target) {
            report.warnings.push(ValidationWarning::NoDominoForSum { region: region.id.clone(), target: *target });
        }
    }

    if sum_regions.is_empty() {
        return;
    }

    let covered: HashSet<Location> = sum_regions.iter().flat_map(|(region, _)| region.cells.iter().copied()).collect();
    if board.cells().iter().all(|cell| covered.contains(cell)) {
        let targets = sum_regions.iter().map(|(_, target)| i64::from(*target)).sum::<i64>();
        let pips = puzzle.total_pips();
        if targets != pips {
            report.warnings.push(ValidationWarning::SumTotalMismatch { targets, pips });
        }
    }
}
