use crate::domino::Placement;
use crate::location::Location;
use crate::puzzle::Puzzle;
use crate::solver::Solution;

/// The placement of `solution` that covers `cell`, or `None` if no placement touches it.
///
/// `solution` need not be complete or valid; cells off the board never get a hint.
pub fn hint(puzzle: &Puzzle, solution: &Solution, cell: Location) -> Option<Placement> {
    if !puzzle.cells.contains(&cell) {
        return None;
    }

    solution.placement_at(cell).copied()
}

/// The first placement of `solution`, in search order, whose cells the player has not yet covered.
///
/// Drives a step-by-step reveal: calling it after each accepted hint walks through the stored solution.
pub fn next_reveal(solution: &Solution, placed: &[Placement]) -> Option<Placement> {
    solution.placements.iter()
        .find(|step| !placed.iter().any(|p| p.touches(step.cells.0) || p.touches(step.cells.1)))
        .copied()
}
