//! Exhaustive backtracking search for a covering of the board.
//!
//! The search keeps a single mutable state (covered pips, used dominoes, placements so far) and undoes each trial
//! placement on the way back up, so exploring a node allocates nothing beyond its candidate lists.
//!
//! At each node:
//! 1. Pick the uncovered cell with the fewest uncovered neighbors. A cell with none is picked at once, failing the branch.
//! 2. If every cell is covered, accept iff every region passes its complete check.
//! 3. Try each uncovered neighbor, each unused domino (those matching a pending two-cell sum first) and each orientation.
//! 4. Discard a trial whose touched regions fail their partial check, or that strands an uncovered cell with no
//!    uncovered neighbor; otherwise recurse, stopping at the first success.
//!
//! Every ordering is a function of the input alone, so the same puzzle always yields the same solution.

use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};

use itertools::Itertools;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{CancelToken, SolverConfig};
use crate::constraint::{Constraint, ConstraintKind};
use crate::domino::{Domino, Pip, Placement};
use crate::location::Location;
use crate::puzzle::Puzzle;

/// Reasons a [`Solver`] may come back without a covering.
#[derive(Clone, Debug, Eq, PartialEq, Error, Serialize, Deserialize)]
pub enum SolveFailure {
    /// The whole search space was explored; no covering satisfies every region.
    #[error("no arrangement of the dominoes covers the board while satisfying every region")]
    NoSolution,
    /// The [`CancelToken`] was raised mid-search.
    #[error("search was cancelled")]
    Cancelled,
    /// The configured node budget ran out first.
    #[error("search gave up after exploring {0} nodes")]
    BudgetExhausted(u64),
    /// The search itself faulted. This should never happen.
    #[error("internal solver error: {0}")]
    Internal(String),
}

/// Counters from one search.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Search nodes explored, counting the root.
    pub nodes: u64,
}

/// The outcome of [`solve`]: a full covering when [`is_valid`](Self::is_valid), otherwise the reason there is none.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// One placement per domino used, in the order they were laid. Empty on failure.
    pub placements: Vec<Placement>,
    /// Why there is no covering, or `None` on success.
    pub error: Option<SolveFailure>,
    /// How much work the search did, whatever the outcome.
    pub stats: SearchStats,
}

impl Solution {
    fn failed(error: SolveFailure, stats: SearchStats) -> Self {
        Self { placements: Vec::new(), error: Some(error), stats }
    }

    /// Whether the search found a covering.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// The placement covering `location`, if any.
    pub fn placement_at(&self, location: Location) -> Option<&Placement> {
        self.placements.iter().find(|placement| placement.touches(location))
    }
}

/// Backtracking search over one puzzle. Use [`Self::solve`] to run it.
///
/// `solve` expects [`validate`](crate::validate) to have passed, but tolerates any input: surplus dominoes are
/// simply left unused, and malformed regions only make the search fail.
pub struct Solver<'a> {
    puzzle: &'a Puzzle,
    config: SolverConfig,
    cancel: Option<CancelToken>,
}

impl<'a> Solver<'a> {
    /// A solver over `puzzle` with the default [`SolverConfig`] and no cancellation.
    pub fn new(puzzle: &'a Puzzle) -> Self {
        Self { puzzle, config: SolverConfig::default(), cancel: None }
    }

    /// Replace the search limits.
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Let `token` stop the search. Checked before the search starts and then every
    /// [`cancel_check_interval`](SolverConfig::cancel_check_interval) nodes.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Search for a covering. Failures of every kind, including a panic inside the search, come back as
    /// [`Solution::error`].
    pub fn solve(&self) -> Solution {
        let mut search = Search::new(self.puzzle, self.config, self.cancel.clone());
        debug!(target: "solver", "solving {} cells with {} dominoes and {} regions",
            search.cells.len(), search.dominoes.len(), search.regions.len());

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| search.run()));
        let stats = SearchStats { nodes: search.nodes };

        let solution = match outcome {
            Ok(Ok(true)) => Solution { placements: search.placements, error: None, stats },
            Ok(Ok(false)) => Solution::failed(SolveFailure::NoSolution, stats),
            Ok(Err(failure)) => Solution::failed(failure, stats),
            Err(payload) => {
                let message = payload.downcast_ref::<&str>().map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown fault".to_string());
                Solution::failed(SolveFailure::Internal(message), stats)
            }
        };

        debug!(target: "solver", "finished after {} nodes: {}", solution.stats.nodes,
            solution.error.as_ref().map_or("solved".to_string(), ToString::to_string));

        solution
    }
}

/// Solve `puzzle` with the default [`SolverConfig`].
pub fn solve(puzzle: &Puzzle) -> Solution {
    Solver::new(puzzle).solve()
}

/// A region in terms of cell indices.
struct IndexedRegion {
    constraint: Constraint,
    cells: Vec<usize>,
    // target of a two-cell sum region, used to order dominoes
    pair_sum: Option<i32>,
}

struct Search<'a> {
    // sorted, so index order is location order
    cells: Vec<Location>,
    adjacency: Vec<Vec<usize>>,
    regions: Vec<IndexedRegion>,
    regions_of: Vec<Vec<usize>>,
    dominoes: &'a [Domino],

    pips: Vec<Option<Pip>>,
    used: Vec<bool>,
    placements: Vec<Placement>,

    nodes: u64,
    config: SolverConfig,
    cancel: Option<CancelToken>,
}

impl<'a> Search<'a> {
    fn new(puzzle: &'a Puzzle, config: SolverConfig, cancel: Option<CancelToken>) -> Self {
        let board = puzzle.board();
        let cells = board.cells();
        let index: HashMap<Location, usize> = cells.iter().enumerate().map(|(i, l)| (*l, i)).collect();

        let adjacency = cells.iter()
            .map(|cell| board.neighbors(*cell).iter().map(|n| index[n]).collect_vec())
            .collect_vec();

        let mut claimed: HashSet<usize> = HashSet::with_capacity(cells.len());
        let mut regions = puzzle.regions.iter()
            .map(|region| {
                let indexed = region.cells.iter().filter_map(|l| index.get(l).copied()).unique().collect_vec();
                claimed.extend(indexed.iter().copied());
                let pair_sum = match (region.constraint.kind, region.constraint.value) {
                    (ConstraintKind::Sum, Some(target)) if indexed.len() == 2 => Some(target),
                    _ => None,
                };
                IndexedRegion { constraint: region.constraint, cells: indexed, pair_sum }
            })
            .collect_vec();

        // every unclaimed cell falls into one catch-all region so the checks stay uniform
        regions.push(IndexedRegion {
            constraint: Constraint::any(),
            cells: (0..cells.len()).filter(|i| !claimed.contains(i)).collect_vec(),
            pair_sum: None,
        });

        let mut regions_of = vec![Vec::new(); cells.len()];
        for (r, region) in regions.iter().enumerate() {
            for cell in &region.cells {
                regions_of[*cell].push(r);
            }
        }

        Self {
            pips: vec![None; cells.len()],
            used: vec![false; puzzle.dominoes.len()],
            placements: Vec::with_capacity(cells.len() / 2),
            cells,
            adjacency,
            regions,
            regions_of,
            dominoes: &puzzle.dominoes,
            nodes: 0,
            config,
            cancel,
        }
    }

    #[inline]
    fn covered(&self, cell: usize) -> bool {
        self.pips[cell].is_some()
    }

    fn open_neighbors(&self, cell: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[cell].iter().copied().filter(|n| !self.covered(*n))
    }

    /// The uncovered cell with the fewest uncovered neighbors, first in location order on ties.
    fn select_cell(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for cell in (0..self.cells.len()).filter(|c| !self.covered(*c)) {
            let options = self.open_neighbors(cell).count();
            if options == 0 {
                return Some(cell);
            }
            if best.map_or(true, |(_, fewest)| options < fewest) {
                best = Some((cell, options));
            }
        }
        best.map(|(cell, _)| cell)
    }

    /// Unused domino indices, those whose total matches a still-empty two-cell sum region first.
    fn domino_order(&self) -> Vec<usize> {
        let pending: HashSet<i32> = self.regions.iter()
            .filter(|region| region.cells.iter().all(|c| !self.covered(*c)))
            .filter_map(|region| region.pair_sum)
            .collect();

        let (preferred, rest): (Vec<usize>, Vec<usize>) = (0..self.dominoes.len())
            .filter(|d| !self.used[*d])
            .partition(|d| pending.contains(&self.dominoes[*d].sum()));

        preferred.into_iter().chain(rest).collect_vec()
    }

    fn region_pips(&self, region: &IndexedRegion) -> Vec<Pip> {
        region.cells.iter().filter_map(|c| self.pips[*c]).collect_vec()
    }

    fn partial_ok(&self, a: usize, b: usize) -> bool {
        self.regions_of[a].iter().chain(&self.regions_of[b])
            .unique()
            .all(|r| {
                let region = &self.regions[*r];
                region.constraint.satisfies(&self.region_pips(region), false)
            })
    }

    fn complete_ok(&self) -> bool {
        self.regions.iter().all(|region| region.constraint.satisfies(&self.region_pips(region), true))
    }

    // only neighbors of the two new cells can have lost an option
    fn forward_ok(&self, a: usize, b: usize) -> bool {
        self.adjacency[a].iter().chain(&self.adjacency[b])
            .filter(|n| !self.covered(**n))
            .all(|n| self.open_neighbors(*n).next().is_some())
    }

    fn place(&mut self, a: usize, b: usize, domino: usize, pips: (Pip, Pip)) {
        self.pips[a] = Some(pips.0);
        self.pips[b] = Some(pips.1);
        self.used[domino] = true;
        self.placements.push(Placement::new(self.dominoes[domino].id, (self.cells[a], self.cells[b]), pips));
    }

    fn undo(&mut self, a: usize, b: usize, domino: usize) {
        self.pips[a] = None;
        self.pips[b] = None;
        self.used[domino] = false;
        self.placements.pop();
    }

    fn tick(&mut self) -> Result<(), SolveFailure> {
        self.nodes += 1;

        if let Some(budget) = self.config.node_budget {
            if self.nodes > budget {
                return Err(SolveFailure::BudgetExhausted(budget));
            }
        }

        if self.nodes % self.config.cancel_check_interval.max(1) == 0 {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                return Err(SolveFailure::Cancelled);
            }
        }

        Ok(())
    }

    fn run(&mut self) -> Result<bool, SolveFailure> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(SolveFailure::Cancelled);
        }
        self.search()
    }

    fn search(&mut self) -> Result<bool, SolveFailure> {
        self.tick()?;

        let Some(cell) = self.select_cell() else {
            return Ok(self.complete_ok());
        };

        let partners = self.open_neighbors(cell).collect_vec();
        if partners.is_empty() {
            trace!(target: "solver", "cell {} is stranded at depth {}", self.cells[cell], self.placements.len());
            return Ok(false);
        }

        let order = self.domino_order();
        for partner in partners {
            for domino in order.iter().copied() {
                for pips in self.dominoes[domino].orientations() {
                    self.place(cell, partner, domino, pips);

                    if self.partial_ok(cell, partner) && self.forward_ok(cell, partner) && self.search()? {
                        return Ok(true);
                    }

                    self.undo(cell, partner, domino);
                }
            }
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZero;

    use crate::builder::PuzzleBuilder;
    use crate::config::{CancelToken, SolverConfig};
    use crate::constraint::Constraint;
    use crate::domino::Domino;
    use crate::location::Location;
    use crate::puzzle::Puzzle;

    use super::{solve, Search, SolveFailure, Solver};

    fn strip(width: usize) -> PuzzleBuilder {
        PuzzleBuilder::with_dims((NonZero::new(width).unwrap(), NonZero::new(1).unwrap()))
    }

    #[test]
    fn single_domino() {
        let puzzle = strip(2).add_domino((3, 5)).build().unwrap();
        let solution = solve(&puzzle);
        assert!(solution.is_valid());
        assert_eq!(solution.placements.len(), 1);
        assert_eq!(solution.placements[0].cells, (Location(0, 0), Location(0, 1)));
        assert_eq!(solution.placements[0].pips, (3, 5));
    }

    #[test]
    fn orientation_follows_constraints() {
        let puzzle = strip(2)
            .add_region("left", vec![Location(0, 0)], Constraint::sum(5))
            .add_domino((3, 5))
            .build()
            .unwrap();
        let solution = solve(&puzzle);
        assert_eq!(solution.placements[0].pips, (5, 3));
    }

    #[test]
    fn greater_is_only_checked_at_the_end() {
        let puzzle = strip(4)
            .add_region("big", vec![Location(0, 0), Location(0, 1), Location(0, 2)], Constraint::greater(12))
            .add_dominoes(&[(1, 1), (6, 6), (5, 0)])
            .build()
            .unwrap();
        let solution = solve(&puzzle);
        assert!(solution.is_valid(), "{:?}", solution.error);
        let total: u32 = solution.placements.iter()
            .flat_map(|p| p.covered())
            .filter(|(l, _)| l.col() < 3)
            .map(|(_, pip)| pip as u32)
            .sum();
        assert!(total > 12);
    }

    #[test]
    fn unsatisfiable_regions() {
        let puzzle = strip(2)
            .add_region("a", vec![Location(0, 0), Location(0, 1)], Constraint::equal())
            .add_domino((1, 2))
            .build()
            .unwrap();
        let solution = solve(&puzzle);
        assert!(!solution.is_valid());
        assert_eq!(solution.error, Some(SolveFailure::NoSolution));
        assert!(solution.placements.is_empty());
    }

    #[test]
    fn too_few_dominoes_fails_cleanly() {
        let puzzle = strip(4).add_domino((1, 2)).build().unwrap();
        assert_eq!(solve(&puzzle).error, Some(SolveFailure::NoSolution));
    }

    #[test]
    fn budget_stops_the_search() {
        let puzzle = strip(6)
            .add_region("all", (0..6).map(|col| Location(0, col)).collect(), Constraint::greater(100))
            .add_dominoes(&[(1, 1), (1, 1), (1, 1)])
            .build()
            .unwrap();
        let solution = Solver::new(&puzzle)
            .with_config(SolverConfig::default().with_node_budget(1))
            .solve();
        assert_eq!(solution.error, Some(SolveFailure::BudgetExhausted(1)));
    }

    #[test]
    fn cancelled_before_start() {
        let puzzle = strip(2).add_domino((0, 0)).build().unwrap();
        let token = CancelToken::new();
        token.cancel();
        let solution = Solver::new(&puzzle).with_cancel_token(token).solve();
        assert_eq!(solution.error, Some(SolveFailure::Cancelled));
    }
    #[test]
    fn cancellation_is_seen_between_nodes() {
        let puzzle = strip(4).add_dominoes(&[(1, 2), (3, 4)]).build().unwrap();
        let token = CancelToken::new();
        token.cancel();

        // skip the root check in `run` so the flag is only seen by `tick`
        let mut search = Search::new(&puzzle, SolverConfig::default().with_cancel_check_interval(1), Some(token));
        assert_eq!(search.search(), Err(SolveFailure::Cancelled));
        assert_eq!(search.nodes, 1);
        assert!(search.placements.is_empty());
    }

    #[test]
    fn row_ends_are_not_neighbors() {
        let puzzle = Puzzle {
            width: 2,
            height: 1,
            cells: vec![Location(0, 0), Location(0, usize::MAX)],
            regions: vec![],
            dominoes: vec![Domino::new(0, (1, 2))],
            blocked: vec![],
        };

        let solution = solve(&puzzle);
        assert!(!solution.is_valid());
        assert_eq!(solution.error, Some(SolveFailure::NoSolution));
    }
}
