#![warn(missing_docs)]

//! # `pips`
//!
//! A validator and solver for domino tiling puzzles in the style of NYT Pips.
//! A puzzle is an irregular board of cells, possibly several disconnected islands, split into regions that each
//! carry a constraint on the pips placed in them, together with a fixed set of dominoes.
//! Solving means covering every cell with exactly one domino half such that every region's constraint holds.
//!
//! Build a [`Puzzle`] directly or through [`PuzzleBuilder`], then:
//! 1. [`validate`] it. This catches puzzles that cannot possibly be tiled (odd or unbalanced islands, wrong domino
//!    count, broken regions, impossible constraints) without searching.
//! 2. [`solve`] it, or run a [`Solver`] with a [`SolverConfig`] and [`CancelToken`] when the search should be bounded.
//! 3. While a player works by hand, [`verify`] their placements and offer a [`hint`] from the stored [`Solution`].
//!
//! None of these panic or return `Err`; every failure comes back as data.
//!
//! # Internals
//! The board is an undirected graph over the valid cells, with an edge between each edge-adjacent pair.
//! Island and region checks are flood fills over it, so nothing assumes the board is one rectangle.
//!
//! The solver is a depth-first search that always branches on the most constrained uncovered cell, prunes with a
//! partial check of every region touched by a trial placement, and forward-checks that no uncovered cell has been
//! stranded. Cells outside any region are gathered into one unconstrained catch-all region.

pub use board::Board;
pub use builder::{BuilderInvalidReason, PuzzleBuilder};
pub use config::{CancelToken, SolverConfig};
pub use constraint::{Constraint, ConstraintKind, Region};
pub use domino::{Domino, DominoId, Pip, Placement};
pub use hint::{hint, next_reveal};
pub use location::Location;
pub use puzzle::Puzzle;
pub use solver::{solve, SearchStats, SolveFailure, Solution, Solver};
pub use validator::{validate, ValidationError, ValidationReport, ValidationWarning};
pub use verifier::{verify, Verification, VerifyError};

pub(crate) mod board;
pub mod builder;
pub(crate) mod config;
pub(crate) mod constraint;
pub(crate) mod domino;
mod hint;
pub(crate) mod location;
pub(crate) mod puzzle;
pub mod shape;
pub(crate) mod solver;
pub(crate) mod validator;
pub(crate) mod verifier;
